use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::{delete, get, post, put, State};

use crate::auth::AuthenticatedUser;
use crate::data::DBConnection;
use crate::error::{json_body, ApiResult};

use super::data::*;
use super::service;

#[get("/templates")]
pub fn get_templates(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<Vec<RoutineTemplate>>> {
    let db_connection = db_connection.lock()?;

    service::list_templates(&db_connection, &user.0).map(Json)
}

#[post("/seed-default")]
pub fn seed_default(
    db_connection: &State<DBConnection>,
) -> ApiResult<(Status, Json<RoutineResponse>)> {
    let db_connection = db_connection.lock()?;

    let response = match service::seed_default(&db_connection)? {
        SeedOutcome::Created(routine) => (
            Status::Created,
            RoutineResponse {
                message: String::from("System default routine seeded"),
                routine: Some(routine),
            },
        ),
        SeedOutcome::AlreadyExists(_) => (
            Status::Ok,
            RoutineResponse {
                message: String::from("System default routine already exists"),
                routine: None,
            },
        ),
    };

    Ok((response.0, Json(response.1)))
}

#[get("/public/default")]
pub fn get_public_default(
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<RoutineTemplate>> {
    let db_connection = db_connection.lock()?;

    service::get_public_default(&db_connection).map(Json)
}

#[get("/active")]
pub fn get_active(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<RoutineTemplate>> {
    let db_connection = db_connection.lock()?;

    service::get_active(&db_connection, &user.0).map(Json)
}

#[post("/custom", data = "<request>")]
pub fn create_custom(
    user: AuthenticatedUser,
    request: Result<Json<TemplateRequest>, json::Error<'_>>,
    db_connection: &State<DBConnection>,
) -> ApiResult<(Status, Json<RoutineResponse>)> {
    let request = json_body(request, "Tasks are required")?;
    let mut db_connection = db_connection.lock()?;

    let routine = service::create_custom(
        &mut db_connection,
        &user.0,
        request.tasks,
        request.set_as_default,
    )?;

    let message = if request.set_as_default {
        "Template saved & activated"
    } else {
        "Template saved"
    };

    Ok((
        Status::Created,
        Json(RoutineResponse {
            message: String::from(message),
            routine: Some(routine),
        }),
    ))
}

#[put("/template/<id>", data = "<request>")]
pub fn update_template(
    user: AuthenticatedUser,
    id: &str,
    request: Result<Json<TemplateRequest>, json::Error<'_>>,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<TemplateResponse>> {
    let template_id = service::parse_template_id(id)?;
    let request = json_body(request, "Tasks required")?;
    let mut db_connection = db_connection.lock()?;

    let template = service::update_template(
        &mut db_connection,
        &user.0,
        template_id,
        request.tasks,
        request.set_as_default,
    )?;

    let message = if request.set_as_default {
        "Template updated & activated"
    } else {
        "Template updated"
    };

    Ok(Json(TemplateResponse {
        message: String::from(message),
        template,
    }))
}

#[post("/activate/<id>")]
pub fn activate_template(
    user: AuthenticatedUser,
    id: &str,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<MessageResponse>> {
    let template_id = service::parse_template_id(id)?;
    let mut db_connection = db_connection.lock()?;

    service::activate_template(&mut db_connection, &user.0, template_id)?;

    Ok(Json(MessageResponse {
        message: String::from("Template activated"),
    }))
}

#[delete("/template/<id>")]
pub fn delete_template(
    user: AuthenticatedUser,
    id: &str,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<MessageResponse>> {
    let template_id = service::parse_template_id(id)?;
    let mut db_connection = db_connection.lock()?;

    service::delete_template(&mut db_connection, &user.0, template_id)?;

    Ok(Json(MessageResponse {
        message: String::from("Template deleted"),
    }))
}
