use rocket::serde::json::{self, Json};
use rocket::{get, post, State};

use crate::auth::AuthenticatedUser;
use crate::clock::SharedClock;
use crate::data::DBConnection;
use crate::error::{json_body, ApiResult};

use super::data::*;
use super::service;

#[get("/today")]
pub fn get_today(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
    clock: &State<SharedClock>,
) -> ApiResult<Json<DailyProgress>> {
    let db_connection = db_connection.lock()?;

    service::get_today(&db_connection, &user.0, clock.inner().as_ref()).map(Json)
}

#[post("/today", data = "<request>")]
pub fn save_today(
    user: AuthenticatedUser,
    request: Result<Json<SaveTodayRequest>, json::Error<'_>>,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<DailyProgress>> {
    let request = json_body(request, "Invalid payload")?;
    let db_connection = db_connection.lock()?;

    service::save_today(&db_connection, &user.0, request).map(Json)
}

#[post("/", data = "<request>")]
pub fn save_final(
    user: AuthenticatedUser,
    request: Result<Json<SaveFinalRequest>, json::Error<'_>>,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<DailyProgress>> {
    let request = json_body(request, "Missing required fields")?;
    let db_connection = db_connection.lock()?;

    service::save_final(&db_connection, &user.0, request).map(Json)
}

#[get("/month?<year>&<month>")]
pub fn get_month(
    user: AuthenticatedUser,
    year: Option<&str>,
    month: Option<&str>,
    db_connection: &State<DBConnection>,
) -> ApiResult<Json<MonthProgress>> {
    let db_connection = db_connection.lock()?;

    service::get_month(&db_connection, &user.0, year, month).map(Json)
}

#[get("/streaks")]
pub fn get_streaks(
    user: AuthenticatedUser,
    db_connection: &State<DBConnection>,
    clock: &State<SharedClock>,
) -> ApiResult<Json<Streaks>> {
    let db_connection = db_connection.lock()?;

    service::get_streaks(&db_connection, &user.0, clock.inner().as_ref()).map(Json)
}
