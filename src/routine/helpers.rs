use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::data::UserId;
use crate::error::{ApiError, ApiResult};

use super::data::*;

const TEMPLATE_COLUMNS: &str = "id, owner_id, title, tasks, is_active, created_at";

fn template_from_row(row: &Row) -> rusqlite::Result<RoutineTemplate> {
    let tasks: String = row.get(3)?;
    let tasks = serde_json::from_str(&tasks)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(RoutineTemplate {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        tasks,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_one_template(
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
    db_connection: &Connection,
) -> ApiResult<Option<RoutineTemplate>> {
    let template = db_connection
        .query_row(sql, params, template_from_row)
        .optional()?;

    Ok(template)
}

pub fn get_template_from_db(
    template_id: TemplateID,
    db_connection: &Connection,
) -> ApiResult<Option<RoutineTemplate>> {
    query_one_template(
        &format!("SELECT {} FROM routine_templates WHERE id = (?1)", TEMPLATE_COLUMNS),
        params![template_id],
        db_connection,
    )
}

pub fn get_owned_template_from_db(
    template_id: TemplateID,
    owner: &UserId,
    db_connection: &Connection,
) -> ApiResult<Option<RoutineTemplate>> {
    query_one_template(
        &format!(
            "SELECT {} FROM routine_templates WHERE id = (?1) AND owner_id = (?2)",
            TEMPLATE_COLUMNS
        ),
        params![template_id, owner],
        db_connection,
    )
}

/// `None` looks up the system default.
pub fn get_active_template_from_db(
    owner: Option<&UserId>,
    db_connection: &Connection,
) -> ApiResult<Option<RoutineTemplate>> {
    query_one_template(
        &format!(
            "SELECT {} FROM routine_templates WHERE owner_id IS (?1) AND is_active = 1
             ORDER BY created_at DESC, id DESC LIMIT 1",
            TEMPLATE_COLUMNS
        ),
        params![owner],
        db_connection,
    )
}

pub fn get_latest_template_for_owner_from_db(
    owner: &UserId,
    db_connection: &Connection,
) -> ApiResult<Option<RoutineTemplate>> {
    query_one_template(
        &format!(
            "SELECT {} FROM routine_templates WHERE owner_id = (?1)
             ORDER BY created_at DESC, id DESC LIMIT 1",
            TEMPLATE_COLUMNS
        ),
        params![owner],
        db_connection,
    )
}

pub fn get_templates_for_owner_from_db(
    owner: &UserId,
    db_connection: &Connection,
) -> ApiResult<Vec<RoutineTemplate>> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT {} FROM routine_templates WHERE owner_id = (?1)
         ORDER BY created_at DESC, id DESC",
        TEMPLATE_COLUMNS
    ))?;

    let templates = statement
        .query_map(params![owner], template_from_row)?
        .collect::<rusqlite::Result<Vec<RoutineTemplate>>>()?;

    Ok(templates)
}

pub fn count_templates_for_owner_from_db(
    owner: &UserId,
    db_connection: &Connection,
) -> ApiResult<i64> {
    let count = db_connection.query_row(
        "SELECT COUNT(*) FROM routine_templates WHERE owner_id = (?1)",
        params![owner],
        |row| row.get(0),
    )?;

    Ok(count)
}

fn insert_template(
    verb: &str,
    template: &NewRoutineTemplate,
    db_connection: &Connection,
) -> ApiResult<usize> {
    let tasks = serde_json::to_string(&template.tasks)?;

    let changed = db_connection.execute(
        &format!(
            "{} INTO routine_templates (owner_id, title, tasks, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            verb
        ),
        params![
            template.owner,
            template.title,
            tasks,
            template.is_active,
            Utc::now()
        ],
    )?;

    Ok(changed)
}

pub fn add_template_to_db(
    template: &NewRoutineTemplate,
    db_connection: &Connection,
) -> ApiResult<RoutineTemplate> {
    insert_template("INSERT", template, db_connection)?;
    let id = db_connection.last_insert_rowid();

    get_template_from_db(id, db_connection)?
        .ok_or_else(|| ApiError::Internal(String::from("Inserted template could not be read back")))
}

/// Inserts unless the partial unique index on active system defaults
/// already holds a row. Returns whether a row was written.
pub fn add_system_default_to_db_if_absent(
    template: &NewRoutineTemplate,
    db_connection: &Connection,
) -> ApiResult<bool> {
    Ok(insert_template("INSERT OR IGNORE", template, db_connection)? == 1)
}

pub fn update_template_tasks_in_db(
    template_id: TemplateID,
    tasks: &[Task],
    db_connection: &Connection,
) -> ApiResult<()> {
    db_connection.execute(
        "UPDATE routine_templates SET tasks = (?1) WHERE id = (?2)",
        params![serde_json::to_string(tasks)?, template_id],
    )?;

    Ok(())
}

pub fn set_template_active_in_db(
    template_id: TemplateID,
    is_active: bool,
    db_connection: &Connection,
) -> ApiResult<()> {
    db_connection.execute(
        "UPDATE routine_templates SET is_active = (?1) WHERE id = (?2)",
        params![is_active, template_id],
    )?;

    Ok(())
}

pub fn deactivate_templates_for_owner_in_db(
    owner: &UserId,
    db_connection: &Connection,
) -> ApiResult<usize> {
    let changed = db_connection.execute(
        "UPDATE routine_templates SET is_active = 0 WHERE owner_id = (?1) AND is_active = 1",
        params![owner],
    )?;

    Ok(changed)
}

pub fn delete_template_from_db(template_id: TemplateID, db_connection: &Connection) -> ApiResult<()> {
    db_connection.execute(
        "DELETE FROM routine_templates WHERE id = (?1)",
        params![template_id],
    )?;

    Ok(())
}

#[cfg(test)]
pub fn add_template_created_at_to_db(
    owner: &UserId,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
    db_connection: &Connection,
) -> ApiResult<TemplateID> {
    db_connection.execute(
        "INSERT INTO routine_templates (owner_id, title, tasks, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            owner,
            CUSTOM_TITLE,
            serde_json::to_string(&[Task::new("Stretch", "")])?,
            is_active,
            created_at
        ],
    )?;

    Ok(db_connection.last_insert_rowid())
}
