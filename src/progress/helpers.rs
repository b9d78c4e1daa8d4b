use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::data::UserId;
use crate::date_key::DateKey;
use crate::error::{ApiError, ApiResult};

use super::data::*;

fn progress_from_row(row: &Row) -> rusqlite::Result<DailyProgress> {
    let completed_task_ids: String = row.get(3)?;
    let completed_task_ids = serde_json::from_str(&completed_task_ids)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(DailyProgress {
        date: row.get(0)?,
        completed: row.get(1)?,
        total: row.get(2)?,
        completed_task_ids,
        created_at: Some(row.get(4)?),
        updated_at: Some(row.get(5)?),
    })
}

fn summary_from_row(row: &Row) -> rusqlite::Result<ProgressSummary> {
    Ok(ProgressSummary {
        date: row.get(0)?,
        completed: row.get(1)?,
        total: row.get(2)?,
    })
}

pub fn get_progress_from_db(
    owner: &UserId,
    date: &DateKey,
    db_connection: &Connection,
) -> ApiResult<Option<DailyProgress>> {
    let progress = db_connection
        .query_row(
            "SELECT date, completed, total, completed_task_ids, created_at, updated_at
             FROM daily_progress WHERE owner_id = (?1) AND date = (?2)",
            params![owner, date],
            progress_from_row,
        )
        .optional()?;

    Ok(progress)
}

pub fn upsert_progress_to_db(
    owner: &UserId,
    update: &ProgressUpdate,
    db_connection: &Connection,
) -> ApiResult<DailyProgress> {
    let completed_task_ids = serde_json::to_string(&update.completed_task_ids)?;

    db_connection.execute(
        "INSERT INTO daily_progress
            (owner_id, date, completed, total, completed_task_ids, created_at, updated_at)
         VALUES (?1, ?2, ?3, COALESCE(?4, 0), ?5, ?6, ?6)
         ON CONFLICT (owner_id, date) DO UPDATE SET
            completed = excluded.completed,
            total = COALESCE(?4, daily_progress.total),
            completed_task_ids = excluded.completed_task_ids,
            updated_at = excluded.updated_at",
        params![
            owner,
            update.date,
            update.completed,
            update.total,
            completed_task_ids,
            Utc::now()
        ],
    )?;

    get_progress_from_db(owner, &update.date, db_connection)?
        .ok_or_else(|| ApiError::Internal(String::from("Upserted progress could not be read back")))
}

pub fn get_progress_in_range_from_db(
    owner: &UserId,
    start: &str,
    end: &str,
    db_connection: &Connection,
) -> ApiResult<Vec<ProgressSummary>> {
    let mut statement = db_connection.prepare(
        "SELECT date, completed, total FROM daily_progress
         WHERE owner_id = (?1) AND date >= (?2) AND date <= (?3)
         ORDER BY date",
    )?;

    let summaries = statement
        .query_map(params![owner, start, end], summary_from_row)?
        .collect::<rusqlite::Result<Vec<ProgressSummary>>>()?;

    Ok(summaries)
}

pub fn get_progress_summaries_from_db(
    owner: &UserId,
    db_connection: &Connection,
) -> ApiResult<Vec<ProgressSummary>> {
    let mut statement = db_connection
        .prepare("SELECT date, completed, total FROM daily_progress WHERE owner_id = (?1)")?;

    let summaries = statement
        .query_map(params![owner], summary_from_row)?
        .collect::<rusqlite::Result<Vec<ProgressSummary>>>()?;

    Ok(summaries)
}
