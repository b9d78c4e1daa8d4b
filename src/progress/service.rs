use rusqlite::Connection;
use tracing::{debug, info};

use super::data::*;
use super::helpers::*;
use super::streak::calculate_streaks;
use crate::clock::Clock;
use crate::data::UserId;
use crate::error::{ApiError, ApiResult};

pub fn get_today(
    db_connection: &Connection,
    user: &UserId,
    clock: &dyn Clock,
) -> ApiResult<DailyProgress> {
    let today = clock.today();

    Ok(get_progress_from_db(user, &today, db_connection)?
        .unwrap_or_else(|| DailyProgress::empty(today)))
}

/// Saves in-progress state for a day. `completed` is always derived from the
/// distinct task indices sent, never taken from the caller. Without a
/// `total` the stored one is kept.
pub fn save_today(
    db_connection: &Connection,
    user: &UserId,
    request: SaveTodayRequest,
) -> ApiResult<DailyProgress> {
    let date = request
        .date
        .ok_or_else(|| ApiError::validation("Invalid payload"))?;
    let completed_task_ids = distinct_task_ids(request.completed_task_ids.unwrap_or_default());

    let progress = ProgressUpdate {
        date,
        completed: completed_task_ids.len() as u32,
        total: request.total,
        completed_task_ids,
    };

    let stored = upsert_progress_to_db(user, &progress, db_connection)?;
    debug!(user = %user, date = %stored.date, completed = stored.completed, "saved partial progress");

    Ok(stored)
}

/// Saves the end-of-day summary. `completed` and `total` are stored exactly
/// as supplied.
pub fn save_final(
    db_connection: &Connection,
    user: &UserId,
    request: SaveFinalRequest,
) -> ApiResult<DailyProgress> {
    let (date, completed, total) = match (request.date, request.completed, request.total) {
        (Some(date), Some(completed), Some(total)) => (date, completed, total),
        _ => return Err(ApiError::validation("Missing required fields")),
    };

    let progress = ProgressUpdate {
        date,
        completed,
        total: Some(total),
        completed_task_ids: distinct_task_ids(request.completed_task_ids.unwrap_or_default()),
    };

    let stored = upsert_progress_to_db(user, &progress, db_connection)?;
    info!(user = %user, date = %stored.date, completed, total, "saved final progress");

    Ok(stored)
}

fn parse_year_and_month(year: Option<&str>, month: Option<&str>) -> ApiResult<(u32, u32)> {
    let missing = || ApiError::validation("Year and month required");

    let year: u32 = year
        .ok_or_else(missing)?
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Invalid year"))?;
    let month: u32 = month
        .ok_or_else(missing)?
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Invalid month"))?;

    if year > 9999 {
        return Err(ApiError::validation("Invalid year"));
    }
    if !(1..=12).contains(&month) {
        return Err(ApiError::validation("Invalid month"));
    }

    Ok((year, month))
}

/// Day component bounds are compared as strings, so `-31` covers every
/// month regardless of its real length.
pub fn get_month(
    db_connection: &Connection,
    user: &UserId,
    year: Option<&str>,
    month: Option<&str>,
) -> ApiResult<MonthProgress> {
    let (year, month) = parse_year_and_month(year, month)?;
    let start = format!("{:04}-{:02}-01", year, month);
    let end = format!("{:04}-{:02}-31", year, month);

    Ok(get_progress_in_range_from_db(user, &start, &end, db_connection)?
        .into_iter()
        .map(|summary| {
            (
                summary.date,
                DayTotals {
                    completed: summary.completed,
                    total: summary.total,
                },
            )
        })
        .collect())
}

pub fn get_streaks(db_connection: &Connection, user: &UserId, clock: &dyn Clock) -> ApiResult<Streaks> {
    let summaries = get_progress_summaries_from_db(user, db_connection)?;

    Ok(calculate_streaks(&summaries, clock.today()))
}
