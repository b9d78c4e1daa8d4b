use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};

use crate::date_key::DateKey;

pub type TaskIndex = u32;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: DateKey,
    pub completed: u32,
    pub total: u32,
    pub completed_task_ids: Vec<TaskIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyProgress {
    pub fn empty(date: DateKey) -> DailyProgress {
        DailyProgress {
            date,
            completed: 0,
            total: 0,
            completed_task_ids: vec![],
            created_at: None,
            updated_at: None,
        }
    }
}

/// A write to one day's record. A missing `total` keeps whatever total is
/// already stored, or 0 for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub date: DateKey,
    pub completed: u32,
    pub total: Option<u32>,
    pub completed_task_ids: Vec<TaskIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub date: DateKey,
    pub completed: u32,
    pub total: u32,
}

impl ProgressSummary {
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotals {
    pub completed: u32,
    pub total: u32,
}

pub type MonthProgress = BTreeMap<DateKey, DayTotals>;

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Streaks {
    pub streak: u32,
    pub best_streak: u32,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveTodayRequest {
    pub date: Option<DateKey>,
    pub completed_task_ids: Option<Vec<TaskIndex>>,
    pub total: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaveFinalRequest {
    pub date: Option<DateKey>,
    pub completed: Option<u32>,
    pub total: Option<u32>,
    pub completed_task_ids: Option<Vec<TaskIndex>>,
}

pub fn distinct_task_ids(task_ids: Vec<TaskIndex>) -> Vec<TaskIndex> {
    task_ids
        .into_iter()
        .collect::<BTreeSet<TaskIndex>>()
        .into_iter()
        .collect()
}
