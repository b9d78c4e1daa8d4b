use std::collections::BTreeSet;

use super::data::{ProgressSummary, Streaks};
use crate::date_key::DateKey;

/// Computes the current and best completion streaks.
///
/// The current streak counts consecutive completed days walking back from
/// the day before `today`; today is still in progress and never counts.
/// The best streak is the longest run of consecutive completed days anywhere
/// in the history.
pub fn calculate_streaks(records: &[ProgressSummary], today: DateKey) -> Streaks {
    let completed_days: BTreeSet<DateKey> = records
        .iter()
        .filter(|record| record.is_complete())
        .map(|record| record.date)
        .collect();

    Streaks {
        streak: current_streak(&completed_days, today),
        best_streak: best_streak(&completed_days),
    }
}

fn current_streak(completed_days: &BTreeSet<DateKey>, today: DateKey) -> u32 {
    let mut streak = 0;
    let mut cursor = today.pred();

    while let Some(day) = cursor {
        if !completed_days.contains(&day) {
            break;
        }

        streak += 1;
        cursor = day.pred();
    }

    streak
}

fn best_streak(completed_days: &BTreeSet<DateKey>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<DateKey> = None;

    for day in completed_days {
        run = match previous {
            Some(previous) if day.days_since(&previous) == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(*day);
    }

    best
}
