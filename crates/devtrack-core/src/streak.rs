//! Streak tracking over the activity log.
//!
//! A streak is a run of consecutive calendar days with at least one
//! activity each. `current_streak` is the run ending at "today";
//! `longest_streak` is the longest run anywhere in history. The two are
//! computed independently: a broken current streak never shrinks the
//! historical longest.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::activity::Activity;

/// Derived streak state. Never stored; recomputed from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive days with activity, ending at today. Zero the instant
    /// today has no activity ("as-of-now" semantics -- yesterday's run
    /// does not count until something is logged today).
    pub current_streak: u32,
    /// Longest run of consecutive active days across the full history.
    pub longest_streak: u32,
    /// Number of distinct days with at least one activity.
    pub total_active_days: u32,
}

/// Compute streak state from the activity log as of `today`.
///
/// Empty input yields all zeros.
pub fn compute_streak(activities: &[Activity], today: NaiveDate) -> StreakState {
    let dates: BTreeSet<NaiveDate> = activities.iter().map(|a| a.date).collect();
    StreakState {
        current_streak: current_streak(&dates, today),
        longest_streak: longest_streak(&dates),
        total_active_days: dates.len() as u32,
    }
}

/// Walk backward from `today` while each day is in the active set.
fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = today;
    let mut streak = 0;
    while dates.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest maximal run of consecutive dates anywhere in the set.
fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &date in dates {
        run = match prev {
            Some(p) if (date - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}
