//! Clock and calendar utilities.
//!
//! Every other module that needs "now" or "today" goes through the
//! [`Clock`] trait so that tests can inject a fixed clock and get
//! deterministic streaks, sessions and analytics.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use crate::error::{CoreError, Result};

/// Source of the current instant.
///
/// Production code uses [`SystemClock`]; tests use [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of `now()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation of [`Clock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, settable for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    /// Pin the clock to midnight UTC of the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = now;
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock().expect("clock lock");
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// # Errors
/// Returns [`CoreError::InvalidDate`] for anything that is not a valid
/// calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| CoreError::InvalidDate {
        input: input.to_string(),
        message: e.to_string(),
    })
}

/// The day before `date`.
pub fn yesterday(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Day of week for a date.
pub fn day_of_week(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// Whole days from `a` to `b` (negative if `b` is before `a`).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}
