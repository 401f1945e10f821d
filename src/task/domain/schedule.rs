//! Due date and time pair with the derived due instant.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Nullable due date plus nullable time-of-day.
///
/// The due instant is always derived from the pair and is never stored
/// independently: it exists only when both parts are present. Deadlines are
/// interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DueSchedule {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

impl DueSchedule {
    /// Creates a schedule from optional date and time parts.
    #[must_use]
    pub const fn new(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Self {
        Self { date, time }
    }

    /// Returns a schedule with no deadline.
    #[must_use]
    pub const fn unscheduled() -> Self {
        Self {
            date: None,
            time: None,
        }
    }

    /// Returns the calendar date part.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns the time-of-day part.
    #[must_use]
    pub const fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Returns the derived due instant, or `None` when either part is
    /// missing.
    #[must_use]
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        Some(self.date?.and_time(self.time?).and_utc())
    }

    /// Returns the derived due instant as epoch milliseconds.
    #[must_use]
    pub fn due_at_epoch_ms(&self) -> Option<i64> {
        self.due_at().map(|at| at.timestamp_millis())
    }

    /// Returns true when the due instant exists and lies strictly before
    /// `now`. Used by the reconciler to detect overdue tasks.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.due_at().is_some_and(|at| at < now)
    }

    /// Returns true when the due instant exists and is at or before `now`.
    /// Used by gate evaluation, where a deadline landing exactly on `now`
    /// already counts as elapsed.
    #[must_use]
    pub fn is_due_by(&self, now: DateTime<Utc>) -> bool {
        self.due_at().is_some_and(|at| at <= now)
    }
}
