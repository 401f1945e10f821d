//! Task status enumeration and transition predicates.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Manual transitions may target any status except [`TaskStatus::Missed`],
/// which is set exclusively by the deadline reconciler. A `Missed` task
/// returns to `ToDo` only when its deadline is pushed into the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    ToDo,
    /// Work is underway.
    InProgress,
    /// Work is awaiting the manager's review.
    ToReview,
    /// Work has been accepted; terminal under normal flow.
    Completed,
    /// The deadline passed before the task was completed.
    Missed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::ToReview => "to_review",
            Self::Completed => "completed",
            Self::Missed => "missed",
        }
    }

    /// Returns true when the reconciler may flip this status to `Missed`.
    #[must_use]
    pub const fn is_overdue_candidate(self) -> bool {
        matches!(self, Self::ToDo | Self::InProgress | Self::ToReview)
    }

    /// Returns true when pushing the deadline resets the task to `ToDo`
    /// and bumps the revision counter.
    #[must_use]
    pub const fn resets_on_reschedule(self) -> bool {
        matches!(self, Self::ToReview | Self::Missed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "to_review" => Ok(Self::ToReview),
            "completed" => Ok(Self::Completed),
            "missed" => Ok(Self::Missed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
