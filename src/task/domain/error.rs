//! Error types for task domain validation and lifecycle rules.

use thiserror::Error;

use super::{TaskId, TaskStatus};

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A required text field is empty after trimming.
    #[error("required field '{0}' must not be blank")]
    BlankField(&'static str),

    /// A task needs at least one named assignee or the whole-team marker.
    #[error("task requires at least one assignee or a whole-team assignment")]
    NoAssignees,

    /// The revision counter is at its cap; the deadline can no longer move.
    #[error("task {task_id} has reached the revision cap; create a new task instead")]
    RevisionCapReached {
        /// Identifier of the capped task.
        task_id: TaskId,
    },

    /// A caller attempted to move a task into `Missed` by hand.
    #[error("task {task_id}: manual transition from {from} to Missed is not permitted")]
    ManualMissedTransition {
        /// Identifier of the task being transitioned.
        task_id: TaskId,
        /// Status the task held when the transition was attempted.
        from: TaskStatus,
    },
}

/// Error returned while parsing phases from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown defense phase: {0}")]
pub struct ParsePhaseError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
