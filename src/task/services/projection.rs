//! Read-side projection expanding a task into per-assignee display rows.

use crate::task::domain::{MemberUid, Phase, Revision, Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};

/// Display name used for the single row of a whole-team assignment.
pub const WHOLE_TEAM_LABEL: &str = "Team";

/// One display row of a task.
///
/// Rows referencing the same `task_id` share identity: a mutation through
/// the lifecycle engine targets the single underlying record no matter how
/// many rows a view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    /// Identifier of the underlying task record.
    pub task_id: TaskId,
    /// Member uid; `None` for the whole-team row.
    pub member_uid: Option<MemberUid>,
    /// Member display name, or [`WHOLE_TEAM_LABEL`].
    pub member_name: String,
    /// Task title.
    pub title: String,
    /// Defense phase.
    pub phase: Phase,
    /// Current status.
    pub status: TaskStatus,
    /// Revision counter.
    pub revision: Revision,
    /// Derived due instant, if scheduled.
    pub due_at: Option<DateTime<Utc>>,
}

/// Expands a task into one row per assignee, or a single "Team" row for a
/// whole-team assignment.
///
/// Strictly a read-side view: the task record is never duplicated or
/// written.
#[must_use]
pub fn assignment_rows(task: &Task) -> Vec<TaskRow> {
    let shared = |member_uid: Option<MemberUid>, member_name: String| TaskRow {
        task_id: task.id(),
        member_uid,
        member_name,
        title: task.details().title().to_owned(),
        phase: task.phase(),
        status: task.status(),
        revision: task.revision(),
        due_at: task.schedule().due_at(),
    };

    if task.assignment().is_whole_team() {
        return vec![shared(None, WHOLE_TEAM_LABEL.to_owned())];
    }

    task.assignment()
        .assignees()
        .iter()
        .map(|assignee| shared(Some(assignee.uid().clone()), assignee.name().to_owned()))
        .collect()
}
