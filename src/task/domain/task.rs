//! Task aggregate root and lifecycle transition rules.

use super::{
    Assignment, DescriptivePatch, DueSchedule, MemberUid, Phase, Revision, TaskDetails,
    TaskDomainError, TaskId, TaskStatus, TeamRef,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role that owns and creates a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskManager {
    /// The team's student project manager.
    ProjectManager,
    /// The team's faculty adviser.
    Adviser,
}

impl TaskManager {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectManager => "project_manager",
            Self::Adviser => "adviser",
        }
    }
}

impl fmt::Display for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to an externally stored attachment.
///
/// The engine never inspects attachment content; it only carries the storage
/// path returned by the external upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef(String);

impl AttachmentRef {
    /// Creates a validated attachment reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when the path is blank.
    pub fn new(path: impl Into<String>) -> Result<Self, TaskDomainError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(TaskDomainError::BlankField("attachment path"));
        }
        Ok(Self(path))
    }

    /// Returns the storage path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of a deadline edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleOutcome {
    /// The submitted date and time match the stored pair; nothing changed.
    Unchanged,
    /// The deadline moved without touching status or revision.
    Moved,
    /// The deadline moved on a late-stage task: the revision counter was
    /// bumped and the status reset to `ToDo`.
    MovedWithRevision,
}

/// Parameter object for creating a new task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Defense phase the task belongs to.
    pub phase: Phase,
    /// Owning team reference.
    pub team: TeamRef,
    /// Role that owns the task.
    pub manager: TaskManager,
    /// Uid of the managing user who created the task.
    pub created_by: MemberUid,
    /// Validated descriptive metadata.
    pub details: TaskDetails,
    /// Validated assignment.
    pub assignment: Assignment,
    /// Initial deadline, possibly unscheduled.
    pub schedule: DueSchedule,
}

/// Task aggregate root.
///
/// Identity, phase, team, manager role, and creator are fixed at creation.
/// Status and revision evolve only through the transition methods below,
/// which encode the lifecycle rules; the write `version` is managed by the
/// store and backs its conditional-update check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    phase: Phase,
    team: TeamRef,
    manager: TaskManager,
    created_by: MemberUid,
    details: TaskDetails,
    assignment: Assignment,
    schedule: DueSchedule,
    status: TaskStatus,
    revision: Revision,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentRef>,
    version: u64,
}

impl Task {
    /// Creates a new task in `ToDo` at revision zero.
    #[must_use]
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            phase: data.phase,
            team: data.team,
            manager: data.manager,
            created_by: data.created_by,
            details: data.details,
            assignment: data.assignment,
            schedule: data.schedule,
            status: TaskStatus::ToDo,
            revision: Revision::initial(),
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
            attachments: Vec::new(),
            version: 0,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the defense phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the owning team reference.
    #[must_use]
    pub const fn team(&self) -> &TeamRef {
        &self.team
    }

    /// Returns the owning manager role.
    #[must_use]
    pub const fn manager(&self) -> TaskManager {
        self.manager
    }

    /// Returns the creator's member uid.
    #[must_use]
    pub const fn created_by(&self) -> &MemberUid {
        &self.created_by
    }

    /// Returns the descriptive metadata.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the assignment.
    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Returns the deadline schedule.
    #[must_use]
    pub const fn schedule(&self) -> &DueSchedule {
        &self.schedule
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the revision counter.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, set while the status is
    /// `Completed`.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the attachment references.
    #[must_use]
    pub fn attachments(&self) -> &[AttachmentRef] {
        &self.attachments
    }

    /// Returns the store-managed write version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns true when the deadline has passed and the status is still an
    /// overdue candidate.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_overdue_candidate() && self.schedule.is_overdue_at(now)
    }

    /// Applies a partial edit to the descriptive fields.
    ///
    /// Carries no status or revision side effects.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when a patched required field
    /// is blank.
    pub fn edit_details(
        &mut self,
        patch: DescriptivePatch,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.details.apply(patch)?;
        self.touch(clock.utc());
        Ok(())
    }

    /// Replaces the assignment.
    ///
    /// Carries no status or revision side effects.
    pub fn reassign(&mut self, assignment: Assignment, clock: &impl Clock) {
        self.assignment = assignment;
        self.touch(clock.utc());
    }

    /// Edits the due date and time, applying the revision rule.
    ///
    /// A changed deadline on a late-stage task (`ToReview` or `Missed`)
    /// bumps the revision counter and resets the status to `ToDo`. `ToDo`
    /// and `InProgress` tasks keep status and revision. A `Completed` task
    /// keeps its status and revision while the new deadline is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::RevisionCapReached`] when the revision
    /// counter is at its cap, for any input.
    pub fn reschedule(
        &mut self,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        clock: &impl Clock,
    ) -> Result<RescheduleOutcome, TaskDomainError> {
        if self.revision.is_capped() {
            return Err(TaskDomainError::RevisionCapReached { task_id: self.id });
        }

        let next = DueSchedule::new(date, time);
        if next == self.schedule {
            return Ok(RescheduleOutcome::Unchanged);
        }

        let outcome = if self.status.resets_on_reschedule() {
            // bump cannot fail below the cap, which was checked above
            if let Some(bumped) = self.revision.bump() {
                self.revision = bumped;
            }
            self.status = TaskStatus::ToDo;
            RescheduleOutcome::MovedWithRevision
        } else {
            RescheduleOutcome::Moved
        };

        self.schedule = next;
        self.touch(clock.utc());
        Ok(outcome)
    }

    /// Applies a manual status transition.
    ///
    /// Entering `Completed` records the completion timestamp; leaving it
    /// clears the timestamp again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ManualMissedTransition`] when the target
    /// is `Missed`, which only the deadline reconciler may set.
    pub fn set_status(
        &mut self,
        new_status: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if new_status == TaskStatus::Missed {
            return Err(TaskDomainError::ManualMissedTransition {
                task_id: self.id,
                from: self.status,
            });
        }

        let timestamp = clock.utc();
        self.completed_at = (new_status == TaskStatus::Completed).then_some(timestamp);
        self.status = new_status;
        self.touch(timestamp);
        Ok(())
    }

    /// Reconciler entry point: flips an overdue candidate to `Missed`.
    ///
    /// Returns true when the status changed. Leaves the revision counter
    /// untouched and is a no-op on tasks that are not overdue at `now`,
    /// which makes repeated sweeps idempotent.
    pub fn mark_missed(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_overdue(now) {
            return false;
        }
        self.status = TaskStatus::Missed;
        self.touch(now);
        true
    }

    /// Records an attachment reference returned by external storage.
    pub fn add_attachment(&mut self, attachment: AttachmentRef, clock: &impl Clock) {
        self.attachments.push(attachment);
        self.touch(clock.utc());
    }

    /// Removes an attachment reference; returns true when it was present.
    pub fn remove_attachment(&mut self, path: &str, clock: &impl Clock) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|a| a.as_str() != path);
        let removed = self.attachments.len() != before;
        if removed {
            self.touch(clock.utc());
        }
        removed
    }

    /// Advances the store-managed write version. Called by store adapters
    /// on successful conditional update.
    pub(crate) const fn bump_version(&mut self) {
        self.version += 1;
    }

    fn touch(&mut self, timestamp: DateTime<Utc>) {
        self.updated_at = timestamp;
    }
}
