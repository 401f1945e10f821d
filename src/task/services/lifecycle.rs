//! Lifecycle engine: create, edit, and status-change operations.

use crate::task::{
    domain::{
        Assignee, Assignment, AttachmentRef, DescriptivePatch, DueSchedule, MemberUid,
        NewTaskData, Phase, RescheduleOutcome, Task, TaskDetails, TaskDomainError, TaskId,
        TaskManager, TaskStatus, TeamRef,
    },
    ports::{TaskStore, TaskStoreError},
    services::gate::{GateDecision, PhaseGateEvaluator},
};
use chrono::{NaiveDate, NaiveTime};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by lifecycle engine operations.
///
/// Policy rejections (validation, gate, revision cap, transition rules) are
/// raised before any persistence attempt; a rejected operation leaves the
/// stored task unchanged. Store failures surface unwrapped and are never
/// retried here.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// Domain validation or transition rule failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Creation attempted while the target phase's gate is closed.
    #[error(
        "cannot create {} tasks for team '{team}': {completed}/{total} {} tasks completed",
        phase.label(),
        prior.label()
    )]
    GateClosed {
        /// Display name of the blocked team.
        team: String,
        /// The phase creation was attempted in.
        phase: Phase,
        /// The prior phase whose completion the gate requires.
        prior: Phase,
        /// Completed prior-phase tasks.
        completed: usize,
        /// Total prior-phase tasks.
        total: usize,
    },

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for lifecycle engine operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    phase: Phase,
    team: TeamRef,
    manager: TaskManager,
    created_by: MemberUid,
    category: String,
    title: String,
    subtask: Option<String>,
    elements: Option<String>,
    methodology: Option<String>,
    phase_label: Option<String>,
    comment: Option<String>,
    assignees: Vec<Assignee>,
    whole_team: bool,
    due_date: Option<NaiveDate>,
    due_time: Option<NaiveTime>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        phase: Phase,
        team: TeamRef,
        manager: TaskManager,
        created_by: MemberUid,
        category: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            team,
            manager,
            created_by,
            category: category.into(),
            title: title.into(),
            subtask: None,
            elements: None,
            methodology: None,
            phase_label: None,
            comment: None,
            assignees: Vec::new(),
            whole_team: false,
            due_date: None,
            due_time: None,
        }
    }

    /// Sets the subtask annotation.
    #[must_use]
    pub fn with_subtask(mut self, subtask: impl Into<String>) -> Self {
        self.subtask = Some(subtask.into());
        self
    }

    /// Sets the elements annotation.
    #[must_use]
    pub fn with_elements(mut self, elements: impl Into<String>) -> Self {
        self.elements = Some(elements.into());
        self
    }

    /// Sets the methodology annotation.
    #[must_use]
    pub fn with_methodology(mut self, methodology: impl Into<String>) -> Self {
        self.methodology = Some(methodology.into());
        self
    }

    /// Sets the phase label annotation.
    #[must_use]
    pub fn with_phase_label(mut self, phase_label: impl Into<String>) -> Self {
        self.phase_label = Some(phase_label.into());
        self
    }

    /// Sets the manager comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Assigns the task to named members.
    #[must_use]
    pub fn assigned_to(mut self, assignees: impl IntoIterator<Item = Assignee>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self.whole_team = false;
        self
    }

    /// Assigns the task to the whole team.
    #[must_use]
    pub const fn for_whole_team(mut self) -> Self {
        self.whole_team = true;
        self
    }

    /// Sets the due date part of the deadline.
    #[must_use]
    pub const fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Sets the due time part of the deadline.
    #[must_use]
    pub const fn with_due_time(mut self, time: NaiveTime) -> Self {
        self.due_time = Some(time);
        self
    }

    fn details(&self) -> Result<TaskDetails, TaskDomainError> {
        let mut details = TaskDetails::new(self.category.clone(), self.title.clone())?;
        if let Some(subtask) = &self.subtask {
            details = details.with_subtask(subtask.clone());
        }
        if let Some(elements) = &self.elements {
            details = details.with_elements(elements.clone());
        }
        if let Some(methodology) = &self.methodology {
            details = details.with_methodology(methodology.clone());
        }
        if let Some(phase_label) = &self.phase_label {
            details = details.with_phase_label(phase_label.clone());
        }
        if let Some(comment) = &self.comment {
            details = details.with_comment(comment.clone());
        }
        Ok(details)
    }

    fn assignment(&self) -> Result<Assignment, TaskDomainError> {
        if self.whole_team {
            Ok(Assignment::whole_team())
        } else {
            Assignment::members(self.assignees.clone())
        }
    }
}

/// Task lifecycle orchestration engine.
///
/// All operations validate locally before writing; persistence runs through
/// the store's conditional update, so a concurrent writer surfaces as a
/// version conflict rather than a silent lost update.
pub struct LifecycleEngine<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    gate: PhaseGateEvaluator<S, C>,
}

impl<S, C> Clone for LifecycleEngine<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            gate: self.gate.clone(),
        }
    }
}

impl<S, C> LifecycleEngine<S, C>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an engine over the given store and clock.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        let gate = PhaseGateEvaluator::new(Arc::clone(&store), Arc::clone(&clock));
        Self { store, clock, gate }
    }

    /// Returns the engine's phase gate evaluator, shared with task
    /// creation, for verdict recording and reactive watches.
    #[must_use]
    pub const fn gate(&self) -> &PhaseGateEvaluator<S, C> {
        &self.gate
    }

    /// Creates a task in `ToDo` at revision zero.
    ///
    /// # Errors
    ///
    /// Returns a domain validation error when required fields are missing,
    /// [`LifecycleError::GateClosed`] when the target phase's gate is closed
    /// for the team, or a store error when persistence fails. Nothing is
    /// written on rejection.
    pub async fn create_task(&self, request: CreateTaskRequest) -> LifecycleResult<Task> {
        let details = request.details()?;
        let assignment = request.assignment()?;

        let decision = self.gate.evaluate(request.team.id(), request.phase).await?;
        if !decision.open {
            return Err(gate_closed(request.team.name(), &decision));
        }

        let task = Task::new(
            NewTaskData {
                phase: request.phase,
                team: request.team,
                manager: request.manager,
                created_by: request.created_by,
                details,
                assignment,
                schedule: DueSchedule::new(request.due_date, request.due_time),
            },
            &*self.clock,
        );
        self.store.create(&task).await?;
        tracing::info!(
            task_id = %task.id(),
            phase = %task.phase(),
            team = %task.team().id(),
            "task created"
        );
        Ok(task)
    }

    /// Edits descriptive fields and, optionally, the assignment.
    ///
    /// Carries no status or revision side effects.
    ///
    /// # Errors
    ///
    /// Returns a domain error when a patched required field is blank, or a
    /// store error when the task is missing or the write fails.
    pub async fn edit_descriptive_fields(
        &self,
        id: TaskId,
        patch: DescriptivePatch,
        assignment: Option<Assignment>,
    ) -> LifecycleResult<Task> {
        let mut task = self.require(id).await?;
        task.edit_details(patch, &*self.clock)?;
        if let Some(assignment) = assignment {
            task.reassign(assignment, &*self.clock);
        }
        self.store.update(&task).await?;
        Ok(task)
    }

    /// Edits the due date and time, applying the revision rule.
    ///
    /// An unchanged deadline is a no-op and skips the write entirely.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::RevisionCapReached`] at the revision cap,
    /// or a store error when the task is missing or the write fails.
    pub async fn edit_due_date_time(
        &self,
        id: TaskId,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> LifecycleResult<(Task, RescheduleOutcome)> {
        let mut task = self.require(id).await?;
        let outcome = task.reschedule(date, time, &*self.clock)?;
        if outcome == RescheduleOutcome::Unchanged {
            return Ok((task, outcome));
        }
        self.store.update(&task).await?;
        tracing::debug!(
            task_id = %task.id(),
            status = %task.status(),
            revision = task.revision().value(),
            "deadline edited"
        );
        Ok((task, outcome))
    }

    /// Applies a manual status transition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ManualMissedTransition`] when the target
    /// is `Missed`, or a store error when the task is missing or the write
    /// fails.
    pub async fn set_status(&self, id: TaskId, status: TaskStatus) -> LifecycleResult<Task> {
        let mut task = self.require(id).await?;
        task.set_status(status, &*self.clock)?;
        self.store.update(&task).await?;
        Ok(task)
    }

    /// Records an attachment reference returned by external storage.
    ///
    /// # Errors
    ///
    /// Returns a store error when the task is missing or the write fails.
    pub async fn add_attachment(
        &self,
        id: TaskId,
        attachment: AttachmentRef,
    ) -> LifecycleResult<Task> {
        let mut task = self.require(id).await?;
        task.add_attachment(attachment, &*self.clock);
        self.store.update(&task).await?;
        Ok(task)
    }

    /// Removes an attachment reference; a no-op skips the write.
    ///
    /// # Errors
    ///
    /// Returns a store error when the task is missing or the write fails.
    pub async fn remove_attachment(&self, id: TaskId, path: &str) -> LifecycleResult<Task> {
        let mut task = self.require(id).await?;
        if task.remove_attachment(path, &*self.clock) {
            self.store.update(&task).await?;
        }
        Ok(task)
    }

    /// Removes a task record. No soft-delete semantics.
    ///
    /// # Errors
    ///
    /// Returns a store error when the task is missing or the delete fails.
    pub async fn delete_task(&self, id: TaskId) -> LifecycleResult<()> {
        self.store.delete(id).await?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    async fn require(&self, id: TaskId) -> LifecycleResult<Task> {
        let task = self.store.find_by_id(id).await?;
        task.ok_or_else(|| TaskStoreError::NotFound(id).into())
    }
}

fn gate_closed(team_name: &str, decision: &GateDecision) -> LifecycleError {
    let (completed, total) = decision
        .stats
        .map_or((0, 0), |stats| (stats.completed, stats.total));
    LifecycleError::GateClosed {
        team: team_name.to_owned(),
        phase: decision.phase,
        prior: decision.prior.unwrap_or(decision.phase),
        completed,
        total,
    }
}
