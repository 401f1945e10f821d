//! Store port for task persistence, queries, and snapshot subscriptions.

use crate::task::domain::{MemberUid, Phase, Task, TaskId, TeamId};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;

/// Maximum number of items a backing document store accepts in a
/// "value is one of a list" filter. Wider filters must be chunked through
/// [`crate::task::ports::batch`].
pub const MAX_SET_FILTER_ITEMS: usize = 10;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Filter predicate over a phase's task table.
///
/// All populated criteria must match. The team list is a set-membership
/// predicate bounded by [`MAX_SET_FILTER_ITEMS`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    phase: Option<Phase>,
    team_ids: Vec<TeamId>,
    assignee: Option<MemberUid>,
    created_by: Option<MemberUid>,
}

impl TaskFilter {
    /// Creates a filter scoped to one phase table.
    #[must_use]
    pub fn for_phase(phase: Phase) -> Self {
        Self {
            phase: Some(phase),
            ..Self::default()
        }
    }

    /// Restricts the filter to a single team.
    #[must_use]
    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_ids = vec![team_id];
        self
    }

    /// Restricts the filter to a set of teams ("value is one of a list").
    #[must_use]
    pub fn with_teams(mut self, team_ids: Vec<TeamId>) -> Self {
        self.team_ids = team_ids;
        self
    }

    /// Restricts the filter to tasks naming the member as an assignee.
    #[must_use]
    pub fn with_assignee(mut self, uid: MemberUid) -> Self {
        self.assignee = Some(uid);
        self
    }

    /// Restricts the filter to tasks created by the managing user.
    #[must_use]
    pub fn with_creator(mut self, uid: MemberUid) -> Self {
        self.created_by = Some(uid);
        self
    }

    /// Returns the phase criterion, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Returns the team set-membership criterion.
    #[must_use]
    pub fn team_ids(&self) -> &[TeamId] {
        &self.team_ids
    }

    /// Returns the width of the set-membership criterion.
    #[must_use]
    pub fn set_width(&self) -> usize {
        self.team_ids.len()
    }

    /// Returns true when the task satisfies every populated criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if self.phase.is_some_and(|phase| task.phase() != phase) {
            return false;
        }
        if !self.team_ids.is_empty() && !self.team_ids.contains(task.team().id()) {
            return false;
        }
        if let Some(uid) = &self.assignee
            && !task.assignment().includes(uid)
        {
            return false;
        }
        if let Some(uid) = &self.created_by
            && task.created_by() != uid
        {
            return false;
        }
        true
    }
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A conditional update lost against a concurrent writer.
    #[error("task {task_id}: version conflict (expected {expected}, stored {stored})")]
    VersionConflict {
        /// Identifier of the contested task.
        task_id: TaskId,
        /// Version the writer read before mutating.
        expected: u64,
        /// Version currently persisted.
        stored: u64,
    },

    /// A set-membership filter exceeded [`MAX_SET_FILTER_ITEMS`].
    #[error("set filter holds {items} items, store accepts at most {MAX_SET_FILTER_ITEMS}")]
    SetFilterTooLarge {
        /// Number of items the rejected filter held.
        items: usize,
    },

    /// Persistence-layer failure (network, permission).
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Live stream of full snapshots for one subscribed filter.
///
/// The store delivers the current snapshot on subscription, then a fresh
/// snapshot after every change to the filtered set. Dropping the
/// subscription tears it down.
#[derive(Debug)]
pub struct TaskSubscription {
    rx: mpsc::UnboundedReceiver<Vec<Task>>,
}

impl TaskSubscription {
    /// Creates a connected sender/subscription pair for store adapters.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<Vec<Task>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Awaits the next snapshot; `None` once the store drops the stream.
    pub async fn next(&mut self) -> Option<Vec<Task>> {
        self.rx.recv().await
    }
}

impl Stream for TaskSubscription {
    type Item = Vec<Task>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Task persistence contract.
///
/// Every operation is asynchronous and may block on a network round-trip.
/// No ordering is guaranteed across independent clients; concurrency control
/// is limited to the per-document version check in [`TaskStore::update`].
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID already
    /// exists.
    async fn create(&self, task: &Task) -> TaskStoreResult<()>;

    /// Persists changes to an existing task via a conditional update.
    ///
    /// The write succeeds only when the stored version matches the version
    /// the caller read; the store then advances the version.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist, or
    /// [`TaskStoreError::VersionConflict`] when a concurrent writer got
    /// there first.
    async fn update(&self, task: &Task) -> TaskStoreResult<()>;

    /// Removes a task record. No soft-delete semantics.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Finds a task by identifier; `None` when absent.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Returns all tasks matching the filter, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::SetFilterTooLarge`] when the team list
    /// exceeds [`MAX_SET_FILTER_ITEMS`].
    async fn query(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>>;

    /// Opens a live snapshot stream for the filter.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::SetFilterTooLarge`] when the team list
    /// exceeds [`MAX_SET_FILTER_ITEMS`].
    async fn subscribe(&self, filter: TaskFilter) -> TaskStoreResult<TaskSubscription>;
}
