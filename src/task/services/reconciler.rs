//! Deadline reconciler: converts overdue tasks to `Missed`.

use crate::task::{
    domain::Task,
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskSubscription},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Returns the tasks in the snapshot that are overdue at `now`: due instant
/// present and strictly past, status neither `Completed` nor `Missed`.
///
/// Pure over `(snapshot, now)`, so sweep behaviour is testable without a
/// live store.
#[must_use]
pub fn overdue(snapshot: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    snapshot.iter().filter(|task| task.is_overdue(now)).collect()
}

/// Consumes store change notifications and flips overdue tasks to `Missed`.
///
/// The reconciler never polls: it reacts to snapshots, evaluating `now` at
/// event-handling time. It never mutates the revision counter, and re-running
/// it against an already-reconciled snapshot writes nothing.
pub struct DeadlineReconciler<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> Clone for DeadlineReconciler<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> DeadlineReconciler<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a reconciler over the given store and clock.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Sweeps one snapshot, persisting a `Missed` flip for each overdue
    /// task. Returns how many tasks were flipped.
    ///
    /// A version conflict means the snapshot row is stale (e.g. a client
    /// extended the deadline concurrently); the row is skipped and the next
    /// change notification re-delivers authoritative state, so the later
    /// writer wins. Concurrently deleted tasks are skipped the same way.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError`] for persistence failures other than the
    /// conflicts handled above.
    pub async fn sweep(&self, snapshot: &[Task]) -> TaskStoreResult<usize> {
        let now = self.clock.utc();
        let mut flipped = 0;
        for task in overdue(snapshot, now) {
            let mut update = task.clone();
            if !update.mark_missed(now) {
                continue;
            }
            match self.store.update(&update).await {
                Ok(()) => {
                    flipped += 1;
                    tracing::debug!(task_id = %update.id(), "overdue task marked missed");
                }
                Err(TaskStoreError::VersionConflict { task_id, .. }) => {
                    tracing::debug!(task_id = %task_id, "stale snapshot row, skipping");
                }
                Err(TaskStoreError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(flipped)
    }

    /// Drives the reconciler from a live subscription until the stream
    /// closes. Sweep failures are logged and do not stop the loop; the next
    /// notification retries naturally.
    pub async fn run(&self, mut subscription: TaskSubscription) {
        while let Some(snapshot) = subscription.next().await {
            if let Err(err) = self.sweep(&snapshot).await {
                tracing::warn!(error = %err, "reconciler sweep failed");
            }
        }
    }
}
