//! Chunked queries and subscriptions over the store's set-filter limit.
//!
//! The backing document store rejects "value is one of a list" filters wider
//! than [`MAX_SET_FILTER_ITEMS`]. These helpers split a wide team set into
//! compliant batches and merge the results, so gate evaluation and
//! cross-team views never hand-roll the batching loop.

use super::store::{
    MAX_SET_FILTER_ITEMS, TaskFilter, TaskStore, TaskStoreResult, TaskSubscription,
};
use crate::task::domain::{Task, TaskId, TeamId};
use futures::StreamExt;
use futures::stream::{BoxStream, SelectAll};
use std::collections::HashSet;

/// Runs one query per ≤10-team batch and merges the results.
///
/// Results keep the per-batch creation-time ordering and are deduplicated by
/// task id in case batches overlap.
///
/// # Errors
///
/// Propagates the first store error encountered.
pub async fn chunked_query<S>(
    store: &S,
    template: &TaskFilter,
    team_ids: &[TeamId],
) -> TaskStoreResult<Vec<Task>>
where
    S: TaskStore + ?Sized,
{
    let mut merged = Vec::new();
    let mut seen: HashSet<TaskId> = HashSet::new();
    for batch in team_ids.chunks(MAX_SET_FILTER_ITEMS) {
        let filter = template.clone().with_teams(batch.to_vec());
        for task in store.query(&filter).await? {
            if seen.insert(task.id()) {
                merged.push(task);
            }
        }
    }
    Ok(merged)
}

/// A set of per-batch subscriptions merged into one snapshot stream.
///
/// One store subscription is held per ≤10-team batch; the set is created
/// together and torn down together when this value drops. Each batch's
/// initial snapshot is drained at open time, so every emission is the union
/// of a complete set of per-batch snapshots.
pub struct ChunkedSubscription {
    latest: Vec<Vec<Task>>,
    merged: SelectAll<BoxStream<'static, (usize, Vec<Task>)>>,
}

impl ChunkedSubscription {
    /// Subscribes to the filter template across all team batches and drains
    /// each batch's initial snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the first store error encountered while opening the
    /// per-batch subscriptions.
    pub async fn open<S>(
        store: &S,
        template: &TaskFilter,
        team_ids: &[TeamId],
    ) -> TaskStoreResult<Self>
    where
        S: TaskStore + ?Sized,
    {
        let mut latest = Vec::new();
        let mut streams = Vec::new();
        for (index, batch) in team_ids.chunks(MAX_SET_FILTER_ITEMS).enumerate() {
            let filter = template.clone().with_teams(batch.to_vec());
            let mut subscription: TaskSubscription = store.subscribe(filter).await?;
            latest.push(subscription.next().await.unwrap_or_default());
            streams.push(subscription.map(move |snapshot| (index, snapshot)).boxed());
        }
        Ok(Self {
            latest,
            merged: futures::stream::select_all(streams),
        })
    }

    /// Returns the merged union of the latest per-batch snapshots without
    /// awaiting a change.
    #[must_use]
    pub fn current(&self) -> Vec<Task> {
        self.latest.iter().flatten().cloned().collect()
    }

    /// Awaits the next change on any batch and returns the merged snapshot.
    ///
    /// Returns `None` once every underlying subscription has closed.
    pub async fn next(&mut self) -> Option<Vec<Task>> {
        let (index, snapshot) = self.merged.next().await?;
        if let Some(slot) = self.latest.get_mut(index) {
            *slot = snapshot;
        }
        Some(self.latest.iter().flatten().cloned().collect())
    }
}
