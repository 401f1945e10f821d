//! Local overlay of in-flight writes over authoritative snapshots.
//!
//! A client applies an edit locally, enqueues the persistence call, and
//! keeps displaying its own copy until a store snapshot confirms the write
//! landed. Entries are dropped only on confirmation, never opportunistically,
//! so a stale snapshot cannot resurrect pre-edit state in the view.

use crate::task::domain::{Task, TaskId};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// A locally created task the store has not yet echoed back.
    Create(Task),
    /// A locally edited task awaiting its conditional update.
    Edit(Task),
}

impl Pending {
    const fn task(&self) -> &Task {
        match self {
            Self::Create(task) | Self::Edit(task) => task,
        }
    }
}

/// Outbox of optimistic local writes keyed by task id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeOutbox {
    pending: HashMap<TaskId, Pending>,
}

impl ChangeOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a locally created task.
    pub fn stage_create(&mut self, task: Task) {
        self.pending.insert(task.id(), Pending::Create(task));
    }

    /// Stages a locally edited task.
    pub fn stage_edit(&mut self, task: Task) {
        self.pending.insert(task.id(), Pending::Edit(task));
    }

    /// Returns the number of unconfirmed writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true when no writes are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Overlays pending writes onto an authoritative snapshot for display.
    ///
    /// Snapshot rows with a pending edit are replaced by the local copy;
    /// pending creations missing from the snapshot are appended.
    #[must_use]
    pub fn overlay(&self, snapshot: &[Task]) -> Vec<Task> {
        let mut view: Vec<Task> = snapshot
            .iter()
            .map(|task| {
                self.pending
                    .get(&task.id())
                    .map_or_else(|| task.clone(), |pending| pending.task().clone())
            })
            .collect();

        for pending in self.pending.values() {
            if let Pending::Create(task) = pending
                && !snapshot.iter().any(|row| row.id() == task.id())
            {
                view.push(task.clone());
            }
        }
        view
    }

    /// Drops every pending write the snapshot confirms.
    ///
    /// A creation is confirmed by presence; an edit is confirmed once the
    /// stored write version has advanced past the version the edit was based
    /// on. Entries the snapshot does not confirm stay pending.
    pub fn absorb(&mut self, snapshot: &[Task]) {
        self.pending.retain(|id, pending| {
            let Some(row) = snapshot.iter().find(|task| task.id() == *id) else {
                return true;
            };
            match pending {
                Pending::Create(_) => false,
                Pending::Edit(task) => row.version() <= task.version(),
            }
        });
    }
}
