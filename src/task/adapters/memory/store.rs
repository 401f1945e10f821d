//! Thread-safe in-memory task store with live snapshot subscriptions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use crate::task::{
    domain::{Task, TaskId},
    ports::{
        MAX_SET_FILTER_ITEMS, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult,
        TaskSubscription,
    },
};

/// Thread-safe in-memory task store.
///
/// Mirrors the behaviour the engine expects from the backing document store:
/// conditional updates on the write version, the 10-item set-filter limit,
/// and a full filtered snapshot pushed to every live subscriber after each
/// change.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    subscribers: Vec<Subscriber>,
}

#[derive(Debug)]
struct Subscriber {
    filter: TaskFilter,
    tx: mpsc::UnboundedSender<Vec<Task>>,
    last_sent: Vec<Task>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks, for write-count assertions.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the state lock is
    /// poisoned.
    pub fn len(&self) -> TaskStoreResult<usize> {
        let state = read_state(&self.state)?;
        Ok(state.tasks.len())
    }

    /// Returns true when no tasks are stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the state lock is
    /// poisoned.
    pub fn is_empty(&self) -> TaskStoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn read_state(
    state: &Arc<RwLock<StoreState>>,
) -> TaskStoreResult<std::sync::RwLockReadGuard<'_, StoreState>> {
    state
        .read()
        .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
}

fn write_state(
    state: &Arc<RwLock<StoreState>>,
) -> TaskStoreResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
    state
        .write()
        .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
}

fn ensure_filter_width(filter: &TaskFilter) -> TaskStoreResult<()> {
    let items = filter.set_width();
    if items > MAX_SET_FILTER_ITEMS {
        return Err(TaskStoreError::SetFilterTooLarge { items });
    }
    Ok(())
}

/// Collects the filtered tasks ordered by creation time, oldest first.
/// Ties on the creation instant break on the task id, so snapshot order is
/// total and stable across queries.
fn snapshot(state: &StoreState, filter: &TaskFilter) -> Vec<Task> {
    let mut tasks: Vec<Task> = state
        .tasks
        .values()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    tasks.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
    tasks
}

/// Pushes a fresh snapshot to every subscriber whose filtered set changed,
/// pruning closed subscriptions.
fn notify_subscribers(state: &mut StoreState) {
    let subscribers = std::mem::take(&mut state.subscribers);
    state.subscribers = subscribers
        .into_iter()
        .filter_map(|mut subscriber| {
            let tasks = snapshot(state, &subscriber.filter);
            if tasks == subscriber.last_sent {
                return Some(subscriber);
            }
            subscriber.tx.send(tasks.clone()).ok()?;
            subscriber.last_sent = tasks;
            Some(subscriber)
        })
        .collect();
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = write_state(&self.state)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        notify_subscribers(&mut state);
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = write_state(&self.state)?;
        let stored_version = state
            .tasks
            .get(&task.id())
            .map(Task::version)
            .ok_or(TaskStoreError::NotFound(task.id()))?;

        if stored_version != task.version() {
            return Err(TaskStoreError::VersionConflict {
                task_id: task.id(),
                expected: task.version(),
                stored: stored_version,
            });
        }

        let mut next = task.clone();
        next.bump_version();
        state.tasks.insert(next.id(), next);
        notify_subscribers(&mut state);
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = write_state(&self.state)?;
        if state.tasks.remove(&id).is_none() {
            return Err(TaskStoreError::NotFound(id));
        }
        notify_subscribers(&mut state);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = read_state(&self.state)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn query(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        ensure_filter_width(filter)?;
        let state = read_state(&self.state)?;
        Ok(snapshot(&state, filter))
    }

    async fn subscribe(&self, filter: TaskFilter) -> TaskStoreResult<TaskSubscription> {
        ensure_filter_width(&filter)?;
        let mut state = write_state(&self.state)?;
        let (tx, subscription) = TaskSubscription::channel();
        // initial snapshot, then one per change to the filtered set
        let initial = snapshot(&state, &filter);
        if tx.send(initial.clone()).is_ok() {
            state.subscribers.push(Subscriber {
                filter,
                tx,
                last_sent: initial,
            });
        }
        Ok(subscription)
    }
}
