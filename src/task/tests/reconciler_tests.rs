//! Deadline reconciler sweep and run-loop tests.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;
use std::time::Duration;

use super::support::{FrozenClock, at, build_task, date, time};
use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{DueSchedule, Phase, Task, TaskId, TaskStatus},
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult, TaskSubscription},
    services::{DeadlineReconciler, overdue},
};
use rstest::rstest;

mockall::mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl TaskStore for Store {
        async fn create(&self, task: &Task) -> TaskStoreResult<()>;
        async fn update(&self, task: &Task) -> TaskStoreResult<()>;
        async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;
        async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;
        async fn query(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>>;
        async fn subscribe(&self, filter: TaskFilter) -> TaskStoreResult<TaskSubscription>;
    }
}

fn past_due() -> DueSchedule {
    DueSchedule::new(Some(date(2025, 1, 10)), Some(time(9, 0)))
}

#[rstest]
fn overdue_selects_only_candidate_statuses_with_elapsed_deadlines() {
    let clock = FrozenClock(at(2025, 1, 1, 8, 0));
    let now = at(2025, 2, 1, 0, 0);

    let open_task = build_task(Phase::TitleDefense, "team-1", past_due(), &clock);
    let mut completed = build_task(Phase::TitleDefense, "team-1", past_due(), &clock);
    completed
        .set_status(TaskStatus::Completed, &clock)
        .expect("completion should succeed");
    let mut missed = build_task(Phase::TitleDefense, "team-1", past_due(), &clock);
    assert!(missed.mark_missed(now));
    let unscheduled = build_task(
        Phase::TitleDefense,
        "team-1",
        DueSchedule::unscheduled(),
        &clock,
    );
    let future = build_task(
        Phase::TitleDefense,
        "team-1",
        DueSchedule::new(Some(date(2025, 3, 1)), Some(time(9, 0))),
        &clock,
    );

    let snapshot = vec![open_task.clone(), completed, missed, unscheduled, future];
    let flagged = overdue(&snapshot, now);

    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged.first().map(|task| task.id()), Some(open_task.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_is_idempotent_over_a_reconciled_snapshot() {
    let store = Arc::new(InMemoryTaskStore::new());
    let reconciler = DeadlineReconciler::new(
        Arc::clone(&store),
        Arc::new(FrozenClock(at(2025, 2, 1, 0, 0))),
    );
    let clock = FrozenClock(at(2025, 1, 1, 8, 0));
    let task = build_task(Phase::TitleDefense, "team-1", past_due(), &clock);
    store.create(&task).await.expect("create should succeed");

    let first_snapshot = store
        .query(&TaskFilter::for_phase(Phase::TitleDefense))
        .await
        .expect("query should succeed");
    let flipped = reconciler
        .sweep(&first_snapshot)
        .await
        .expect("sweep should succeed");
    assert_eq!(flipped, 1);

    let second_snapshot = store
        .query(&TaskFilter::for_phase(Phase::TitleDefense))
        .await
        .expect("query should succeed");
    let flipped_again = reconciler
        .sweep(&second_snapshot)
        .await
        .expect("sweep should succeed");
    assert_eq!(flipped_again, 0);

    let third_snapshot = store
        .query(&TaskFilter::for_phase(Phase::TitleDefense))
        .await
        .expect("query should succeed");
    assert_eq!(second_snapshot, third_snapshot);

    let stored = third_snapshot.first().expect("task present");
    assert_eq!(stored.status(), TaskStatus::Missed);
    assert_eq!(stored.revision().value(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_skips_stale_rows_so_the_later_writer_wins() {
    let store = Arc::new(InMemoryTaskStore::new());
    let reconciler = DeadlineReconciler::new(
        Arc::clone(&store),
        Arc::new(FrozenClock(at(2025, 2, 1, 0, 0))),
    );
    let clock = FrozenClock(at(2025, 1, 1, 8, 0));
    let task = build_task(Phase::TitleDefense, "team-1", past_due(), &clock);
    store.create(&task).await.expect("create should succeed");

    // the reconciler holds a snapshot taken before a client extends the
    // deadline into the future
    let stale_snapshot = vec![task.clone()];
    let mut extended = task.clone();
    extended
        .reschedule(Some(date(2025, 6, 1)), Some(time(9, 0)), &clock)
        .expect("reschedule should succeed");
    store.update(&extended).await.expect("update should succeed");

    let flipped = reconciler
        .sweep(&stale_snapshot)
        .await
        .expect("sweep should succeed");

    assert_eq!(flipped, 0);
    let stored = store
        .find_by_id(task.id())
        .await
        .expect("lookup should succeed")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::ToDo);
    assert_eq!(stored.schedule().date(), Some(date(2025, 6, 1)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_writes_nothing_when_nothing_is_overdue() {
    let mut store = MockStore::new();
    store.expect_update().times(0);
    let reconciler = DeadlineReconciler::new(
        Arc::new(store),
        Arc::new(FrozenClock(at(2025, 1, 5, 0, 0))),
    );
    let clock = FrozenClock(at(2025, 1, 1, 8, 0));
    let snapshot = vec![build_task(Phase::TitleDefense, "team-1", past_due(), &clock)];

    // clock sits before the due instant
    let flipped = reconciler
        .sweep(&snapshot)
        .await
        .expect("sweep should succeed");
    assert_eq!(flipped, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_surfaces_persistence_failures() {
    let mut store = MockStore::new();
    store.expect_update().returning(|_| {
        Err(TaskStoreError::persistence(std::io::Error::other(
            "store offline",
        )))
    });
    let reconciler = DeadlineReconciler::new(
        Arc::new(store),
        Arc::new(FrozenClock(at(2025, 2, 1, 0, 0))),
    );
    let clock = FrozenClock(at(2025, 1, 1, 8, 0));
    let snapshot = vec![build_task(Phase::TitleDefense, "team-1", past_due(), &clock)];

    let result = reconciler.sweep(&snapshot).await;
    assert!(matches!(result, Err(TaskStoreError::Persistence(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_loop_flips_overdue_tasks_from_change_notifications() {
    let store = Arc::new(InMemoryTaskStore::new());
    let reconciler = DeadlineReconciler::new(
        Arc::clone(&store),
        Arc::new(FrozenClock(at(2025, 2, 1, 0, 0))),
    );

    let subscription = store
        .subscribe(TaskFilter::for_phase(Phase::TitleDefense))
        .await
        .expect("subscribe should succeed");
    let worker = tokio::spawn({
        let reconciler = reconciler.clone();
        async move { reconciler.run(subscription).await }
    });

    let clock = FrozenClock(at(2025, 1, 1, 8, 0));
    let task = build_task(Phase::TitleDefense, "team-1", past_due(), &clock);
    store.create(&task).await.expect("create should succeed");

    let missed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stored = store
                .find_by_id(task.id())
                .await
                .expect("lookup should succeed")
                .expect("task exists");
            if stored.status() == TaskStatus::Missed {
                break stored;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("reconciler should flip the task");

    assert_eq!(missed.revision().value(), 0);
    worker.abort();
}
