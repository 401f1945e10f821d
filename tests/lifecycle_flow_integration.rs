//! Behavioural integration tests for the task lifecycle engine.
//!
//! These tests drive the engine, gate evaluator, and deadline reconciler
//! together over the in-memory store, exercising the full capstone task
//! flow a coordinator would run across one grading period.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::cognitive_complexity,
    reason = "Test functions may have higher complexity for full scenario coverage"
)]
#![expect(
    clippy::shadow_unrelated,
    reason = "Test code reuses variable names for clarity in sequential assertions"
)]

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use phasegate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        Assignee, MemberUid, Phase, RescheduleOutcome, TaskManager, TaskStatus, TeamId, TeamRef,
    },
    ports::{TaskFilter, TaskStore},
    services::{
        CreateTaskRequest, DeadlineReconciler, LifecycleEngine, LifecycleError, WHOLE_TEAM_LABEL,
        assignment_rows,
    },
};
use tokio::runtime::Runtime;

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
struct FrozenClock(DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Creates a tokio runtime for async operations in tests.
fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn team() -> TeamRef {
    TeamRef::new(
        TeamId::new("team-aurora").expect("valid team id"),
        "Team Aurora",
    )
    .expect("valid team reference")
}

fn manager_uid() -> MemberUid {
    MemberUid::new("mgr-1").expect("valid member uid")
}

fn student(uid: &str, name: &str) -> Assignee {
    Assignee::new(MemberUid::new(uid).expect("valid member uid"), name).expect("valid assignee")
}

fn engine_at(
    now: DateTime<Utc>,
) -> (
    Arc<InMemoryTaskStore>,
    LifecycleEngine<InMemoryTaskStore, FrozenClock>,
) {
    let store = Arc::new(InMemoryTaskStore::new());
    let engine = LifecycleEngine::new(Arc::clone(&store), Arc::new(FrozenClock(now)));
    (store, engine)
}

fn title_request(title: &str) -> CreateTaskRequest {
    CreateTaskRequest::new(
        Phase::TitleDefense,
        team(),
        TaskManager::ProjectManager,
        manager_uid(),
        "Documentation",
        title,
    )
    .assigned_to([student("stu-1", "Alice Reyes")])
    .with_due_date(date(2025, 1, 10))
    .with_due_time(time(9, 0))
}

/// Walks one team from title defense into oral defense: the oral gate stays
/// closed until every title-defense task is completed and past its deadline.
#[test]
fn phase_progression_through_the_gate() {
    let rt = test_runtime();
    let (_store, engine) = engine_at(at(2025, 1, 5, 8, 0));

    let chapter = rt
        .block_on(engine.create_task(title_request("Chapter 1 draft")))
        .expect("create chapter task");
    let slides = rt
        .block_on(engine.create_task(title_request("Defense slides")))
        .expect("create slides task");
    assert_eq!(chapter.status(), TaskStatus::ToDo);
    assert_eq!(chapter.revision().value(), 0);

    // with both title tasks open, oral defense creation is rejected
    let oral_request = CreateTaskRequest::new(
        Phase::OralDefense,
        team(),
        TaskManager::ProjectManager,
        manager_uid(),
        "Documentation",
        "Chapter 2 draft",
    )
    .assigned_to([student("stu-1", "Alice Reyes")])
    .with_due_date(date(2025, 2, 10))
    .with_due_time(time(9, 0));

    let blocked = rt.block_on(engine.create_task(oral_request.clone()));
    match blocked {
        Err(LifecycleError::GateClosed {
            completed, total, ..
        }) => {
            assert_eq!((completed, total), (0, 2));
        }
        other => panic!("expected a closed gate, got {other:?}"),
    }

    // completing both tasks is not enough while the deadline lies ahead
    rt.block_on(engine.set_status(chapter.id(), TaskStatus::Completed))
        .expect("complete chapter");
    rt.block_on(engine.set_status(slides.id(), TaskStatus::Completed))
        .expect("complete slides");
    let still_blocked = rt.block_on(engine.create_task(oral_request.clone()));
    assert!(matches!(
        still_blocked,
        Err(LifecycleError::GateClosed { .. })
    ));

    // a later clock, past the 2025-01-10 09:00 deadline, opens the gate
    let (store, engine) = engine_at(at(2025, 1, 20, 8, 0));
    let chapter = rt
        .block_on(engine.create_task(title_request("Chapter 1 draft")))
        .expect("create chapter task");
    rt.block_on(engine.set_status(chapter.id(), TaskStatus::Completed))
        .expect("complete chapter");

    let oral = rt
        .block_on(engine.create_task(oral_request))
        .expect("create oral task");
    assert_eq!(oral.phase(), Phase::OralDefense);

    let stored = rt
        .block_on(store.query(&TaskFilter::for_phase(Phase::OralDefense)))
        .expect("query oral tasks");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), oral.id());
}

/// An overdue task is flipped to `Missed` by the reconciler sweep and comes
/// back as `ToDo` at the next revision once the deadline is extended.
#[test]
fn missed_task_recovers_through_a_deadline_extension() {
    let rt = test_runtime();
    let (store, engine) = engine_at(at(2025, 1, 5, 8, 0));

    let task = rt
        .block_on(engine.create_task(title_request("Chapter 1 draft")))
        .expect("create task");

    // the reconciler's clock sits past the due instant
    let reconciler = DeadlineReconciler::new(
        Arc::clone(&store),
        Arc::new(FrozenClock(at(2025, 1, 10, 9, 30))),
    );
    let snapshot = rt
        .block_on(store.query(&TaskFilter::for_phase(Phase::TitleDefense)))
        .expect("query snapshot");
    let flipped = rt.block_on(reconciler.sweep(&snapshot)).expect("sweep");
    assert_eq!(flipped, 1);

    let missed = rt
        .block_on(store.find_by_id(task.id()))
        .expect("find task")
        .expect("task exists");
    assert_eq!(missed.status(), TaskStatus::Missed);
    assert_eq!(missed.revision().value(), 0);

    // the engine refuses to set Missed by hand
    let manual = rt.block_on(engine.set_status(task.id(), TaskStatus::Missed));
    assert!(matches!(manual, Err(LifecycleError::Domain(_))));

    // extending the deadline reopens the task at revision one
    let (updated, outcome) = rt
        .block_on(engine.edit_due_date_time(task.id(), Some(date(2025, 2, 1)), Some(time(9, 0))))
        .expect("extend deadline");
    assert_eq!(outcome, RescheduleOutcome::MovedWithRevision);
    assert_eq!(updated.status(), TaskStatus::ToDo);
    assert_eq!(updated.revision().value(), 1);

    // a second sweep against the fresh snapshot leaves it alone
    let snapshot = rt
        .block_on(store.query(&TaskFilter::for_phase(Phase::TitleDefense)))
        .expect("query snapshot");
    let flipped = rt.block_on(reconciler.sweep(&snapshot)).expect("sweep");
    assert_eq!(flipped, 0);
}

/// A multi-member assignment stays one stored record however many rows the
/// read-side projection fans out, and a whole-team assignment shows the
/// single team row.
#[test]
fn projection_rows_share_the_underlying_record() {
    let rt = test_runtime();
    let (store, engine) = engine_at(at(2025, 1, 5, 8, 0));

    let group_task = rt
        .block_on(
            engine.create_task(title_request("Methodology review").assigned_to([
                student("stu-1", "Alice Reyes"),
                student("stu-2", "Ben Cruz"),
                student("stu-3", "Carla Santos"),
            ])),
        )
        .expect("create group task");
    let team_task = rt
        .block_on(engine.create_task(title_request("Title proposal").for_whole_team()))
        .expect("create whole-team task");

    let rows = assignment_rows(&group_task);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.task_id == group_task.id()));

    let team_rows = assignment_rows(&team_task);
    assert_eq!(team_rows.len(), 1);
    assert_eq!(team_rows[0].member_name, WHOLE_TEAM_LABEL);

    // a status change through any row's id lands on the one record
    rt.block_on(engine.set_status(group_task.id(), TaskStatus::InProgress))
        .expect("status change");
    let stored = rt
        .block_on(store.find_by_id(group_task.id()))
        .expect("find task")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::InProgress);
    assert!(
        assignment_rows(&stored)
            .iter()
            .all(|row| row.status == TaskStatus::InProgress)
    );

    // two records total, regardless of row fan-out
    let all = rt
        .block_on(store.query(&TaskFilter::for_phase(Phase::TitleDefense)))
        .expect("query tasks");
    assert_eq!(all.len(), 2);
}
