//! Shared fixtures and builders for engine tests.

#![expect(
    clippy::expect_used,
    reason = "Test fixtures fail loudly on invalid setup data"
)]

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;

use crate::task::domain::{
    Assignee, Assignment, DueSchedule, MemberUid, NewTaskData, Phase, Task, TaskDetails,
    TaskManager, TeamId, TeamRef,
};

/// Clock pinned to a fixed instant, for deterministic lifecycle tests.
#[derive(Debug, Clone, Copy)]
pub struct FrozenClock(pub DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub fn team_id(id: &str) -> TeamId {
    TeamId::new(id).expect("valid team id")
}

pub fn team(id: &str, name: &str) -> TeamRef {
    TeamRef::new(team_id(id), name).expect("valid team reference")
}

pub fn uid(value: &str) -> MemberUid {
    MemberUid::new(value).expect("valid member uid")
}

pub fn member(member_uid: &str, name: &str) -> Assignee {
    Assignee::new(uid(member_uid), name).expect("valid assignee")
}

pub fn new_task_data(phase: Phase, team_key: &str, schedule: DueSchedule) -> NewTaskData {
    NewTaskData {
        phase,
        team: team(team_key, "Team Aurora"),
        manager: TaskManager::ProjectManager,
        created_by: uid("mgr-1"),
        details: TaskDetails::new("Documentation", "Chapter 1 draft").expect("valid details"),
        assignment: Assignment::members(vec![member("stu-1", "Alice Reyes")])
            .expect("valid assignment"),
        schedule,
    }
}

/// Builds a `ToDo` task in the given phase, owned by `team_key`.
pub fn build_task(phase: Phase, team_key: &str, schedule: DueSchedule, clock: &impl Clock) -> Task {
    Task::new(new_task_data(phase, team_key, schedule), clock)
}
