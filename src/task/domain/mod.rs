//! Domain model for capstone task lifecycle management.
//!
//! The task domain models defense-phase task records, their status and
//! revision rules, deadline schedules, and team assignment while keeping all
//! infrastructure concerns outside of the domain boundary.

mod assignment;
mod details;
mod error;
mod ids;
mod phase;
mod revision;
mod schedule;
mod status;
mod task;

pub use assignment::{Assignee, Assignment};
pub use details::{DescriptivePatch, TaskDetails};
pub use error::{ParsePhaseError, ParseTaskStatusError, TaskDomainError};
pub use ids::{MemberUid, TaskId, TeamId, TeamRef};
pub use phase::Phase;
pub use revision::Revision;
pub use schedule::DueSchedule;
pub use status::TaskStatus;
pub use task::{AttachmentRef, NewTaskData, RescheduleOutcome, Task, TaskManager};
