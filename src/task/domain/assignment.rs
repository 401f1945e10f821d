//! Task assignment: named members or the whole-team sentinel.

use super::{MemberUid, TaskDomainError};
use serde::{Deserialize, Serialize};

/// A single assigned member, denormalised with the display name captured at
/// assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    uid: MemberUid,
    name: String,
}

impl Assignee {
    /// Creates a validated assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when the display name is
    /// blank.
    pub fn new(uid: MemberUid, name: impl Into<String>) -> Result<Self, TaskDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaskDomainError::BlankField("assignee name"));
        }
        Ok(Self { uid, name })
    }

    /// Returns the member uid.
    #[must_use]
    pub const fn uid(&self) -> &MemberUid {
        &self.uid
    }

    /// Returns the member display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Who a task is assigned to.
///
/// Either the whole team (displayed as a single "Team" row) or a non-empty
/// ordered list of named members. The underlying task record is never fanned
/// out per member; expansion happens only in the read-side projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assignment {
    /// The whole-team sentinel.
    WholeTeam,
    /// Named individual members.
    Members {
        /// Ordered list of assigned members; never empty.
        assignees: Vec<Assignee>,
    },
}

impl Assignment {
    /// Creates a whole-team assignment.
    #[must_use]
    pub const fn whole_team() -> Self {
        Self::WholeTeam
    }

    /// Creates an assignment to named members.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoAssignees`] when the list is empty.
    pub fn members(assignees: Vec<Assignee>) -> Result<Self, TaskDomainError> {
        if assignees.is_empty() {
            return Err(TaskDomainError::NoAssignees);
        }
        Ok(Self::Members { assignees })
    }

    /// Returns true for the whole-team sentinel.
    #[must_use]
    pub const fn is_whole_team(&self) -> bool {
        matches!(self, Self::WholeTeam)
    }

    /// Returns the named assignees, empty for a whole-team assignment.
    #[must_use]
    pub fn assignees(&self) -> &[Assignee] {
        match self {
            Self::WholeTeam => &[],
            Self::Members { assignees } => assignees,
        }
    }

    /// Returns true when the uid appears among the named assignees.
    ///
    /// Whole-team assignments do not match: membership is resolved by the
    /// external roster, and the store filter mirrors a document-database
    /// array-membership predicate over the named list.
    #[must_use]
    pub fn includes(&self, uid: &MemberUid) -> bool {
        self.assignees().iter().any(|a| a.uid() == uid)
    }
}
