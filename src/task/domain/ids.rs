//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a team as issued by the external roster system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Creates a validated team identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::BlankField("team id"));
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TeamId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a member account as issued by the external identity system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberUid(String);

impl MemberUid {
    /// Creates a validated member uid.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::BlankField("member uid"));
        }
        Ok(Self(raw))
    }

    /// Returns the uid as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MemberUid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MemberUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Denormalised team reference stored on each task.
///
/// Team lifecycle is owned by the external roster system; tasks only carry
/// the id and the display name captured at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    id: TeamId,
    name: String,
}

impl TeamRef {
    /// Creates a validated team reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankField`] when the team name is blank.
    pub fn new(id: TeamId, name: impl Into<String>) -> Result<Self, TaskDomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaskDomainError::BlankField("team name"));
        }
        Ok(Self { id, name })
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> &TeamId {
        &self.id
    }

    /// Returns the team display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
