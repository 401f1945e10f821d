//! Revision counter for deadline extensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal counting how many times a task's deadline was pushed after the
/// task reached a late-stage status.
///
/// Starts at zero ("No Revision") and never decreases. At the cap of ten the
/// deadline becomes immutable; callers must create a new task instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(u8);

impl Revision {
    /// Upper bound on deadline revisions per task.
    pub const CAP: Self = Self(10);

    /// Returns the initial "No Revision" counter.
    #[must_use]
    pub const fn initial() -> Self {
        Self(0)
    }

    /// Returns the counter value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns true when no further deadline edits are permitted.
    #[must_use]
    pub const fn is_capped(self) -> bool {
        self.0 >= Self::CAP.0
    }

    /// Returns the incremented counter, or `None` at the cap.
    #[must_use]
    pub const fn bump(self) -> Option<Self> {
        if self.is_capped() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("No Revision")
        } else {
            write!(f, "Revision {}", self.0)
        }
    }
}
