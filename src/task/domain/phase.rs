//! Defense phase sequence and ordering rules.

use super::ParsePhaseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four sequential defense stages a task belongs to.
///
/// The phase determines the logical table a task lives in and is immutable
/// after creation. Phases form a fixed sequence; gate evaluation uses
/// [`Phase::prior`] to find the phase whose completion unlocks this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Title defense, the first stage. Has no prior phase.
    TitleDefense,
    /// Oral defense, unlocked by completing the title defense.
    OralDefense,
    /// Final defense, unlocked by completing the oral defense.
    FinalDefense,
    /// Final re-defense, unlocked by completing the final defense and an
    /// external Re-Oral verdict.
    FinalRedefense,
}

impl Phase {
    /// All phases in defense order.
    pub const SEQUENCE: [Self; 4] = [
        Self::TitleDefense,
        Self::OralDefense,
        Self::FinalDefense,
        Self::FinalRedefense,
    ];

    /// Returns the immediately preceding phase, or `None` for the first.
    #[must_use]
    pub const fn prior(self) -> Option<Self> {
        match self {
            Self::TitleDefense => None,
            Self::OralDefense => Some(Self::TitleDefense),
            Self::FinalDefense => Some(Self::OralDefense),
            Self::FinalRedefense => Some(Self::FinalDefense),
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleDefense => "title_defense",
            Self::OralDefense => "oral_defense",
            Self::FinalDefense => "final_defense",
            Self::FinalRedefense => "final_redefense",
        }
    }

    /// Returns the human-readable phase name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TitleDefense => "Title Defense",
            Self::OralDefense => "Oral Defense",
            Self::FinalDefense => "Final Defense",
            Self::FinalRedefense => "Final Re-Defense",
        }
    }
}

impl TryFrom<&str> for Phase {
    type Error = ParsePhaseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "title_defense" => Ok(Self::TitleDefense),
            "oral_defense" => Ok(Self::OralDefense),
            "final_defense" => Ok(Self::FinalDefense),
            "final_redefense" => Ok(Self::FinalRedefense),
            _ => Err(ParsePhaseError(value.to_owned())),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
