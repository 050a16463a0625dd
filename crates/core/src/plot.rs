//! Plot threads and their append-only development history.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Ordered first in unresolved-thread listings.
    Major,
    #[default]
    Minor,
}

impl Importance {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

impl FromStr for Importance {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            other => Err(CoreError::InvalidImportance(other.to_owned())),
        }
    }
}

/// Lifecycle: `introduced -> developing -> resolved | abandoned`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    #[default]
    Introduced,
    Developing,
    Resolved,
    Abandoned,
}

impl ThreadStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Introduced => "introduced",
            Self::Developing => "developing",
            Self::Resolved => "resolved",
            Self::Abandoned => "abandoned",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(*self, Self::Resolved | Self::Abandoned)
    }

    /// Whether a thread in this status may be moved to `next`.
    ///
    /// Re-asserting the current status is always allowed. Nothing moves back
    /// to `introduced`, and terminal states never change.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match (*self, next) {
            (Self::Introduced, Self::Introduced)
            | (Self::Developing, Self::Developing)
            | (Self::Resolved, Self::Resolved)
            | (Self::Abandoned, Self::Abandoned) => true,
            (Self::Introduced, _) => true,
            (Self::Developing, next) => !matches!(next, Self::Introduced),
            (Self::Resolved | Self::Abandoned, _) => false,
        }
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "introduced" => Ok(Self::Introduced),
            "developing" => Ok(Self::Developing),
            "resolved" => Ok(Self::Resolved),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(CoreError::InvalidThreadStatus(other.to_owned())),
        }
    }
}

/// Payload for creating a plot thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotThreadInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub thread_type: Option<String>,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub status: ThreadStatus,
}

impl PlotThreadInput {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, importance: Importance) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            thread_type: None,
            importance,
            status: ThreadStatus::Introduced,
        }
    }
}

/// Stored plot thread row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotThread {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thread_type: Option<String>,
    pub importance: Importance,
    pub status: ThreadStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// One step in a thread's history, anchored to the scene where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotThreadDevelopment {
    pub id: i64,
    pub plot_thread_id: i64,
    pub scene_id: i64,
    pub chapter_number: u32,
    pub scene_number: u32,
    pub development_type: String,
    pub description: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use ThreadStatus::*;
        assert!(Introduced.can_transition_to(Developing));
        assert!(Introduced.can_transition_to(Resolved));
        assert!(Developing.can_transition_to(Abandoned));
        assert!(!Developing.can_transition_to(Introduced));
        assert!(!Resolved.can_transition_to(Developing));
        assert!(!Abandoned.can_transition_to(Resolved));
        assert!(Resolved.can_transition_to(Resolved));
    }

    #[test]
    fn test_importance_orders_major_first() {
        assert!(Importance::Major < Importance::Minor);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Resolved".parse::<ThreadStatus>(), Ok(ThreadStatus::Resolved));
        assert!("closed".parse::<ThreadStatus>().is_err());
    }
}
