//! SessionStatus enum for the tutoring session lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a tutoring session.
///
/// The happy path runs Scheduled -> Ready -> Ongoing -> Completed.
/// Absent and Cancelled are the two alternative terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Ready,
    Ongoing,
    Completed,
    Absent,
    Cancelled,
}

impl SessionStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Absent | SessionStatus::Cancelled
        )
    }

    /// Returns true if the session may have a live meeting room.
    pub fn is_live(&self) -> bool {
        matches!(self, SessionStatus::Ready | SessionStatus::Ongoing)
    }

    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Scheduled -> Ready | Cancelled
    /// - Ready -> Ongoing | Absent | Cancelled
    /// - Ongoing -> Completed | Absent
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Scheduled, Ready)
                | (Scheduled, Cancelled)
                | (Ready, Ongoing)
                | (Ready, Absent)
                | (Ready, Cancelled)
                | (Ongoing, Completed)
                | (Ongoing, Absent)
        )
    }

    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Ready => "ready",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Completed => "completed",
            SessionStatus::Absent => "absent",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the persistence string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(SessionStatus::Scheduled),
            "ready" => Some(SessionStatus::Ready),
            "ongoing" => Some(SessionStatus::Ongoing),
            "completed" => Some(SessionStatus::Completed),
            "absent" => Some(SessionStatus::Absent),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
