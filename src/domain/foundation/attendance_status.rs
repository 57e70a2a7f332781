//! AttendanceStatus enum for finalized participant attendance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final attendance classification for one participant in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Attended enough of the session, joined on time.
    Present,
    /// Attended enough of the session, but joined late.
    Late,
    /// Attended some of the session, below the presence threshold.
    Partial,
    /// No counted participation at all.
    #[default]
    Absent,
}

impl AttendanceStatus {
    /// Returns true if the participant counts as having attended.
    pub fn counts_as_attended(&self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }

    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Partial => "partial",
            AttendanceStatus::Absent => "absent",
        }
    }

    /// Parses the persistence string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "late" => Some(AttendanceStatus::Late),
            "partial" => Some(AttendanceStatus::Partial),
            "absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
