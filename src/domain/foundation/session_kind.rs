//! SessionKind enum for the three tutoring session types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of tutoring session.
///
/// All kinds share the same lifecycle; absence marking applies only to
/// the individual kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    QuranIndividual,
    AcademicIndividual,
    InteractiveCourse,
}

impl SessionKind {
    /// Returns true for one-on-one session kinds.
    pub fn is_individual(&self) -> bool {
        matches!(
            self,
            SessionKind::QuranIndividual | SessionKind::AcademicIndividual
        )
    }

    /// Stable string form used for persistence and settlement keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::QuranIndividual => "quran_individual",
            SessionKind::AcademicIndividual => "academic_individual",
            SessionKind::InteractiveCourse => "interactive_course",
        }
    }

    /// Parses the persistence string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quran_individual" => Some(SessionKind::QuranIndividual),
            "academic_individual" => Some(SessionKind::AcademicIndividual),
            "interactive_course" => Some(SessionKind::InteractiveCourse),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
