//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the session lifecycle domain.

mod attendance_status;
mod errors;
mod ids;
mod session_kind;
mod session_status;
mod timestamp;

pub use attendance_status::AttendanceStatus;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AcademyId, EventId, ParticipantSid, RoomName, SessionId, UserId};
pub use session_kind::SessionKind;
pub use session_status::SessionStatus;
pub use timestamp::Timestamp;
