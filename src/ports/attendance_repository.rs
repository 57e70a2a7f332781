//! Attendance repository port.
//!
//! Persists [`AttendanceRecord`] aggregates keyed by (session, user).
//! Webhook handling and finalization both read-modify-write whole
//! records; event-id dedup inside the record keeps replays harmless
//! even when two writers interleave.

use crate::domain::attendance::AttendanceRecord;
use crate::domain::foundation::{DomainError, SessionId, UserId};
use async_trait::async_trait;

/// Repository port for attendance record persistence.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Find the record for a (session, user) pair.
    ///
    /// Returns `None` if no events have been recorded yet.
    async fn find(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Option<AttendanceRecord>, DomainError>;

    /// Find the record for a pair, creating an empty one if absent.
    async fn find_or_create(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<AttendanceRecord, DomainError>;

    /// Insert or replace a record.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(&self, record: &AttendanceRecord) -> Result<(), DomainError>;

    /// All records for a session.
    async fn for_session(&self, session_id: &SessionId) -> Result<Vec<AttendanceRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn attendance_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AttendanceRepository) {}
    }
}
