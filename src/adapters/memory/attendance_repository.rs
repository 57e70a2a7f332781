//! In-memory attendance repository.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::attendance::AttendanceRecord;
use crate::domain::foundation::{DomainError, SessionId, UserId};
use crate::ports::AttendanceRepository;

/// In-memory implementation of [`AttendanceRepository`].
#[derive(Default)]
pub struct InMemoryAttendanceRepository {
    records: Mutex<HashMap<(SessionId, UserId), AttendanceRecord>>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<(SessionId, UserId), AttendanceRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn find(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Option<AttendanceRecord>, DomainError> {
        Ok(self
            .lock()
            .get(&(*session_id, user_id.clone()))
            .cloned())
    }

    async fn find_or_create(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<AttendanceRecord, DomainError> {
        Ok(self
            .lock()
            .get(&(*session_id, user_id.clone()))
            .cloned()
            .unwrap_or_else(|| AttendanceRecord::new(*session_id, user_id.clone())))
    }

    async fn upsert(&self, record: &AttendanceRecord) -> Result<(), DomainError> {
        self.lock().insert(
            (*record.session_id(), record.user_id().clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let mut records: Vec<AttendanceRecord> = self
            .lock()
            .values()
            .filter(|r| r.session_id() == session_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.user_id().cmp(b.user_id()));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_or_create_returns_empty_record_without_persisting() {
        let repo = InMemoryAttendanceRepository::new();
        let session_id = SessionId::new();
        let user_id = UserId::new("student-1").unwrap();

        let record = repo.find_or_create(&session_id, &user_id).await.unwrap();
        assert_eq!(record.join_count(), 0);

        // Not persisted until upserted.
        assert!(repo.find(&session_id, &user_id).await.unwrap().is_none());

        repo.upsert(&record).await.unwrap();
        assert!(repo.find(&session_id, &user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn for_session_scopes_by_session() {
        let repo = InMemoryAttendanceRepository::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();
        let user = UserId::new("student-1").unwrap();

        repo.upsert(&AttendanceRecord::new(session_a, user.clone()))
            .await
            .unwrap();
        repo.upsert(&AttendanceRecord::new(session_b, user))
            .await
            .unwrap();

        assert_eq!(repo.for_session(&session_a).await.unwrap().len(), 1);
    }
}
