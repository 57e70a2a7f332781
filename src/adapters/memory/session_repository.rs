//! In-memory session repository.
//!
//! Backs unit and integration tests. The status compare-and-set has the
//! same observable semantics as the Postgres adapter.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{
    DomainError, ErrorCode, RoomName, SessionId, SessionStatus, Timestamp,
};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// In-memory implementation of [`SessionRepository`].
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, Session>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        self.lock().insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let mut sessions = self.lock();
        if !sessions.contains_key(session.id()) {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, DomainError> {
        let mut sessions = self.lock();
        let Some(stored) = sessions.get(session.id()) else {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        };
        if stored.status() != expected {
            return Ok(false);
        }
        sessions.insert(*session.id(), session.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn find_by_room(&self, room: &RoomName) -> Result<Option<Session>, DomainError> {
        Ok(self
            .lock()
            .values()
            .find(|s| s.meeting_room_name() == Some(room))
            .cloned())
    }

    async fn find_non_terminal_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let mut matches: Vec<Session> = self
            .lock()
            .values()
            .filter(|s| {
                !s.status().is_terminal()
                    && !s.scheduled_at().is_before(&from)
                    && !s.scheduled_at().is_after(&to)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|s| *s.scheduled_at());
        Ok(matches)
    }

    async fn find_live_with_rooms(&self) -> Result<Vec<Session>, DomainError> {
        Ok(self
            .lock()
            .values()
            .filter(|s| s.status().is_live() && s.meeting_room_name().is_some())
            .cloned()
            .collect())
    }
}
