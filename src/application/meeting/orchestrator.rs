//! MeetingOrchestrator - room provisioning and expiry sweeps.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{RoomName, SessionId};
use crate::domain::session::{meeting_expired, Session, SessionError, TransitionContext};
use crate::ports::{MeetingProvider, RoomInfo, RoomOptions, SessionRepository};

/// Default participant cap for course rooms.
const COURSE_ROOM_CAPACITY: u32 = 100;

/// Result of ensuring a session has a usable room.
#[derive(Debug, Clone)]
pub struct EnsuredRoom {
    pub room: RoomInfo,
    /// True if this call created (or re-created) the room.
    pub created: bool,
}

/// One failed room closure in an expiry sweep.
#[derive(Debug, Clone)]
pub struct SweepError {
    pub session_id: SessionId,
    pub message: String,
}

/// Result of an expired-meeting sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub ended: u32,
    pub failed: u32,
    pub errors: Vec<SweepError>,
}

/// Orchestrates meeting rooms for sessions against the provider.
pub struct MeetingOrchestrator {
    provider: Arc<dyn MeetingProvider>,
    sessions: Arc<dyn SessionRepository>,
}

impl MeetingOrchestrator {
    pub fn new(provider: Arc<dyn MeetingProvider>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { provider, sessions }
    }

    /// Ensure the session has a live meeting room.
    ///
    /// Idempotent: an attached room that still exists on the provider is
    /// reused. A room name with no provider-side room (expired, purged)
    /// is re-created under the same name. `force` closes and re-creates
    /// an existing room.
    ///
    /// Mutates the session (room attachment) but does not persist it;
    /// the caller owns the write.
    pub async fn ensure_meeting_available(
        &self,
        session: &mut Session,
        force: bool,
        ctx: &TransitionContext,
    ) -> Result<EnsuredRoom, SessionError> {
        if session.status().is_terminal() {
            return Err(SessionError::invalid_state(format!(
                "session {} is {}, no room needed",
                session.id(),
                session.status()
            )));
        }

        let options = self.room_options(session, ctx);

        let room_name = match session.meeting_room_name() {
            Some(name) => name.clone(),
            None => RoomName::for_session(session.id()),
        };

        let existed = self
            .provider
            .room_exists(&room_name)
            .await
            .map_err(|e| SessionError::provider(e.to_string()))?;

        if existed && force {
            self.provider
                .close_room(&room_name)
                .await
                .map_err(|e| SessionError::provider(e.to_string()))?;
        }

        let room = self
            .provider
            .create_room(&room_name, &options)
            .await
            .map_err(|e| SessionError::provider(e.to_string()))?;

        if session.meeting_room_name() != Some(&room_name) {
            session.attach_room(room_name.clone(), None)?;
        }

        let created = !existed || force;
        if created {
            info!(
                session_id = %session.id(),
                room = %room_name,
                "meeting room provisioned"
            );
        }

        Ok(EnsuredRoom { room, created })
    }

    /// Close the session's room if one is attached. Best-effort.
    ///
    /// Returns true if a room was actually closed.
    pub async fn close_session_room(&self, session: &Session) -> Result<bool, SessionError> {
        let Some(room) = session.meeting_room_name() else {
            return Ok(false);
        };
        self.provider
            .close_room(room)
            .await
            .map_err(|e| SessionError::provider(e.to_string()))
    }

    /// Issue a join token for a user in the session's room.
    pub fn join_token(
        &self,
        session: &Session,
        identity: &str,
        ttl_secs: u64,
    ) -> Result<String, SessionError> {
        let room = session
            .meeting_room_name()
            .ok_or_else(|| SessionError::invalid_state("session has no meeting room"))?;
        self.provider
            .issue_join_token(room, identity, ttl_secs)
            .map_err(|e| SessionError::provider(e.to_string()))
    }

    /// Sweep live rooms whose sessions ran past the expiry buffer and
    /// force-close them. Per-room failures are collected, never fatal.
    pub async fn terminate_expired_meetings(
        &self,
        ctx: &TransitionContext,
    ) -> Result<SweepReport, SessionError> {
        let candidates = self
            .sessions
            .find_live_with_rooms()
            .await
            .map_err(SessionError::from)?;

        let mut report = SweepReport::default();
        for session in candidates {
            if !meeting_expired(&session, ctx) {
                continue;
            }
            match self.close_session_room(&session).await {
                Ok(closed) => {
                    report.ended += 1;
                    if closed {
                        info!(session_id = %session.id(), "expired meeting room closed");
                    }
                }
                Err(e) => {
                    warn!(
                        session_id = %session.id(),
                        error = %e,
                        "failed to close expired meeting room"
                    );
                    report.failed += 1;
                    report.errors.push(SweepError {
                        session_id: *session.id(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    fn room_options(&self, session: &Session, ctx: &TransitionContext) -> RoomOptions {
        let buffer = ctx.policy.room_expiry_buffer_minutes;
        if session.is_individual() {
            RoomOptions::individual(session.duration_minutes(), buffer)
        } else {
            RoomOptions::course(session.duration_minutes(), buffer, COURSE_ROOM_CAPACITY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryMeetingProvider, InMemorySessionRepository};
    use crate::domain::foundation::{AcademyId, SessionKind, Timestamp, UserId};
    use crate::domain::session::TimingPolicy;

    fn test_session(scheduled_at: Timestamp) -> Session {
        Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            UserId::new("teacher-1").unwrap(),
            vec![UserId::new("student-1").unwrap()],
            scheduled_at,
            60,
        )
        .unwrap()
    }

    fn ctx_at(now: Timestamp) -> TransitionContext {
        TransitionContext::new(now, TimingPolicy::default())
    }

    fn orchestrator() -> (
        MeetingOrchestrator,
        Arc<InMemoryMeetingProvider>,
        Arc<InMemorySessionRepository>,
    ) {
        let provider = Arc::new(InMemoryMeetingProvider::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let orch = MeetingOrchestrator::new(provider.clone(), sessions.clone());
        (orch, provider, sessions)
    }

    #[tokio::test]
    async fn ensure_creates_room_and_attaches_name() {
        let (orch, provider, _) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = test_session(now);

        let ensured = orch
            .ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await
            .unwrap();

        assert!(ensured.created);
        let room = session.meeting_room_name().unwrap();
        assert!(provider.room_exists(room).await.unwrap());
    }

    #[tokio::test]
    async fn ensure_is_idempotent_for_existing_room() {
        let (orch, _, _) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = test_session(now);

        orch.ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await
            .unwrap();
        let second = orch
            .ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await
            .unwrap();

        assert!(!second.created);
    }

    #[tokio::test]
    async fn ensure_recreates_room_lost_on_provider_side() {
        let (orch, provider, _) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = test_session(now);

        orch.ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await
            .unwrap();
        let room = session.meeting_room_name().unwrap().clone();
        provider.close_room(&room).await.unwrap();

        let ensured = orch
            .ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await
            .unwrap();
        assert!(ensured.created);
        assert!(provider.room_exists(&room).await.unwrap());
    }

    #[tokio::test]
    async fn ensure_fails_for_terminal_session() {
        let (orch, _, _) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = test_session(now);
        session
            .cancel("no need".to_string(), UserId::new("teacher-1").unwrap(), now)
            .unwrap();

        let result = orch
            .ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ensure_surfaces_provider_failure() {
        let (orch, provider, _) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = test_session(now);
        provider.fail_room(&RoomName::for_session(session.id()));

        let result = orch
            .ensure_meeting_available(&mut session, false, &ctx_at(now))
            .await;
        assert!(matches!(result, Err(SessionError::Provider(_))));
        assert!(session.meeting_room_name().is_none());
    }

    #[tokio::test]
    async fn sweep_closes_only_expired_rooms() {
        let (orch, provider, sessions) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);

        // Expired: scheduled 2h ago, 60 min + 30 min buffer long past.
        let mut expired = test_session(now.minus_hours(2));
        expired.mark_ready(now.minus_hours(2)).unwrap();
        orch.ensure_meeting_available(&mut expired, false, &ctx_at(now))
            .await
            .unwrap();
        sessions.save(&expired).await.unwrap();

        // Fresh: scheduled now.
        let mut fresh = test_session(now);
        fresh.mark_ready(now).unwrap();
        orch.ensure_meeting_available(&mut fresh, false, &ctx_at(now))
            .await
            .unwrap();
        sessions.save(&fresh).await.unwrap();

        let report = orch.terminate_expired_meetings(&ctx_at(now)).await.unwrap();

        assert_eq!(report.ended, 1);
        assert_eq!(report.failed, 0);
        assert!(!provider
            .room_exists(expired.meeting_room_name().unwrap())
            .await
            .unwrap());
        assert!(provider
            .room_exists(fresh.meeting_room_name().unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn sweep_collects_per_room_failures() {
        let (orch, provider, sessions) = orchestrator();
        let now = Timestamp::from_unix_secs(1_700_000_000);

        let mut expired = test_session(now.minus_hours(2));
        expired.mark_ready(now.minus_hours(2)).unwrap();
        orch.ensure_meeting_available(&mut expired, false, &ctx_at(now))
            .await
            .unwrap();
        sessions.save(&expired).await.unwrap();

        provider.fail_room(expired.meeting_room_name().unwrap());

        let report = orch.terminate_expired_meetings(&ctx_at(now)).await.unwrap();
        assert_eq!(report.ended, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].session_id, *expired.id());
    }
}
