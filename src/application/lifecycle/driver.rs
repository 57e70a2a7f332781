//! StatusTransitionDriver - batch evaluation for the scheduler loop.
//!
//! Each pass the scheduler reads the candidate window and hands the
//! sessions here. The driver evaluates every automatic transition per
//! session with per-session error isolation: one bad row never stalls
//! the batch.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::lifecycle::SessionTransitionHandler;
use crate::domain::foundation::{SessionId, SessionStatus, Timestamp};
use crate::domain::session::{Session, SessionError};

/// One session the driver failed to process.
#[derive(Debug, Clone)]
pub struct TransitionFailure {
    pub session_id: SessionId,
    pub message: String,
}

/// Counts of what one driver pass did.
#[derive(Debug, Clone, Default)]
pub struct TransitionReport {
    pub scanned: u32,
    pub to_ready: u32,
    pub to_absent: u32,
    pub to_completed: u32,
    pub errors: Vec<TransitionFailure>,
}

impl TransitionReport {
    pub fn transitions(&self) -> u32 {
        self.to_ready + self.to_absent + self.to_completed
    }
}

/// Drives automatic transitions over a batch of sessions.
pub struct StatusTransitionDriver {
    handler: Arc<SessionTransitionHandler>,
}

impl StatusTransitionDriver {
    pub fn new(handler: Arc<SessionTransitionHandler>) -> Self {
        Self { handler }
    }

    /// Evaluate automatic transitions for every session in the batch.
    ///
    /// Per session, exactly one transition family applies given its
    /// status: Scheduled rows are tried for Ready, Ready rows for
    /// Absent, Ongoing rows for Absent then auto-completion. Errors are
    /// collected per session; the pass always finishes.
    pub async fn process(&self, sessions: Vec<Session>, now: Timestamp) -> TransitionReport {
        let mut report = TransitionReport {
            scanned: sessions.len() as u32,
            ..TransitionReport::default()
        };

        for session in &sessions {
            if let Err(e) = self.process_one(session, now, &mut report).await {
                warn!(
                    session_id = %session.id(),
                    status = %session.status(),
                    error = %e,
                    "transition pass failed for session"
                );
                report.errors.push(TransitionFailure {
                    session_id: *session.id(),
                    message: e.to_string(),
                });
            }
        }

        if report.transitions() > 0 || !report.errors.is_empty() {
            info!(
                scanned = report.scanned,
                to_ready = report.to_ready,
                to_absent = report.to_absent,
                to_completed = report.to_completed,
                failed = report.errors.len(),
                "transition pass finished"
            );
        }
        report
    }

    async fn process_one(
        &self,
        session: &Session,
        now: Timestamp,
        report: &mut TransitionReport,
    ) -> Result<(), SessionError> {
        match session.status() {
            SessionStatus::Scheduled => {
                if self.handler.to_ready(session, now).await?.transitioned() {
                    report.to_ready += 1;
                }
            }
            SessionStatus::Ready => {
                if self.handler.to_absent(session, now).await?.transitioned() {
                    report.to_absent += 1;
                }
            }
            SessionStatus::Ongoing => {
                // Absence first: an Ongoing session with zero attendance
                // evidence should never auto-complete into earnings.
                if self.handler.to_absent(session, now).await?.transitioned() {
                    report.to_absent += 1;
                } else if self.handler.to_completed(session, now).await?.transitioned() {
                    report.to_completed += 1;
                }
            }
            SessionStatus::Completed | SessionStatus::Absent | SessionStatus::Cancelled => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAttendanceRepository, InMemoryMeetingProvider, InMemoryNotificationDispatcher,
        InMemorySessionRepository, InMemorySettlementLedger, InMemoryUsageTracker,
    };
    use crate::application::meeting::MeetingOrchestrator;
    use crate::application::settlement::SettlementHook;
    use crate::domain::attendance::{JoinEvent, SessionWindow};
    use crate::domain::foundation::{
        AcademyId, EventId, ParticipantSid, RoomName, SessionKind, UserId,
    };
    use crate::domain::session::TimingPolicy;
    use crate::ports::{AttendanceRepository, SessionRepository};

    struct Fixture {
        driver: StatusTransitionDriver,
        sessions: Arc<InMemorySessionRepository>,
        attendance: Arc<InMemoryAttendanceRepository>,
        provider: Arc<InMemoryMeetingProvider>,
    }

    fn fixture() -> Fixture {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let attendance = Arc::new(InMemoryAttendanceRepository::new());
        let provider = Arc::new(InMemoryMeetingProvider::new());
        let meetings = Arc::new(MeetingOrchestrator::new(provider.clone(), sessions.clone()));
        let handler = Arc::new(SessionTransitionHandler::new(
            sessions.clone(),
            attendance.clone(),
            meetings,
            Arc::new(InMemoryUsageTracker::new()),
            Arc::new(SettlementHook::new(Arc::new(
                InMemorySettlementLedger::with_rate(40),
            ))),
            Arc::new(InMemoryNotificationDispatcher::new()),
            TimingPolicy::default(),
        ));

        Fixture {
            driver: StatusTransitionDriver::new(handler),
            sessions,
            attendance,
            provider,
        }
    }

    async fn scheduled_session(f: &Fixture, scheduled_at: Timestamp) -> Session {
        let session = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            UserId::new("teacher-1").unwrap(),
            vec![UserId::new("student-1").unwrap()],
            scheduled_at,
            60,
        )
        .unwrap();
        f.sessions.save(&session).await.unwrap();
        session
    }

    async fn candidates(f: &Fixture, now: Timestamp) -> Vec<Session> {
        f.sessions
            .find_non_terminal_between(now.minus_hours(24), now.plus_hours(24))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn pass_moves_due_sessions_to_ready() {
        let f = fixture();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        scheduled_session(&f, now.plus_minutes(10)).await;
        scheduled_session(&f, now.plus_hours(5)).await;

        let report = f.driver.process(candidates(&f, now).await, now).await;

        assert_eq!(report.scanned, 2);
        assert_eq!(report.to_ready, 1);
        assert_eq!(report.to_absent, 0);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn pass_marks_unattended_ready_sessions_absent() {
        let f = fixture();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = scheduled_session(&f, now.minus_minutes(11)).await;
        session.mark_ready(now.minus_minutes(20)).unwrap();
        f.sessions.update(&session).await.unwrap();

        let report = f.driver.process(candidates(&f, now).await, now).await;

        assert_eq!(report.to_absent, 1);
        let stored = f.sessions.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Absent);
    }

    #[tokio::test]
    async fn pass_auto_completes_overrun_attended_sessions() {
        let f = fixture();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let scheduled_at = now.minus_minutes(75);
        let mut session = scheduled_session(&f, scheduled_at).await;
        session.mark_ready(scheduled_at.minus_minutes(10)).unwrap();
        session.begin(scheduled_at).unwrap();
        f.sessions.update(&session).await.unwrap();

        let mut record = f
            .attendance
            .find_or_create(session.id(), &UserId::new("student-1").unwrap())
            .await
            .unwrap();
        record.record_join(
            &JoinEvent {
                event_id: EventId::new("join-1").unwrap(),
                participant_sid: ParticipantSid::new("PA_1").unwrap(),
                occurred_at: scheduled_at,
            },
            &SessionWindow::of(&session),
            &TimingPolicy::default(),
        );
        f.attendance.upsert(&record).await.unwrap();

        let report = f.driver.process(candidates(&f, now).await, now).await;

        assert_eq!(report.to_completed, 1);
        assert_eq!(report.to_absent, 0);
        let stored = f.sessions.find_by_id(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Completed);
    }

    #[tokio::test]
    async fn abandoned_ongoing_session_goes_absent_not_completed() {
        let f = fixture();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let scheduled_at = now.minus_minutes(75);
        let mut session = scheduled_session(&f, scheduled_at).await;
        session.mark_ready(scheduled_at.minus_minutes(10)).unwrap();
        session.begin(scheduled_at).unwrap();
        f.sessions.update(&session).await.unwrap();

        let report = f.driver.process(candidates(&f, now).await, now).await;

        assert_eq!(report.to_absent, 1);
        assert_eq!(report.to_completed, 0);
    }

    #[tokio::test]
    async fn one_failing_session_does_not_stall_the_batch() {
        let f = fixture();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let failing = scheduled_session(&f, now.plus_minutes(5)).await;
        let healthy = scheduled_session(&f, now.plus_minutes(5)).await;
        f.provider.fail_room(&RoomName::for_session(failing.id()));

        let report = f.driver.process(candidates(&f, now).await, now).await;

        assert_eq!(report.to_ready, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].session_id, *failing.id());

        let stored = f.sessions.find_by_id(healthy.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Ready);
    }

    #[tokio::test]
    async fn terminal_sessions_are_skipped() {
        let f = fixture();
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let mut session = scheduled_session(&f, now).await;
        session
            .cancel("moved".to_string(), UserId::new("teacher-1").unwrap(), now)
            .unwrap();
        f.sessions.update(&session).await.unwrap();

        let report = f.driver.process(vec![session], now).await;
        assert_eq!(report.transitions(), 0);
        assert!(report.errors.is_empty());
    }
}
