//! SettlementHook - earnings recording on session completion.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{SessionStatus, Timestamp};
use crate::domain::session::{Session, SessionError};
use crate::domain::settlement::{SettlementOutcome, SettlementRecord};
use crate::ports::SettlementLedger;

/// Computes and records teacher earnings for completed sessions.
pub struct SettlementHook {
    ledger: Arc<dyn SettlementLedger>,
}

impl SettlementHook {
    pub fn new(ledger: Arc<dyn SettlementLedger>) -> Self {
        Self { ledger }
    }

    /// Record earnings for a completed session.
    ///
    /// Amount is the teacher's per-minute rate times delivered minutes
    /// (planned duration when no actual duration was recorded). The
    /// ledger's `(session_kind, session_id)` uniqueness makes replays
    /// safe; a duplicate reports `AlreadySettled` and is not an error.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is Completed
    pub async fn calculate_session_earnings(
        &self,
        session: &Session,
        now: Timestamp,
    ) -> Result<SettlementOutcome, SessionError> {
        if session.status() != SessionStatus::Completed {
            return Err(SessionError::invalid_state(format!(
                "session {} is {}, earnings apply to completed sessions only",
                session.id(),
                session.status()
            )));
        }

        let rate = self
            .ledger
            .rate_cents_per_minute(session.teacher_id())
            .await?;
        let delivered = session
            .actual_duration_minutes()
            .unwrap_or(session.duration_minutes());

        let record = SettlementRecord::from_rate(
            session.kind(),
            *session.id(),
            session.teacher_id().clone(),
            rate,
            delivered,
            now,
        );

        let outcome = self.ledger.record(record).await?;
        if let SettlementOutcome::Created(ref created) = outcome {
            info!(
                session_id = %session.id(),
                teacher_id = %created.teacher_id,
                amount_cents = created.amount_cents,
                "session earnings recorded"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySettlementLedger;
    use crate::domain::foundation::{AcademyId, SessionId, SessionKind, UserId};

    fn completed_session(now: Timestamp) -> Session {
        let mut session = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            UserId::new("teacher-1").unwrap(),
            vec![UserId::new("student-1").unwrap()],
            now,
            60,
        )
        .unwrap();
        session.mark_ready(now).unwrap();
        session.begin(now).unwrap();
        session.complete(now.plus_minutes(50)).unwrap();
        session
    }

    #[tokio::test]
    async fn records_earnings_for_completed_session() {
        let ledger = Arc::new(InMemorySettlementLedger::with_rate(40));
        let hook = SettlementHook::new(ledger.clone());
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let session = completed_session(now);

        let outcome = hook
            .calculate_session_earnings(&session, now.plus_minutes(51))
            .await
            .unwrap();

        match outcome {
            SettlementOutcome::Created(record) => {
                assert_eq!(record.delivered_minutes, 50);
                assert_eq!(record.amount_cents, 50 * 40);
            }
            SettlementOutcome::AlreadySettled => panic!("expected a new record"),
        }
    }

    #[tokio::test]
    async fn second_call_reports_already_settled() {
        let ledger = Arc::new(InMemorySettlementLedger::with_rate(40));
        let hook = SettlementHook::new(ledger);
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let session = completed_session(now);

        hook.calculate_session_earnings(&session, now).await.unwrap();
        let second = hook.calculate_session_earnings(&session, now).await.unwrap();

        assert_eq!(second, SettlementOutcome::AlreadySettled);
    }

    #[tokio::test]
    async fn rejects_non_completed_session() {
        let ledger = Arc::new(InMemorySettlementLedger::with_rate(40));
        let hook = SettlementHook::new(ledger);
        let now = Timestamp::from_unix_secs(1_700_000_000);
        let session = Session::new(
            SessionId::new(),
            AcademyId::new(),
            SessionKind::QuranIndividual,
            UserId::new("teacher-1").unwrap(),
            vec![UserId::new("student-1").unwrap()],
            now,
            60,
        )
        .unwrap();

        let result = hook.calculate_session_earnings(&session, now).await;
        assert!(matches!(result, Err(SessionError::InvalidState(_))));
    }
}
