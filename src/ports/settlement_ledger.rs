//! Settlement ledger port.
//!
//! Stores teacher earnings records with a uniqueness guarantee on
//! `(session_kind, session_id)`. Recording is the idempotency point:
//! however many times a completion replays, at most one record lands.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, SessionKind, UserId};
use crate::domain::settlement::{SettlementOutcome, SettlementRecord};

/// Port for the earnings ledger.
#[async_trait]
pub trait SettlementLedger: Send + Sync {
    /// Record a settlement, honoring the `(session_kind, session_id)`
    /// uniqueness. An existing record wins; the call reports
    /// `AlreadySettled` instead of failing.
    async fn record(&self, record: SettlementRecord) -> Result<SettlementOutcome, DomainError>;

    /// Find the settlement for a session, if any.
    async fn find(
        &self,
        session_kind: SessionKind,
        session_id: &SessionId,
    ) -> Result<Option<SettlementRecord>, DomainError>;

    /// The teacher's flat rate in cents per delivered session-minute.
    async fn rate_cents_per_minute(&self, teacher_id: &UserId) -> Result<u32, DomainError>;
}
