//! Settlement domain module.
//!
//! Earnings records produced when a session completes. At most one
//! record per `(session_kind, session_id)`; the ledger enforces the
//! uniqueness, the hook treats a duplicate as success.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, SessionKind, Timestamp, UserId};

/// Teacher earnings for one completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub session_kind: SessionKind,
    pub session_id: SessionId,
    pub teacher_id: UserId,
    pub amount_cents: u64,
    pub delivered_minutes: u32,
    pub settled_at: Timestamp,
}

impl SettlementRecord {
    /// Builds a record from a per-minute rate and delivered minutes.
    pub fn from_rate(
        session_kind: SessionKind,
        session_id: SessionId,
        teacher_id: UserId,
        rate_cents_per_minute: u32,
        delivered_minutes: u32,
        settled_at: Timestamp,
    ) -> Self {
        Self {
            session_kind,
            session_id,
            teacher_id,
            amount_cents: rate_cents_per_minute as u64 * delivered_minutes as u64,
            delivered_minutes,
            settled_at,
        }
    }
}

/// Outcome of recording a settlement against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// A new record was written.
    Created(SettlementRecord),
    /// A record for this `(session_kind, session_id)` already exists.
    AlreadySettled,
}

impl SettlementOutcome {
    /// Returns true if this call created the record.
    pub fn created(&self) -> bool {
        matches!(self, SettlementOutcome::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rate_multiplies_rate_by_minutes() {
        let record = SettlementRecord::from_rate(
            SessionKind::QuranIndividual,
            SessionId::new(),
            UserId::new("teacher-1").unwrap(),
            50,
            55,
            Timestamp::now(),
        );
        assert_eq!(record.amount_cents, 2750);
        assert_eq!(record.delivered_minutes, 55);
    }

    #[test]
    fn outcome_created_flag() {
        let record = SettlementRecord::from_rate(
            SessionKind::AcademicIndividual,
            SessionId::new(),
            UserId::new("teacher-1").unwrap(),
            10,
            60,
            Timestamp::now(),
        );
        assert!(SettlementOutcome::Created(record).created());
        assert!(!SettlementOutcome::AlreadySettled.created());
    }
}
