//! In-memory settlement ledger.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, SessionKind, UserId};
use crate::domain::settlement::{SettlementOutcome, SettlementRecord};
use crate::ports::SettlementLedger;

/// In-memory implementation of [`SettlementLedger`] with one flat rate
/// for every teacher.
pub struct InMemorySettlementLedger {
    rate_cents_per_minute: u32,
    records: Mutex<HashMap<(SessionKind, SessionId), SettlementRecord>>,
}

impl InMemorySettlementLedger {
    pub fn with_rate(rate_cents_per_minute: u32) -> Self {
        Self {
            rate_cents_per_minute,
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<(SessionKind, SessionId), SettlementRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SettlementLedger for InMemorySettlementLedger {
    async fn record(&self, record: SettlementRecord) -> Result<SettlementOutcome, DomainError> {
        let mut records = self.lock();
        let key = (record.session_kind, record.session_id);
        if records.contains_key(&key) {
            return Ok(SettlementOutcome::AlreadySettled);
        }
        records.insert(key, record.clone());
        Ok(SettlementOutcome::Created(record))
    }

    async fn find(
        &self,
        session_kind: SessionKind,
        session_id: &SessionId,
    ) -> Result<Option<SettlementRecord>, DomainError> {
        Ok(self.lock().get(&(session_kind, *session_id)).cloned())
    }

    async fn rate_cents_per_minute(&self, _teacher_id: &UserId) -> Result<u32, DomainError> {
        Ok(self.rate_cents_per_minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    #[tokio::test]
    async fn duplicate_record_reports_already_settled() {
        let ledger = InMemorySettlementLedger::with_rate(40);
        let session_id = SessionId::new();
        let record = SettlementRecord::from_rate(
            SessionKind::QuranIndividual,
            session_id,
            UserId::new("teacher-1").unwrap(),
            40,
            60,
            Timestamp::from_unix_secs(1_700_000_000),
        );

        let first = ledger.record(record.clone()).await.unwrap();
        assert!(first.created());

        let second = ledger.record(record).await.unwrap();
        assert_eq!(second, SettlementOutcome::AlreadySettled);

        assert!(ledger
            .find(SessionKind::QuranIndividual, &session_id)
            .await
            .unwrap()
            .is_some());
    }
}
