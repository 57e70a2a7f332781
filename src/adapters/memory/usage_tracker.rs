//! In-memory subscription usage tracker.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{SessionId, SessionKind, UserId};
use crate::ports::{SubscriptionUsageTracker, UsageTrackerError};

const DEFAULT_SLOTS: u32 = 8;

#[derive(Default)]
struct State {
    consumed: HashSet<(UserId, SessionId)>,
    slots: HashMap<UserId, u32>,
}

/// In-memory implementation of [`SubscriptionUsageTracker`].
///
/// Every student starts with [`DEFAULT_SLOTS`] unless overridden.
#[derive(Default)]
pub struct InMemoryUsageTracker {
    state: Mutex<State>,
}

impl InMemoryUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a student's slot balance.
    pub fn set_slots(&self, student_id: UserId, slots: u32) {
        self.lock().slots.insert(student_id, slots);
    }

    /// Number of slots consumed against a session.
    pub fn consumed_for(&self, session_id: &SessionId) -> u32 {
        self.lock()
            .consumed
            .iter()
            .filter(|(_, sid)| sid == session_id)
            .count() as u32
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SubscriptionUsageTracker for InMemoryUsageTracker {
    async fn consume_slot(
        &self,
        student_id: &UserId,
        _session_kind: SessionKind,
        session_id: &SessionId,
    ) -> Result<(), UsageTrackerError> {
        let mut state = self.lock();
        let key = (student_id.clone(), *session_id);
        if state.consumed.contains(&key) {
            return Ok(());
        }
        let remaining = *state.slots.get(student_id).unwrap_or(&DEFAULT_SLOTS);
        if remaining == 0 {
            return Err(UsageTrackerError::NoSubscription(student_id.to_string()));
        }
        state.slots.insert(student_id.clone(), remaining - 1);
        state.consumed.insert(key);
        Ok(())
    }

    async fn remaining_slots(&self, student_id: &UserId) -> Result<u32, UsageTrackerError> {
        Ok(*self.lock().slots.get(student_id).unwrap_or(&DEFAULT_SLOTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consume_is_idempotent_per_session() {
        let tracker = InMemoryUsageTracker::new();
        let student = UserId::new("student-1").unwrap();
        let session_id = SessionId::new();

        tracker
            .consume_slot(&student, SessionKind::QuranIndividual, &session_id)
            .await
            .unwrap();
        tracker
            .consume_slot(&student, SessionKind::QuranIndividual, &session_id)
            .await
            .unwrap();

        assert_eq!(tracker.remaining_slots(&student).await.unwrap(), DEFAULT_SLOTS - 1);
        assert_eq!(tracker.consumed_for(&session_id), 1);
    }

    #[tokio::test]
    async fn exhausted_subscription_rejects_consumption() {
        let tracker = InMemoryUsageTracker::new();
        let student = UserId::new("student-1").unwrap();
        tracker.set_slots(student.clone(), 0);

        let result = tracker
            .consume_slot(&student, SessionKind::QuranIndividual, &SessionId::new())
            .await;
        assert!(matches!(result, Err(UsageTrackerError::NoSubscription(_))));
    }
}
