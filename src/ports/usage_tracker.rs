//! Subscription usage tracker port.
//!
//! Individual sessions consume a slot on the student's subscription.
//! Completed and Absent sessions both consume; Cancelled does not.

use async_trait::async_trait;

use crate::domain::foundation::{SessionId, SessionKind, UserId};

/// Errors from the usage tracker.
#[derive(Debug, thiserror::Error)]
pub enum UsageTrackerError {
    /// No active subscription covers this session.
    #[error("no active subscription for user {0}")]
    NoSubscription(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Port for subscription slot consumption.
#[async_trait]
pub trait SubscriptionUsageTracker: Send + Sync {
    /// Consume one subscription slot for a delivered (or forfeited)
    /// session. Idempotent per session: repeated calls for the same
    /// session consume at most one slot.
    async fn consume_slot(
        &self,
        student_id: &UserId,
        session_kind: SessionKind,
        session_id: &SessionId,
    ) -> Result<(), UsageTrackerError>;

    /// Remaining slots on the student's subscription.
    async fn remaining_slots(&self, student_id: &UserId) -> Result<u32, UsageTrackerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn usage_tracker_is_object_safe() {
        fn _accepts_dyn(_tracker: &dyn SubscriptionUsageTracker) {}
    }
}
