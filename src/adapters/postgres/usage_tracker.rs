//! PostgreSQL implementation of SubscriptionUsageTracker.
//!
//! `subscription_usage` carries a unique index on `(student_id,
//! session_id)`; the insert is the idempotency point, and the slot
//! decrement only runs when the insert landed.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{SessionId, SessionKind, UserId};
use crate::ports::{SubscriptionUsageTracker, UsageTrackerError};

/// PostgreSQL implementation of SubscriptionUsageTracker.
#[derive(Clone)]
pub struct PostgresUsageTracker {
    pool: PgPool,
}

impl PostgresUsageTracker {
    /// Creates a new PostgresUsageTracker.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionUsageTracker for PostgresUsageTracker {
    async fn consume_slot(
        &self,
        student_id: &UserId,
        session_kind: SessionKind,
        session_id: &SessionId,
    ) -> Result<(), UsageTrackerError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UsageTrackerError::Database(e.to_string()))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO subscription_usage (student_id, session_kind, session_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id, session_id) DO NOTHING
            "#,
        )
        .bind(student_id.as_str())
        .bind(session_kind.as_str())
        .bind(session_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| UsageTrackerError::Database(e.to_string()))?;

        if inserted.rows_affected() == 0 {
            // Already consumed for this session.
            return tx
                .commit()
                .await
                .map_err(|e| UsageTrackerError::Database(e.to_string()));
        }

        let decremented = sqlx::query(
            r#"
            UPDATE subscriptions
            SET remaining_slots = remaining_slots - 1
            WHERE student_id = $1 AND remaining_slots > 0
            "#,
        )
        .bind(student_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| UsageTrackerError::Database(e.to_string()))?;

        if decremented.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| UsageTrackerError::Database(e.to_string()))?;
            return Err(UsageTrackerError::NoSubscription(
                student_id.as_str().to_string(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| UsageTrackerError::Database(e.to_string()))
    }

    async fn remaining_slots(&self, student_id: &UserId) -> Result<u32, UsageTrackerError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT remaining_slots FROM subscriptions WHERE student_id = $1")
                .bind(student_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| UsageTrackerError::Database(e.to_string()))?;

        match row {
            Some((slots,)) => Ok(slots.max(0) as u32),
            None => Err(UsageTrackerError::NoSubscription(
                student_id.as_str().to_string(),
            )),
        }
    }
}
