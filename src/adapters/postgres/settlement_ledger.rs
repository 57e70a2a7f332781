//! PostgreSQL implementation of SettlementLedger.
//!
//! `settlements` carries a unique index on `(session_kind, session_id)`;
//! `ON CONFLICT DO NOTHING` turns replayed completions into the
//! `AlreadySettled` outcome instead of duplicate earnings.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, SessionId, SessionKind, Timestamp, UserId,
};
use crate::domain::settlement::{SettlementOutcome, SettlementRecord};
use crate::ports::SettlementLedger;

/// PostgreSQL implementation of SettlementLedger.
#[derive(Clone)]
pub struct PostgresSettlementLedger {
    pool: PgPool,
}

impl PostgresSettlementLedger {
    /// Creates a new PostgresSettlementLedger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettlementLedger for PostgresSettlementLedger {
    async fn record(&self, record: SettlementRecord) -> Result<SettlementOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO settlements (
                session_kind, session_id, teacher_id, amount_cents,
                delivered_minutes, settled_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_kind, session_id) DO NOTHING
            "#,
        )
        .bind(record.session_kind.as_str())
        .bind(record.session_id.as_uuid())
        .bind(record.teacher_id.as_str())
        .bind(record.amount_cents as i64)
        .bind(record.delivered_minutes as i32)
        .bind(record.settled_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert settlement: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(SettlementOutcome::AlreadySettled);
        }
        Ok(SettlementOutcome::Created(record))
    }

    async fn find(
        &self,
        session_kind: SessionKind,
        session_id: &SessionId,
    ) -> Result<Option<SettlementRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT session_kind, session_id, teacher_id, amount_cents,
                   delivered_minutes, settled_at
            FROM settlements
            WHERE session_kind = $1 AND session_id = $2
            "#,
        )
        .bind(session_kind.as_str())
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch settlement: {}", e),
            )
        })?;

        match row {
            Some(row) => Ok(Some(row_to_settlement(row)?)),
            None => Ok(None),
        }
    }

    async fn rate_cents_per_minute(&self, teacher_id: &UserId) -> Result<u32, DomainError> {
        let row: (i32,) =
            sqlx::query_as("SELECT rate_cents_per_minute FROM teacher_rates WHERE teacher_id = $1")
                .bind(teacher_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to fetch teacher rate: {}", e),
                    )
                })?;
        Ok(row.0 as u32)
    }
}

fn db_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn row_to_settlement(row: sqlx::postgres::PgRow) -> Result<SettlementRecord, DomainError> {
    let kind_str: String = row
        .try_get("session_kind")
        .map_err(|e| db_error("Failed to get session_kind", e))?;
    let session_kind = SessionKind::parse(&kind_str)
        .ok_or_else(|| db_error("Invalid session kind", &kind_str))?;

    let session_id: uuid::Uuid = row
        .try_get("session_id")
        .map_err(|e| db_error("Failed to get session_id", e))?;

    let teacher_id: String = row
        .try_get("teacher_id")
        .map_err(|e| db_error("Failed to get teacher_id", e))?;
    let teacher_id = UserId::new(teacher_id).map_err(|e| db_error("Invalid teacher_id", e))?;

    let amount_cents: i64 = row
        .try_get("amount_cents")
        .map_err(|e| db_error("Failed to get amount_cents", e))?;
    let delivered_minutes: i32 = row
        .try_get("delivered_minutes")
        .map_err(|e| db_error("Failed to get delivered_minutes", e))?;
    let settled_at: chrono::DateTime<chrono::Utc> = row
        .try_get("settled_at")
        .map_err(|e| db_error("Failed to get settled_at", e))?;

    Ok(SettlementRecord {
        session_kind,
        session_id: SessionId::from_uuid(session_id),
        teacher_id,
        amount_cents: amount_cents as u64,
        delivered_minutes: delivered_minutes as u32,
        settled_at: Timestamp::from_datetime(settled_at),
    })
}
