//! PostgreSQL implementation of AttendanceRepository.
//!
//! One row per (session, user). The full record, join cycles and seen
//! event ids included, is stored as JSONB; status, percentage, and the
//! calculated flag are projected into columns for reporting queries.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::attendance::AttendanceRecord;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, UserId};
use crate::ports::AttendanceRepository;

/// PostgreSQL implementation of AttendanceRepository.
#[derive(Clone)]
pub struct PostgresAttendanceRepository {
    pool: PgPool,
}

impl PostgresAttendanceRepository {
    /// Creates a new PostgresAttendanceRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepository {
    async fn find(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Option<AttendanceRecord>, DomainError> {
        let row = sqlx::query(
            "SELECT record FROM attendance_records WHERE session_id = $1 AND user_id = $2",
        )
        .bind(session_id.as_uuid())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch attendance record: {}", e),
            )
        })?;

        match row {
            Some(row) => Ok(Some(row_to_record(row)?)),
            None => Ok(None),
        }
    }

    async fn find_or_create(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<AttendanceRecord, DomainError> {
        match self.find(session_id, user_id).await? {
            Some(record) => Ok(record),
            None => Ok(AttendanceRecord::new(*session_id, user_id.clone())),
        }
    }

    async fn upsert(&self, record: &AttendanceRecord) -> Result<(), DomainError> {
        let payload = serde_json::to_value(record).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize attendance record: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO attendance_records (
                session_id, user_id, record, status, attendance_percent,
                duration_seconds, calculated
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (session_id, user_id) DO UPDATE SET
                record = EXCLUDED.record,
                status = EXCLUDED.status,
                attendance_percent = EXCLUDED.attendance_percent,
                duration_seconds = EXCLUDED.duration_seconds,
                calculated = EXCLUDED.calculated
            "#,
        )
        .bind(record.session_id().as_uuid())
        .bind(record.user_id().as_str())
        .bind(payload)
        .bind(record.status().as_str())
        .bind(record.attendance_percent())
        .bind(record.duration_seconds() as i64)
        .bind(record.is_calculated())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to upsert attendance record: {}", e),
            )
        })?;

        Ok(())
    }

    async fn for_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let rows = sqlx::query(
            "SELECT record FROM attendance_records WHERE session_id = $1 ORDER BY user_id",
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch session attendance: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<AttendanceRecord, DomainError> {
    let payload: serde_json::Value = row.try_get("record").map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get record: {}", e),
        )
    })?;
    serde_json::from_value(payload).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Failed to deserialize attendance record: {}", e),
        )
    })
}
