//! PostgreSQL implementation of SessionRepository.
//!
//! Persists Session aggregates to the `sessions` table. Status changes
//! go through a compare-and-set on `(status, version)` so concurrent
//! scheduler workers cannot overwrite each other.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    AcademyId, DomainError, ErrorCode, RoomName, SessionId, SessionKind, SessionStatus,
    Timestamp, UserId,
};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, academy_id, kind, teacher_id, participant_ids,
                scheduled_at, duration_minutes, status,
                meeting_room_name, meeting_link,
                started_at, ended_at, actual_duration_minutes,
                cancellation_reason, cancelled_by, cancelled_at, version
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17
            )
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.academy_id().as_uuid())
        .bind(session.kind().as_str())
        .bind(session.teacher_id().as_str())
        .bind(participant_ids_to_vec(session))
        .bind(session.scheduled_at().as_datetime())
        .bind(session.duration_minutes() as i32)
        .bind(session.status().as_str())
        .bind(session.meeting_room_name().map(|r| r.as_str()))
        .bind(session.meeting_link())
        .bind(session.started_at().map(|t| *t.as_datetime()))
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .bind(session.actual_duration_minutes().map(|m| m as i32))
        .bind(session.cancellation_reason())
        .bind(session.cancelled_by().map(|u| u.as_str()))
        .bind(session.cancelled_at().map(|t| *t.as_datetime()))
        .bind(session.version() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert session: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                status = $2,
                meeting_room_name = $3,
                meeting_link = $4,
                started_at = $5,
                ended_at = $6,
                actual_duration_minutes = $7,
                cancellation_reason = $8,
                cancelled_by = $9,
                cancelled_at = $10,
                version = $11
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.status().as_str())
        .bind(session.meeting_room_name().map(|r| r.as_str()))
        .bind(session.meeting_link())
        .bind(session.started_at().map(|t| *t.as_datetime()))
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .bind(session.actual_duration_minutes().map(|m| m as i32))
        .bind(session.cancellation_reason())
        .bind(session.cancelled_by().map(|u| u.as_str()))
        .bind(session.cancelled_at().map(|t| *t.as_datetime()))
        .bind(session.version() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update session: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn update_status(
        &self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, DomainError> {
        // The aggregate bumped its version when it mutated; the stored
        // row still carries the previous one.
        let previous_version = session.version().saturating_sub(1);

        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                status = $2,
                meeting_room_name = $3,
                meeting_link = $4,
                started_at = $5,
                ended_at = $6,
                actual_duration_minutes = $7,
                cancellation_reason = $8,
                cancelled_by = $9,
                cancelled_at = $10,
                version = $11
            WHERE id = $1 AND status = $12 AND version = $13
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.status().as_str())
        .bind(session.meeting_room_name().map(|r| r.as_str()))
        .bind(session.meeting_link())
        .bind(session.started_at().map(|t| *t.as_datetime()))
        .bind(session.ended_at().map(|t| *t.as_datetime()))
        .bind(session.actual_duration_minutes().map(|m| m as i32))
        .bind(session.cancellation_reason())
        .bind(session.cancelled_by().map(|u| u.as_str()))
        .bind(session.cancelled_at().map(|t| *t.as_datetime()))
        .bind(session.version() as i64)
        .bind(expected.as_str())
        .bind(previous_version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to transition session: {}", e),
            )
        })?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Distinguish a lost race from a missing row.
        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE id = $1")
            .bind(session.id().as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check session existence: {}", e),
                )
            })?;
        if exists.0 == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }
        Ok(false)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(SELECT_SESSION_WHERE_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to fetch session: {}", e),
                )
            })?;

        match row {
            Some(row) => Ok(Some(row_to_session(row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_room(&self, room: &RoomName) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE meeting_room_name = $1",
            SELECT_SESSION_BASE
        ))
        .bind(room.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch session by room: {}", e),
            )
        })?;

        match row {
            Some(row) => Ok(Some(row_to_session(row)?)),
            None => Ok(None),
        }
    }

    async fn find_non_terminal_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            {}
            WHERE status IN ('scheduled', 'ready', 'ongoing')
              AND scheduled_at >= $1
              AND scheduled_at <= $2
            ORDER BY scheduled_at
            "#,
            SELECT_SESSION_BASE
        ))
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch candidate sessions: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn find_live_with_rooms(&self) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            {}
            WHERE status IN ('ready', 'ongoing')
              AND meeting_room_name IS NOT NULL
            ORDER BY scheduled_at
            "#,
            SELECT_SESSION_BASE
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch live sessions: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_session).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

const SELECT_SESSION_BASE: &str = r#"
    SELECT id, academy_id, kind, teacher_id, participant_ids,
           scheduled_at, duration_minutes, status,
           meeting_room_name, meeting_link,
           started_at, ended_at, actual_duration_minutes,
           cancellation_reason, cancelled_by, cancelled_at, version
    FROM sessions
"#;

const SELECT_SESSION_WHERE_ID: &str = r#"
    SELECT id, academy_id, kind, teacher_id, participant_ids,
           scheduled_at, duration_minutes, status,
           meeting_room_name, meeting_link,
           started_at, ended_at, actual_duration_minutes,
           cancellation_reason, cancelled_by, cancelled_at, version
    FROM sessions
    WHERE id = $1
"#;

fn participant_ids_to_vec(session: &Session) -> Vec<String> {
    session
        .participant_ids()
        .iter()
        .map(|u| u.as_str().to_string())
        .collect()
}

fn db_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| db_error("Failed to get id", e))?;
    let academy_id: uuid::Uuid = row
        .try_get("academy_id")
        .map_err(|e| db_error("Failed to get academy_id", e))?;

    let kind_str: String = row
        .try_get("kind")
        .map_err(|e| db_error("Failed to get kind", e))?;
    let kind = SessionKind::parse(&kind_str)
        .ok_or_else(|| db_error("Invalid session kind", &kind_str))?;

    let teacher_id: String = row
        .try_get("teacher_id")
        .map_err(|e| db_error("Failed to get teacher_id", e))?;
    let teacher_id =
        UserId::new(teacher_id).map_err(|e| db_error("Invalid teacher_id", e))?;

    let participant_strs: Vec<String> = row
        .try_get("participant_ids")
        .map_err(|e| db_error("Failed to get participant_ids", e))?;
    let participant_ids: Vec<UserId> = participant_strs
        .into_iter()
        .map(|s| UserId::new(s).map_err(|e| db_error("Invalid participant id", e)))
        .collect::<Result<_, _>>()?;

    let scheduled_at: chrono::DateTime<chrono::Utc> = row
        .try_get("scheduled_at")
        .map_err(|e| db_error("Failed to get scheduled_at", e))?;
    let duration_minutes: i32 = row
        .try_get("duration_minutes")
        .map_err(|e| db_error("Failed to get duration_minutes", e))?;

    let status_str: String = row
        .try_get("status")
        .map_err(|e| db_error("Failed to get status", e))?;
    let status = SessionStatus::parse(&status_str)
        .ok_or_else(|| db_error("Invalid session status", &status_str))?;

    let meeting_room_name: Option<String> = row
        .try_get("meeting_room_name")
        .map_err(|e| db_error("Failed to get meeting_room_name", e))?;
    let meeting_room_name = meeting_room_name
        .map(|s| RoomName::new(s).map_err(|e| db_error("Invalid room name", e)))
        .transpose()?;

    let meeting_link: Option<String> = row
        .try_get("meeting_link")
        .map_err(|e| db_error("Failed to get meeting_link", e))?;

    let started_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("started_at")
        .map_err(|e| db_error("Failed to get started_at", e))?;
    let ended_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("ended_at")
        .map_err(|e| db_error("Failed to get ended_at", e))?;
    let actual_duration_minutes: Option<i32> = row
        .try_get("actual_duration_minutes")
        .map_err(|e| db_error("Failed to get actual_duration_minutes", e))?;

    let cancellation_reason: Option<String> = row
        .try_get("cancellation_reason")
        .map_err(|e| db_error("Failed to get cancellation_reason", e))?;
    let cancelled_by: Option<String> = row
        .try_get("cancelled_by")
        .map_err(|e| db_error("Failed to get cancelled_by", e))?;
    let cancelled_by = cancelled_by
        .map(|s| UserId::new(s).map_err(|e| db_error("Invalid cancelled_by", e)))
        .transpose()?;
    let cancelled_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("cancelled_at")
        .map_err(|e| db_error("Failed to get cancelled_at", e))?;

    let version: i64 = row
        .try_get("version")
        .map_err(|e| db_error("Failed to get version", e))?;

    Ok(Session::reconstitute(
        SessionId::from_uuid(id),
        AcademyId::from_uuid(academy_id),
        kind,
        teacher_id,
        participant_ids,
        Timestamp::from_datetime(scheduled_at),
        duration_minutes as u32,
        status,
        meeting_room_name,
        meeting_link,
        started_at.map(Timestamp::from_datetime),
        ended_at.map(Timestamp::from_datetime),
        actual_duration_minutes.map(|m| m as u32),
        cancellation_reason,
        cancelled_by,
        cancelled_at.map(Timestamp::from_datetime),
        version as u64,
    ))
}
