//! AttendanceReconciler - webhook entry points and finalization.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::lifecycle::SessionTransitionHandler;
use crate::domain::attendance::{
    JoinEvent, JoinOutcome, LeaveEvent, LeaveOutcome, SessionWindow,
};
use crate::domain::foundation::{AttendanceStatus, SessionId, SessionStatus, Timestamp, UserId};
use crate::domain::session::{Session, SessionError, TimingPolicy};
use crate::ports::AttendanceRepository;

/// Finalized attendance for one participant, as reported to callers.
#[derive(Debug, Clone)]
pub struct AttendanceSummary {
    pub user_id: UserId,
    pub status: AttendanceStatus,
    pub attendance_percent: f64,
    pub duration_seconds: u64,
}

/// One participant whose finalization failed.
#[derive(Debug, Clone)]
pub struct FinalizeError {
    pub user_id: UserId,
    pub message: String,
}

/// Result of finalizing (or recalculating) a session's attendance.
#[derive(Debug, Clone)]
pub struct FinalizeReport {
    pub session_id: SessionId,
    pub calculated: u32,
    pub errors: Vec<FinalizeError>,
    pub attendances: Vec<AttendanceSummary>,
}

/// Finalize every attendance record of a session.
///
/// Ensures each expected participant has a record (students who never
/// produced a webhook event finalize as Absent), then runs per-record
/// finalization with per-participant error isolation.
pub(crate) async fn finalize_attendance(
    attendance: &dyn AttendanceRepository,
    session: &Session,
    policy: &TimingPolicy,
    force: bool,
) -> Result<FinalizeReport, SessionError> {
    let window = SessionWindow::of(session);
    let mut records = attendance.for_session(session.id()).await?;

    for user_id in session.participant_ids() {
        if !records.iter().any(|r| r.user_id() == user_id) {
            records.push(attendance.find_or_create(session.id(), user_id).await?);
        }
    }

    let mut report = FinalizeReport {
        session_id: *session.id(),
        calculated: 0,
        errors: Vec::new(),
        attendances: Vec::new(),
    };

    for mut record in records {
        if record.finalize(&window, policy, force) {
            match attendance.upsert(&record).await {
                Ok(()) => report.calculated += 1,
                Err(e) => {
                    warn!(
                        session_id = %session.id(),
                        user_id = %record.user_id(),
                        error = %e,
                        "failed to persist finalized attendance"
                    );
                    report.errors.push(FinalizeError {
                        user_id: record.user_id().clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            }
        }
        report.attendances.push(AttendanceSummary {
            user_id: record.user_id().clone(),
            status: record.status(),
            attendance_percent: record.attendance_percent(),
            duration_seconds: record.duration_seconds(),
        });
    }

    Ok(report)
}

/// Reconciles provider webhook events into attendance records and
/// produces final attendance when sessions end.
pub struct AttendanceReconciler {
    attendance: Arc<dyn AttendanceRepository>,
    transitions: Arc<SessionTransitionHandler>,
    policy: TimingPolicy,
}

impl AttendanceReconciler {
    pub fn new(
        attendance: Arc<dyn AttendanceRepository>,
        transitions: Arc<SessionTransitionHandler>,
        policy: TimingPolicy,
    ) -> Self {
        Self {
            attendance,
            transitions,
            policy,
        }
    }

    /// Apply a participant-joined webhook event.
    ///
    /// Returns true when the event was accepted (including replays,
    /// which are acknowledged without effect). An accepted first join
    /// of a Ready session also starts it; a failure there is logged,
    /// never surfaced, since the attendance evidence is already safe.
    pub async fn record_join(
        &self,
        session: &Session,
        user_id: &UserId,
        event: JoinEvent,
        now: Timestamp,
    ) -> Result<bool, SessionError> {
        if session.status() == SessionStatus::Cancelled {
            debug!(
                session_id = %session.id(),
                event_id = %event.event_id,
                "ignoring join for cancelled session"
            );
            return Ok(false);
        }

        let mut record = self.attendance.find_or_create(session.id(), user_id).await?;
        let window = SessionWindow::of(session);
        let outcome = record.record_join(&event, &window, &self.policy);

        if outcome != JoinOutcome::DuplicateEvent {
            self.attendance.upsert(&record).await?;
        }

        if outcome == JoinOutcome::Recorded {
            if let Err(e) = self
                .transitions
                .to_ongoing(session, event.occurred_at, now)
                .await
            {
                warn!(
                    session_id = %session.id(),
                    error = %e,
                    "join accepted but session start failed"
                );
            }
        }

        Ok(true)
    }

    /// Apply a participant-left webhook event.
    ///
    /// Returns true when the event was accepted. Leave-before-join and
    /// missing-cycle cases are absorbed by the record itself.
    pub async fn record_leave(
        &self,
        session: &Session,
        user_id: &UserId,
        event: LeaveEvent,
    ) -> Result<bool, SessionError> {
        if session.status() == SessionStatus::Cancelled {
            debug!(
                session_id = %session.id(),
                event_id = %event.event_id,
                "ignoring leave for cancelled session"
            );
            return Ok(false);
        }

        let mut record = self.attendance.find_or_create(session.id(), user_id).await?;
        let window = SessionWindow::of(session);
        let outcome = record.record_leave(&event, &window, &self.policy);

        if outcome != LeaveOutcome::DuplicateEvent {
            self.attendance.upsert(&record).await?;
        }

        Ok(true)
    }

    /// Finalize attendance for a session. No-op for records already
    /// calculated.
    pub async fn calculate_final_attendance(
        &self,
        session: &Session,
    ) -> Result<FinalizeReport, SessionError> {
        finalize_attendance(self.attendance.as_ref(), session, &self.policy, false).await
    }

    /// Reset and re-run finalization for every record of a session.
    pub async fn recalculate_attendance(
        &self,
        session: &Session,
    ) -> Result<FinalizeReport, SessionError> {
        finalize_attendance(self.attendance.as_ref(), session, &self.policy, true).await
    }
}
