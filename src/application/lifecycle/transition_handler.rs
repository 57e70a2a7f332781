//! SessionTransitionHandler - guarded, persisted status transitions.
//!
//! Each `to_*` method evaluates the pure guard, applies the mutation to
//! a working copy of the aggregate, and persists it through the status
//! compare-and-set. Losing the CAS is a clean no-op; only the winner
//! runs the downstream side effects.
//!
//! Side-effect ordering differs by direction of risk:
//!
//! - Entering Ready provisions the room BEFORE the status write, so a
//!   provider failure leaves the session Scheduled and retryable.
//! - Entering Completed/Absent commits the status FIRST, then runs
//!   attendance finalization, room closure, slot consumption, earnings,
//!   and notifications as logged best-effort steps.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::attendance::finalize_attendance;
use crate::application::meeting::MeetingOrchestrator;
use crate::application::settlement::SettlementHook;
use crate::domain::foundation::{SessionStatus, Timestamp, UserId};
use crate::domain::session::{
    join_starts_session, should_auto_complete, should_transition_to_absent,
    should_transition_to_ready, Session, SessionError, TimingPolicy, TransitionContext,
    TransitionOutcome,
};
use crate::ports::{
    AttendanceRepository, NotificationDispatcher, SessionNotification, SessionRepository,
    SubscriptionUsageTracker,
};

/// Applies guarded lifecycle transitions and their side effects.
pub struct SessionTransitionHandler {
    sessions: Arc<dyn SessionRepository>,
    attendance: Arc<dyn AttendanceRepository>,
    meetings: Arc<MeetingOrchestrator>,
    usage: Arc<dyn SubscriptionUsageTracker>,
    settlement: Arc<SettlementHook>,
    notifier: Arc<dyn NotificationDispatcher>,
    policy: TimingPolicy,
    strict: bool,
}

impl SessionTransitionHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        attendance: Arc<dyn AttendanceRepository>,
        meetings: Arc<MeetingOrchestrator>,
        usage: Arc<dyn SubscriptionUsageTracker>,
        settlement: Arc<SettlementHook>,
        notifier: Arc<dyn NotificationDispatcher>,
        policy: TimingPolicy,
    ) -> Self {
        Self {
            sessions,
            attendance,
            meetings,
            usage,
            settlement,
            notifier,
            policy,
            strict: false,
        }
    }

    /// Turn guard rejections into errors instead of no-ops. Meant for
    /// operator-invoked transitions where silence would hide mistakes.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn policy(&self) -> &TimingPolicy {
        &self.policy
    }

    /// Scheduled -> Ready. Provisions the meeting room first; a provider
    /// failure propagates and leaves the session Scheduled.
    pub async fn to_ready(
        &self,
        session: &Session,
        now: Timestamp,
    ) -> Result<TransitionOutcome, SessionError> {
        let ctx = TransitionContext::new(now, self.policy.clone());
        if !should_transition_to_ready(session, &ctx) {
            return self.rejected(session.status(), SessionStatus::Ready);
        }

        let mut updated = session.clone();
        self.meetings
            .ensure_meeting_available(&mut updated, false, &ctx)
            .await?;
        updated.mark_ready(now)?;

        if !self
            .sessions
            .update_status(&updated, SessionStatus::Scheduled)
            .await?
        {
            debug!(session_id = %session.id(), "lost readiness race, skipping");
            return Ok(TransitionOutcome::NotApplicable);
        }

        info!(session_id = %session.id(), "session ready");
        self.notify(&updated, SessionNotification::SessionReady).await;
        Ok(TransitionOutcome::Transitioned)
    }

    /// Ready -> Ongoing, driven by an accepted participant join.
    ///
    /// `join_at` becomes the session's actual start time.
    pub async fn to_ongoing(
        &self,
        session: &Session,
        join_at: Timestamp,
        now: Timestamp,
    ) -> Result<TransitionOutcome, SessionError> {
        let ctx = TransitionContext::new(now, self.policy.clone());
        if !join_starts_session(session, &join_at, &ctx) {
            return self.rejected(session.status(), SessionStatus::Ongoing);
        }

        let mut updated = session.clone();
        updated.begin(join_at)?;

        if !self
            .sessions
            .update_status(&updated, SessionStatus::Ready)
            .await?
        {
            debug!(session_id = %session.id(), "lost start race, skipping");
            return Ok(TransitionOutcome::NotApplicable);
        }

        info!(session_id = %session.id(), started_at = %join_at, "session started");
        self.notify(&updated, SessionNotification::SessionStarted).await;
        Ok(TransitionOutcome::Transitioned)
    }

    /// Ongoing -> Completed, once the session has run past its scheduled
    /// end plus the buffer. Downstream effects run after the status
    /// commit and never fail the transition.
    pub async fn to_completed(
        &self,
        session: &Session,
        now: Timestamp,
    ) -> Result<TransitionOutcome, SessionError> {
        let ctx = TransitionContext::new(now, self.policy.clone());
        if !should_auto_complete(session, &ctx) {
            return self.rejected(session.status(), SessionStatus::Completed);
        }

        let mut updated = session.clone();
        updated.complete(now)?;

        if !self
            .sessions
            .update_status(&updated, SessionStatus::Ongoing)
            .await?
        {
            debug!(session_id = %session.id(), "lost completion race, skipping");
            return Ok(TransitionOutcome::NotApplicable);
        }

        info!(
            session_id = %session.id(),
            delivered_minutes = updated.actual_duration_minutes(),
            "session completed"
        );

        if let Err(e) = finalize_attendance(self.attendance.as_ref(), &updated, &self.policy, false).await
        {
            warn!(session_id = %updated.id(), error = %e, "attendance finalization failed");
        }
        if let Err(e) = self.meetings.close_session_room(&updated).await {
            warn!(session_id = %updated.id(), error = %e, "room closure failed");
        }
        self.consume_slots(&updated).await;
        if let Err(e) = self.settlement.calculate_session_earnings(&updated, now).await {
            warn!(session_id = %updated.id(), error = %e, "earnings recording failed");
        }
        self.notify(&updated, SessionNotification::SessionCompleted).await;

        Ok(TransitionOutcome::Transitioned)
    }

    /// Ready/Ongoing -> Absent for an individual session nobody attended.
    ///
    /// Re-checks attendance evidence before firing; a webhook that landed
    /// between the driver's read and this call vetoes the marking.
    pub async fn to_absent(
        &self,
        session: &Session,
        now: Timestamp,
    ) -> Result<TransitionOutcome, SessionError> {
        let ctx = TransitionContext::new(now, self.policy.clone());
        let has_participation = self.has_participation(session).await?;
        if !should_transition_to_absent(session, has_participation, &ctx) {
            return self.rejected(session.status(), SessionStatus::Absent);
        }

        let expected = session.status();
        let mut updated = session.clone();
        updated.mark_absent(now)?;

        if !self.sessions.update_status(&updated, expected).await? {
            debug!(session_id = %session.id(), "lost absence race, skipping");
            return Ok(TransitionOutcome::NotApplicable);
        }

        info!(session_id = %session.id(), "session marked absent");

        if let Err(e) = finalize_attendance(self.attendance.as_ref(), &updated, &self.policy, false).await
        {
            warn!(session_id = %updated.id(), error = %e, "attendance finalization failed");
        }
        if let Err(e) = self.meetings.close_session_room(&updated).await {
            warn!(session_id = %updated.id(), error = %e, "room closure failed");
        }
        // The reserved slot is forfeited, not refunded.
        self.consume_slots(&updated).await;
        self.notify(&updated, SessionNotification::AttendanceMarkedAbsent)
            .await;

        Ok(TransitionOutcome::Transitioned)
    }

    /// Scheduled/Ready -> Cancelled. Consumes no slot and records no
    /// earnings; an attached room is closed best-effort.
    pub async fn to_cancelled(
        &self,
        session: &Session,
        reason: String,
        cancelled_by: UserId,
        now: Timestamp,
    ) -> Result<TransitionOutcome, SessionError> {
        if !session
            .status()
            .can_transition_to(&SessionStatus::Cancelled)
        {
            return self.rejected(session.status(), SessionStatus::Cancelled);
        }

        let expected = session.status();
        let mut updated = session.clone();
        updated.cancel(reason, cancelled_by, now)?;

        if !self.sessions.update_status(&updated, expected).await? {
            debug!(session_id = %session.id(), "lost cancellation race, skipping");
            return Ok(TransitionOutcome::NotApplicable);
        }

        info!(session_id = %session.id(), "session cancelled");

        if let Err(e) = self.meetings.close_session_room(&updated).await {
            warn!(session_id = %updated.id(), error = %e, "room closure failed");
        }
        self.notify(&updated, SessionNotification::SessionCancelled).await;

        Ok(TransitionOutcome::Transitioned)
    }

    async fn has_participation(&self, session: &Session) -> Result<bool, SessionError> {
        let records = self.attendance.for_session(session.id()).await?;
        Ok(records.iter().any(|r| r.has_participation()))
    }

    async fn consume_slots(&self, session: &Session) {
        if !session.is_individual() {
            return;
        }
        for student_id in session.participant_ids() {
            if let Err(e) = self
                .usage
                .consume_slot(student_id, session.kind(), session.id())
                .await
            {
                warn!(
                    session_id = %session.id(),
                    student_id = %student_id,
                    error = %e,
                    "subscription slot consumption failed"
                );
            }
        }
    }

    async fn notify(&self, session: &Session, notification: SessionNotification) {
        if let Err(e) = self.notifier.dispatch(session, notification).await {
            warn!(
                session_id = %session.id(),
                notification = ?notification,
                error = %e,
                "notification dispatch failed"
            );
        }
    }

    fn rejected(
        &self,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<TransitionOutcome, SessionError> {
        if self.strict {
            Err(SessionError::invalid_transition(from, to))
        } else {
            Ok(TransitionOutcome::NotApplicable)
        }
    }
}
