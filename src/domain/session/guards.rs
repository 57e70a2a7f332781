//! Pure transition guard predicates.
//!
//! Guards answer "should this transition fire at instant `now`?" without
//! touching I/O. Anything the decision needs beyond the session itself
//! (attendance evidence, the clock) arrives as an argument.

use crate::domain::foundation::{SessionStatus, Timestamp};

use super::aggregate::Session;
use super::policy::TransitionContext;

/// Far-future fence for starting a session: a join never starts a
/// session scheduled more than this many hours ahead.
pub const ONGOING_FUTURE_FENCE_HOURS: i64 = 2;

/// Scheduled session enters its readiness window.
///
/// True when the session is Scheduled, within the freshness fences, and
/// `now` falls in `[scheduled_at - readiness_window, scheduled_at + start_grace]`.
pub fn should_transition_to_ready(session: &Session, ctx: &TransitionContext) -> bool {
    if session.status() != SessionStatus::Scheduled {
        return false;
    }
    let scheduled = *session.scheduled_at();

    // Stale backlog and far-future rows never become Ready.
    if scheduled.is_after(&ctx.now.plus_hours(ctx.policy.max_future_hours as i64)) {
        return false;
    }
    if scheduled.is_before(&ctx.now.minus_hours(ctx.policy.max_past_hours as i64)) {
        return false;
    }

    let opens = scheduled.minus_minutes(ctx.policy.readiness_window_minutes as i64);
    let closes = scheduled.plus_minutes(ctx.policy.start_grace_minutes as i64);
    !ctx.now.is_before(&opens) && !ctx.now.is_after(&closes)
}

/// Individual session should be marked Absent.
///
/// True when the session is individual, Ready or Ongoing, the absence
/// grace after `scheduled_at` has passed, and no participation evidence
/// exists. Participation is judged by the caller from attendance records.
pub fn should_transition_to_absent(
    session: &Session,
    has_participation: bool,
    ctx: &TransitionContext,
) -> bool {
    if !session.is_individual() || has_participation {
        return false;
    }
    if !matches!(
        session.status(),
        SessionStatus::Ready | SessionStatus::Ongoing
    ) {
        return false;
    }
    let deadline = session
        .scheduled_at()
        .plus_minutes(ctx.policy.absence_grace_minutes as i64);
    ctx.now.is_after(&deadline)
}

/// Ongoing session has run past its scheduled end plus the buffer.
pub fn should_auto_complete(session: &Session, ctx: &TransitionContext) -> bool {
    if session.status() != SessionStatus::Ongoing {
        return false;
    }
    let deadline = session
        .scheduled_end()
        .plus_minutes(ctx.policy.end_buffer_minutes as i64);
    !ctx.now.is_before(&deadline)
}

/// An accepted join should start a Ready session.
///
/// Joins up to `start_grace` before the scheduled time count; joins for
/// sessions scheduled far in the future never start them.
pub fn join_starts_session(session: &Session, join_at: &Timestamp, ctx: &TransitionContext) -> bool {
    if session.status() != SessionStatus::Ready {
        return false;
    }
    let scheduled = *session.scheduled_at();
    if scheduled.is_after(&ctx.now.plus_hours(ONGOING_FUTURE_FENCE_HOURS)) {
        return false;
    }
    let earliest = scheduled.minus_minutes(ctx.policy.start_grace_minutes as i64);
    !join_at.is_before(&earliest)
}

/// A live room has outstayed the session by the expiry buffer.
pub fn meeting_expired(session: &Session, ctx: &TransitionContext) -> bool {
    if !session.status().is_live() || session.meeting_room_name().is_none() {
        return false;
    }
    let deadline = session
        .scheduled_end()
        .plus_minutes(ctx.policy.room_expiry_buffer_minutes as i64);
    ctx.now.is_after(&deadline)
}
