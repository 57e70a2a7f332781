//! Attendance record aggregate.
//!
//! One record per (session, user). Join/leave webhook events append to
//! join cycles; finalization collapses the cycles into a total duration
//! and an attendance classification.
//!
//! # Idempotency
//!
//! Webhook delivery is at-least-once. Every event id is remembered on
//! the record; replays of an already-seen id are acknowledged without
//! changing state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AttendanceStatus, EventId, ParticipantSid, SessionId, Timestamp, UserId,
};
use crate::domain::session::{Session, TimingPolicy};

/// Scheduled time window of a session, as cycle accounting needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub scheduled_at: Timestamp,
    pub scheduled_end: Timestamp,
    pub duration_minutes: u32,
}

impl SessionWindow {
    /// Builds the window from scheduled start and planned duration.
    pub fn new(scheduled_at: Timestamp, duration_minutes: u32) -> Self {
        Self {
            scheduled_at,
            scheduled_end: scheduled_at.plus_minutes(duration_minutes as i64),
            duration_minutes,
        }
    }

    /// Builds the window of a session aggregate.
    pub fn of(session: &Session) -> Self {
        Self::new(*session.scheduled_at(), session.duration_minutes())
    }
}

/// A participant-joined webhook event, reduced to what accounting needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEvent {
    pub event_id: EventId,
    pub participant_sid: ParticipantSid,
    /// Provider-carried join time; events order by this, not by arrival.
    pub occurred_at: Timestamp,
}

/// A participant-left webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveEvent {
    pub event_id: EventId,
    pub participant_sid: ParticipantSid,
    pub occurred_at: Timestamp,
    /// Duration the provider measured for the participant, when carried.
    pub provider_duration_secs: Option<u64>,
}

/// Outcome of applying a join event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new cycle was opened.
    Recorded,
    /// Event id already seen; nothing changed.
    DuplicateEvent,
    /// An open cycle for the same sid is newer than the reconnection
    /// threshold; the join is a reconnect burst and was swallowed.
    ReconnectBurst,
}

/// Outcome of applying a leave event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The matching open cycle was closed.
    Recorded,
    /// Event id already seen; nothing changed.
    DuplicateEvent,
    /// No open cycle existed; a zero-duration cycle recorded the evidence.
    OrphanLeave,
}

/// One contiguous presence interval for one participant device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinCycle {
    participant_sid: ParticipantSid,
    joined_at: Timestamp,
    left_at: Option<Timestamp>,
    duration_seconds: u64,
    auto_closed: bool,
}

impl JoinCycle {
    fn open(participant_sid: ParticipantSid, joined_at: Timestamp) -> Self {
        Self {
            participant_sid,
            joined_at,
            left_at: None,
            duration_seconds: 0,
            auto_closed: false,
        }
    }

    /// Returns the participant sid that produced this cycle.
    pub fn participant_sid(&self) -> &ParticipantSid {
        &self.participant_sid
    }

    /// Returns when the cycle opened.
    pub fn joined_at(&self) -> &Timestamp {
        &self.joined_at
    }

    /// Returns when the cycle closed, if it has.
    pub fn left_at(&self) -> Option<&Timestamp> {
        self.left_at.as_ref()
    }

    /// Returns the counted duration of a closed cycle.
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// Returns true if the cycle is still open.
    pub fn is_open(&self) -> bool {
        self.left_at.is_none()
    }

    /// Returns true if the cycle was closed by a heuristic, not a leave.
    pub fn auto_closed(&self) -> bool {
        self.auto_closed
    }

    /// Counted seconds between an effective join (capped at session
    /// start) and the given end. Pre-session presence contributes zero.
    fn counted_seconds(&self, end: Timestamp, window: &SessionWindow) -> u64 {
        let effective_join = self.joined_at.max(window.scheduled_at);
        end.seconds_since(&effective_join).max(0) as u64
    }

    fn close(&mut self, end: Timestamp, window: &SessionWindow, auto: bool) {
        let end = end.max(self.joined_at);
        self.duration_seconds = self.counted_seconds(end, window);
        self.left_at = Some(end);
        self.auto_closed = auto;
    }
}

/// Attendance record for one user in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    session_id: SessionId,
    user_id: UserId,
    cycles: Vec<JoinCycle>,
    seen_event_ids: BTreeSet<EventId>,
    join_count: u32,
    leave_count: u32,
    duration_seconds: u64,
    first_joined_at: Option<Timestamp>,
    last_left_at: Option<Timestamp>,
    calculated: bool,
    status: AttendanceStatus,
    attendance_percent: f64,
}

impl AttendanceRecord {
    /// Creates an empty record for a (session, user) pair.
    pub fn new(session_id: SessionId, user_id: UserId) -> Self {
        Self {
            session_id,
            user_id,
            cycles: Vec::new(),
            seen_event_ids: BTreeSet::new(),
            join_count: 0,
            leave_count: 0,
            duration_seconds: 0,
            first_joined_at: None,
            last_left_at: None,
            calculated: false,
            status: AttendanceStatus::Absent,
            attendance_percent: 0.0,
        }
    }

    /// Reconstitute a record from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        session_id: SessionId,
        user_id: UserId,
        cycles: Vec<JoinCycle>,
        seen_event_ids: BTreeSet<EventId>,
        join_count: u32,
        leave_count: u32,
        duration_seconds: u64,
        first_joined_at: Option<Timestamp>,
        last_left_at: Option<Timestamp>,
        calculated: bool,
        status: AttendanceStatus,
        attendance_percent: f64,
    ) -> Self {
        Self {
            session_id,
            user_id,
            cycles,
            seen_event_ids,
            join_count,
            leave_count,
            duration_seconds,
            first_joined_at,
            last_left_at,
            calculated,
            status,
            attendance_percent,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session this record belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the user this record belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the join cycles, ordered by join time.
    pub fn cycles(&self) -> &[JoinCycle] {
        &self.cycles
    }

    /// Returns the seen webhook event ids.
    pub fn seen_event_ids(&self) -> &BTreeSet<EventId> {
        &self.seen_event_ids
    }

    /// Returns how many join events were accepted.
    pub fn join_count(&self) -> u32 {
        self.join_count
    }

    /// Returns how many leave events were accepted.
    pub fn leave_count(&self) -> u32 {
        self.leave_count
    }

    /// Returns total counted seconds across closed cycles.
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// Returns the first recorded join time.
    pub fn first_joined_at(&self) -> Option<&Timestamp> {
        self.first_joined_at.as_ref()
    }

    /// Returns the last recorded leave time.
    pub fn last_left_at(&self) -> Option<&Timestamp> {
        self.last_left_at.as_ref()
    }

    /// Returns true once the record has been finalized.
    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// Returns the finalized classification.
    pub fn status(&self) -> AttendanceStatus {
        self.status
    }

    /// Returns the finalized attendance percentage (0-100).
    pub fn attendance_percent(&self) -> f64 {
        self.attendance_percent
    }

    /// Returns true if any participation evidence exists: counted time
    /// on a closed cycle, or a device currently in the room.
    pub fn has_participation(&self) -> bool {
        self.duration_seconds > 0 || self.cycles.iter().any(JoinCycle::is_open)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event application
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a participant-joined event.
    ///
    /// Replayed event ids are swallowed. A join while an open cycle for
    /// the same sid exists is either a reconnect burst (within the
    /// threshold of that cycle's join) or evidence of a missed leave, in
    /// which case the stale cycle closes at the earlier of the new join
    /// time and the scheduled end before the new cycle opens. Cycles for
    /// other sids are left untouched; multi-device presence stays as
    /// separate cycles.
    pub fn record_join(
        &mut self,
        event: &JoinEvent,
        window: &SessionWindow,
        policy: &TimingPolicy,
    ) -> JoinOutcome {
        if self.seen_event_ids.contains(&event.event_id) {
            return JoinOutcome::DuplicateEvent;
        }
        self.seen_event_ids.insert(event.event_id.clone());

        if let Some(open) = self
            .cycles
            .iter_mut()
            .find(|c| c.is_open() && c.participant_sid == event.participant_sid)
        {
            let gap = event.occurred_at.seconds_since(&open.joined_at).abs();
            if gap <= policy.reconnection_threshold_secs as i64 {
                return JoinOutcome::ReconnectBurst;
            }
            // Missed leave: the old cycle ends no later than the session.
            let end = event.occurred_at.min(window.scheduled_end);
            open.close(end, window, true);
        }

        self.cycles
            .push(JoinCycle::open(event.participant_sid.clone(), event.occurred_at));
        self.cycles.sort_by_key(|c| *c.joined_at());
        self.join_count += 1;
        self.first_joined_at = Some(match self.first_joined_at {
            Some(first) => first.min(event.occurred_at),
            None => event.occurred_at,
        });
        self.recompute_total();
        JoinOutcome::Recorded
    }

    /// Applies a participant-left event.
    ///
    /// The leave closes the open cycle for the same sid, falling back to
    /// the most recent open cycle of any sid. A leave with no open cycle
    /// at all records a zero-duration cycle so the evidence survives.
    /// Provider-measured durations win over our own arithmetic.
    pub fn record_leave(
        &mut self,
        event: &LeaveEvent,
        window: &SessionWindow,
        _policy: &TimingPolicy,
    ) -> LeaveOutcome {
        if self.seen_event_ids.contains(&event.event_id) {
            return LeaveOutcome::DuplicateEvent;
        }
        self.seen_event_ids.insert(event.event_id.clone());
        self.leave_count += 1;
        self.last_left_at = Some(match self.last_left_at {
            Some(last) => last.max(event.occurred_at),
            None => event.occurred_at,
        });

        let open_index = self
            .cycles
            .iter()
            .rposition(|c| c.is_open() && c.participant_sid == event.participant_sid)
            .or_else(|| self.cycles.iter().rposition(JoinCycle::is_open));

        let outcome = match open_index {
            Some(index) => {
                let cycle = &mut self.cycles[index];
                cycle.close(event.occurred_at, window, false);
                if let Some(provider_secs) = event.provider_duration_secs {
                    cycle.duration_seconds = provider_secs;
                }
                LeaveOutcome::Recorded
            }
            None => {
                let mut cycle =
                    JoinCycle::open(event.participant_sid.clone(), event.occurred_at);
                cycle.close(event.occurred_at, window, false);
                cycle.duration_seconds = event.provider_duration_secs.unwrap_or(0);
                self.cycles.push(cycle);
                self.cycles.sort_by_key(|c| *c.joined_at());
                LeaveOutcome::OrphanLeave
            }
        };

        self.recompute_total();
        outcome
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Finalization
    // ─────────────────────────────────────────────────────────────────────────

    /// Finalizes the record: closes stale open cycles at the scheduled
    /// end, totals counted time, and classifies attendance.
    ///
    /// Returns false without touching anything when already calculated,
    /// unless `force` is set (recalculation resets and re-runs).
    pub fn finalize(&mut self, window: &SessionWindow, policy: &TimingPolicy, force: bool) -> bool {
        if self.calculated && !force {
            return false;
        }

        for cycle in self.cycles.iter_mut().filter(|c| c.is_open()) {
            cycle.close(window.scheduled_end, window, true);
        }
        self.recompute_total();

        let planned_secs = (window.duration_minutes as u64) * 60;
        let percent = if planned_secs == 0 || self.duration_seconds == 0 {
            0.0
        } else {
            ((self.duration_seconds as f64 / planned_secs as f64) * 100.0).min(100.0)
        };

        self.status = self.classify(percent, window, policy);
        self.attendance_percent = (percent * 100.0).round() / 100.0;
        self.calculated = true;
        true
    }

    fn classify(
        &self,
        percent: f64,
        window: &SessionWindow,
        policy: &TimingPolicy,
    ) -> AttendanceStatus {
        if self.duration_seconds == 0 {
            return AttendanceStatus::Absent;
        }
        let late_deadline = window
            .scheduled_at
            .plus_minutes(policy.start_grace_minutes as i64);
        let joined_late = self
            .first_joined_at
            .map(|first| first.is_after(&late_deadline))
            .unwrap_or(false);

        if joined_late {
            if percent >= policy.late_threshold_percent as f64 {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Partial
            }
        } else if percent >= policy.present_threshold_percent as f64 {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Partial
        }
    }

    fn recompute_total(&mut self) {
        self.duration_seconds = self
            .cycles
            .iter()
            .filter(|c| !c.is_open())
            .map(JoinCycle::duration_seconds)
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> SessionWindow {
        // 60 minute session starting at a fixed instant.
        SessionWindow::new(Timestamp::from_unix_secs(1_700_000_000), 60)
    }

    fn policy() -> TimingPolicy {
        TimingPolicy::default()
    }

    fn record() -> AttendanceRecord {
        AttendanceRecord::new(SessionId::new(), UserId::new("student-1").unwrap())
    }

    fn join(id: &str, sid: &str, at: Timestamp) -> JoinEvent {
        JoinEvent {
            event_id: EventId::new(id).unwrap(),
            participant_sid: ParticipantSid::new(sid).unwrap(),
            occurred_at: at,
        }
    }

    fn leave(id: &str, sid: &str, at: Timestamp) -> LeaveEvent {
        LeaveEvent {
            event_id: EventId::new(id).unwrap(),
            participant_sid: ParticipantSid::new(sid).unwrap(),
            occurred_at: at,
            provider_duration_secs: None,
        }
    }

    #[test]
    fn join_then_leave_counts_duration() {
        let w = window();
        let mut rec = record();

        assert_eq!(
            rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy()),
            JoinOutcome::Recorded
        );
        assert_eq!(
            rec.record_leave(&leave("e2", "PA_1", w.scheduled_at.plus_minutes(30)), &w, &policy()),
            LeaveOutcome::Recorded
        );

        assert_eq!(rec.duration_seconds(), 30 * 60);
        assert_eq!(rec.join_count(), 1);
        assert_eq!(rec.leave_count(), 1);
    }

    #[test]
    fn replayed_event_id_is_swallowed() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        assert_eq!(
            rec.record_join(&join("e1", "PA_1", w.scheduled_at.plus_secs(5)), &w, &policy()),
            JoinOutcome::DuplicateEvent
        );
        assert_eq!(rec.join_count(), 1);
        assert_eq!(rec.cycles().len(), 1);
    }

    #[test]
    fn reconnect_burst_within_threshold_is_ignored() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        // Second join 2 seconds later on the same sid: burst.
        assert_eq!(
            rec.record_join(&join("e2", "PA_1", w.scheduled_at.plus_secs(2)), &w, &policy()),
            JoinOutcome::ReconnectBurst
        );
        assert_eq!(rec.cycles().len(), 1);
        assert!(rec.cycles()[0].is_open());
    }

    #[test]
    fn stale_open_cycle_closes_before_new_cycle_opens() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        // Join again 30 minutes later: the first cycle missed its leave.
        let second = w.scheduled_at.plus_minutes(30);
        assert_eq!(
            rec.record_join(&join("e2", "PA_1", second), &w, &policy()),
            JoinOutcome::Recorded
        );

        assert_eq!(rec.cycles().len(), 2);
        let first = &rec.cycles()[0];
        assert!(!first.is_open());
        assert!(first.auto_closed());
        assert_eq!(first.duration_seconds(), 30 * 60);
        assert!(rec.cycles()[1].is_open());
    }

    #[test]
    fn stale_cycle_close_is_bounded_by_scheduled_end() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        // New join well past the session end: old cycle caps at the end.
        rec.record_join(&join("e2", "PA_1", w.scheduled_at.plus_minutes(90)), &w, &policy());

        assert_eq!(rec.cycles()[0].duration_seconds(), 60 * 60);
        assert_eq!(rec.cycles()[0].left_at(), Some(&w.scheduled_end));
    }

    #[test]
    fn pre_session_presence_does_not_count() {
        let w = window();
        let mut rec = record();

        // Joined 10 minutes early, left 20 minutes in: 20 count.
        rec.record_join(&join("e1", "PA_1", w.scheduled_at.minus_minutes(10)), &w, &policy());
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_at.plus_minutes(20)), &w, &policy());

        assert_eq!(rec.duration_seconds(), 20 * 60);
    }

    #[test]
    fn cycle_entirely_before_session_counts_zero() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at.minus_minutes(20)), &w, &policy());
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_at.minus_minutes(5)), &w, &policy());

        assert_eq!(rec.duration_seconds(), 0);
        assert!(!rec.has_participation());
    }

    #[test]
    fn orphan_leave_records_zero_duration_cycle() {
        let w = window();
        let mut rec = record();

        assert_eq!(
            rec.record_leave(&leave("e1", "PA_1", w.scheduled_at.plus_minutes(10)), &w, &policy()),
            LeaveOutcome::OrphanLeave
        );
        assert_eq!(rec.cycles().len(), 1);
        assert_eq!(rec.duration_seconds(), 0);
        assert_eq!(rec.leave_count(), 1);
    }

    #[test]
    fn provider_duration_wins_over_computed() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        let mut ev = leave("e2", "PA_1", w.scheduled_at.plus_minutes(30));
        ev.provider_duration_secs = Some(25 * 60);
        rec.record_leave(&ev, &w, &policy());

        assert_eq!(rec.duration_seconds(), 25 * 60);
    }

    #[test]
    fn leave_before_join_clamps_to_zero() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at.plus_minutes(10)), &w, &policy());
        // Clock skew: leave timestamp precedes the join.
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_at.plus_minutes(5)), &w, &policy());

        assert_eq!(rec.duration_seconds(), 0);
    }

    #[test]
    fn multi_device_cycles_stay_separate() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        // Second device joins 5 minutes in; both cycles stay open.
        assert_eq!(
            rec.record_join(&join("e2", "PA_2", w.scheduled_at.plus_minutes(5)), &w, &policy()),
            JoinOutcome::Recorded
        );
        assert_eq!(rec.cycles().iter().filter(|c| c.is_open()).count(), 2);

        rec.record_leave(&leave("e3", "PA_1", w.scheduled_at.plus_minutes(30)), &w, &policy());
        rec.record_leave(&leave("e4", "PA_2", w.scheduled_at.plus_minutes(40)), &w, &policy());

        // Overlap is not deduplicated: 30 + 35 minutes.
        assert_eq!(rec.duration_seconds(), (30 + 35) * 60);
    }

    #[test]
    fn finalize_closes_open_cycles_at_scheduled_end() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        assert!(rec.finalize(&w, &policy(), false));

        assert!(!rec.cycles()[0].is_open());
        assert!(rec.cycles()[0].auto_closed());
        assert_eq!(rec.duration_seconds(), 60 * 60);
        assert_eq!(rec.status(), AttendanceStatus::Present);
        assert_eq!(rec.attendance_percent(), 100.0);
    }

    #[test]
    fn finalize_is_idempotent_unless_forced() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_at.plus_minutes(55)), &w, &policy());

        assert!(rec.finalize(&w, &policy(), false));
        assert!(!rec.finalize(&w, &policy(), false));
        assert!(rec.finalize(&w, &policy(), true));
        assert_eq!(rec.status(), AttendanceStatus::Present);
    }

    #[test]
    fn no_participation_finalizes_as_absent() {
        let w = window();
        let mut rec = record();

        assert!(rec.finalize(&w, &policy(), false));
        assert_eq!(rec.status(), AttendanceStatus::Absent);
        assert_eq!(rec.attendance_percent(), 0.0);
    }

    #[test]
    fn on_time_below_present_threshold_is_partial() {
        let w = window();
        let mut rec = record();

        // 40 of 60 minutes, joined on time: 66.7% < 80%.
        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_at.plus_minutes(40)), &w, &policy());
        rec.finalize(&w, &policy(), false);

        assert_eq!(rec.status(), AttendanceStatus::Partial);
    }

    #[test]
    fn late_join_with_enough_attendance_is_late() {
        let w = window();
        let mut rec = record();

        // Joined 20 minutes late (grace is 15), stayed to the end: 66.7%.
        rec.record_join(&join("e1", "PA_1", w.scheduled_at.plus_minutes(20)), &w, &policy());
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_end), &w, &policy());
        rec.finalize(&w, &policy(), false);

        assert_eq!(rec.status(), AttendanceStatus::Late);
    }

    #[test]
    fn late_join_below_late_threshold_is_partial() {
        let w = window();
        let mut rec = record();

        // Joined 40 minutes late, stayed 20: 33.3% < 50%.
        rec.record_join(&join("e1", "PA_1", w.scheduled_at.plus_minutes(40)), &w, &policy());
        rec.record_leave(&leave("e2", "PA_1", w.scheduled_end), &w, &policy());
        rec.finalize(&w, &policy(), false);

        assert_eq!(rec.status(), AttendanceStatus::Partial);
    }

    #[test]
    fn percentage_caps_at_100() {
        let w = window();
        let mut rec = record();

        // Two devices overlapping the full hour: raw total exceeds 100%.
        rec.record_join(&join("e1", "PA_1", w.scheduled_at), &w, &policy());
        rec.record_join(&join("e2", "PA_2", w.scheduled_at), &w, &policy());
        rec.record_leave(&leave("e3", "PA_1", w.scheduled_end), &w, &policy());
        rec.record_leave(&leave("e4", "PA_2", w.scheduled_end), &w, &policy());
        rec.finalize(&w, &policy(), false);

        assert_eq!(rec.attendance_percent(), 100.0);
    }

    #[test]
    fn open_cycle_counts_as_participation() {
        let w = window();
        let mut rec = record();

        rec.record_join(&join("e1", "PA_1", w.scheduled_at.plus_minutes(1)), &w, &policy());
        assert!(rec.has_participation());
    }
}
