//! Timing policy and the explicit evaluation context for transition guards.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Academy-level timing knobs driving the lifecycle guards.
///
/// Defaults match the platform-wide fallbacks; academies may override
/// any field through configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Minutes before `scheduled_at` at which a session becomes Ready.
    pub readiness_window_minutes: u32,
    /// Minutes after `scheduled_at` during which a join still starts the session.
    pub start_grace_minutes: u32,
    /// Minutes after `scheduled_at` before a no-show session is marked Absent.
    pub absence_grace_minutes: u32,
    /// Minutes past scheduled end before an Ongoing session auto-completes.
    pub end_buffer_minutes: u32,
    /// Seconds within which a repeated join is treated as a reconnect burst.
    pub reconnection_threshold_secs: u32,
    /// Attendance percentage at or above which a participant is Present.
    pub present_threshold_percent: u8,
    /// Attendance percentage at or above which a participant is at least Partial.
    pub late_threshold_percent: u8,
    /// Minutes past scheduled end before a live room is force-closed.
    pub room_expiry_buffer_minutes: u32,
    /// Readiness fence: skip sessions scheduled further ahead than this.
    pub max_future_hours: u32,
    /// Readiness fence: skip sessions scheduled further behind than this.
    pub max_past_hours: u32,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            readiness_window_minutes: 15,
            start_grace_minutes: 15,
            absence_grace_minutes: 10,
            end_buffer_minutes: 10,
            reconnection_threshold_secs: 120,
            present_threshold_percent: 80,
            late_threshold_percent: 50,
            room_expiry_buffer_minutes: 30,
            max_future_hours: 24,
            max_past_hours: 24,
        }
    }
}

impl TimingPolicy {
    /// Validates threshold ordering and non-zero windows.
    pub fn validate(&self) -> Result<(), String> {
        if self.present_threshold_percent > 100 || self.late_threshold_percent > 100 {
            return Err("attendance thresholds must be percentages (0-100)".to_string());
        }
        if self.late_threshold_percent > self.present_threshold_percent {
            return Err("late threshold cannot exceed present threshold".to_string());
        }
        if self.readiness_window_minutes == 0 {
            return Err("readiness window must be at least one minute".to_string());
        }
        Ok(())
    }
}

/// Explicit inputs for guard evaluation.
///
/// Guards never read the wall clock; `now` always comes from the caller
/// so batch passes and tests evaluate against a single instant.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    pub now: Timestamp,
    pub policy: TimingPolicy,
}

impl TransitionContext {
    /// Creates a context for the given instant and policy.
    pub fn new(now: Timestamp, policy: TimingPolicy) -> Self {
        Self { now, policy }
    }

    /// Creates a context for the current moment.
    pub fn at_now(policy: TimingPolicy) -> Self {
        Self::new(Timestamp::now(), policy)
    }
}
