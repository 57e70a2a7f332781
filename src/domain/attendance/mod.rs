//! Attendance domain module.
//!
//! Join/leave cycle accounting and final attendance classification for
//! session participants.

mod record;

pub use record::{
    AttendanceRecord, JoinCycle, JoinEvent, JoinOutcome, LeaveEvent, LeaveOutcome, SessionWindow,
};
