//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SessionRepository` - Session aggregate storage with status CAS
//! - `AttendanceRepository` - Attendance record storage
//! - `SettlementLedger` - Teacher earnings with per-session uniqueness
//!
//! ## Integration Ports
//!
//! - `MeetingProvider` - External video-meeting service
//! - `SubscriptionUsageTracker` - Subscription slot consumption
//! - `NotificationDispatcher` - Fire-and-forget lifecycle announcements

mod attendance_repository;
mod meeting_provider;
mod notification_dispatcher;
mod session_repository;
mod settlement_ledger;
mod usage_tracker;

pub use attendance_repository::AttendanceRepository;
pub use meeting_provider::{
    MeetingProvider, MeetingProviderError, ParticipantInfo, RoomInfo, RoomOptions,
};
pub use notification_dispatcher::{NotificationDispatcher, SessionNotification};
pub use session_repository::SessionRepository;
pub use settlement_ledger::SettlementLedger;
pub use usage_tracker::{SubscriptionUsageTracker, UsageTrackerError};
