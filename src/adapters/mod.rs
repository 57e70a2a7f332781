//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed persistence adapters
//! - `livekit` - meeting provider client and webhook payloads
//! - `memory` - in-memory adapters for tests

pub mod livekit;
pub mod memory;
mod notify;
pub mod postgres;

pub use livekit::{LiveKitConfig, LiveKitMeetingProvider};
pub use notify::LoggingNotificationDispatcher;
pub use postgres::{
    PostgresAttendanceRepository, PostgresSessionRepository, PostgresSettlementLedger,
    PostgresUsageTracker,
};
