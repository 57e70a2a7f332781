//! In-memory adapters.
//!
//! Full port implementations backed by process memory. Used by unit and
//! integration tests; the session repository's status compare-and-set
//! mirrors the Postgres adapter's semantics.

mod attendance_repository;
mod meeting_provider;
mod notification_dispatcher;
mod session_repository;
mod settlement_ledger;
mod usage_tracker;

pub use attendance_repository::InMemoryAttendanceRepository;
pub use meeting_provider::InMemoryMeetingProvider;
pub use notification_dispatcher::InMemoryNotificationDispatcher;
pub use session_repository::InMemorySessionRepository;
pub use settlement_ledger::InMemorySettlementLedger;
pub use usage_tracker::InMemoryUsageTracker;
