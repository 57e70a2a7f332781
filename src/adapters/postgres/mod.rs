//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresSessionRepository` - Session aggregates with status CAS
//! - `PostgresAttendanceRepository` - Attendance records with JSONB cycles
//! - `PostgresSettlementLedger` - Earnings with per-session uniqueness

mod attendance_repository;
mod session_repository;
mod settlement_ledger;
mod usage_tracker;

pub use attendance_repository::PostgresAttendanceRepository;
pub use session_repository::PostgresSessionRepository;
pub use settlement_ledger::PostgresSettlementLedger;
pub use usage_tracker::PostgresUsageTracker;
