//! Application layer - lifecycle orchestration services.
//!
//! This layer coordinates domain operations across ports: the transition
//! handler and batch driver, attendance reconciliation from webhook
//! events, meeting-room orchestration, and settlement on completion.

pub mod attendance;
pub mod lifecycle;
pub mod meeting;
pub mod settlement;

pub use attendance::{AttendanceReconciler, AttendanceSummary, FinalizeReport};
pub use lifecycle::{SessionTransitionHandler, StatusTransitionDriver, TransitionReport};
pub use meeting::{MeetingOrchestrator, SweepReport};
pub use settlement::SettlementHook;
