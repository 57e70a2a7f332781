//! Attendance application services.

mod reconciler;

pub(crate) use reconciler::finalize_attendance;
pub use reconciler::{AttendanceReconciler, AttendanceSummary, FinalizeError, FinalizeReport};
