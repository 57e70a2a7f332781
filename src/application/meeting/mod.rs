//! Meeting application services.

mod orchestrator;

pub use orchestrator::{EnsuredRoom, MeetingOrchestrator, SweepError, SweepReport};
