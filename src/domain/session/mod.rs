//! Session domain module.
//!
//! The session lifecycle state machine: aggregate, timing policy, and
//! the pure guard predicates the scheduler evaluates each pass.

mod aggregate;
mod errors;
mod guards;
mod policy;

pub use aggregate::{Session, MAX_DURATION_MINUTES};
pub use errors::SessionError;
pub use guards::{
    join_starts_session, meeting_expired, should_auto_complete, should_transition_to_absent,
    should_transition_to_ready, ONGOING_FUTURE_FENCE_HOURS,
};
pub use policy::{TimingPolicy, TransitionContext};

use serde::{Deserialize, Serialize};

/// Result of attempting a guarded transition.
///
/// Handlers report `NotApplicable` when the guard or current status says
/// the transition should not happen; in strict mode the same situation
/// surfaces as a typed error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionOutcome {
    /// The transition was applied and persisted.
    Transitioned,
    /// Nothing to do: guard not satisfied, already transitioned, or lost
    /// the persistence race to a concurrent writer.
    NotApplicable,
}

impl TransitionOutcome {
    /// Returns true if the transition was applied.
    pub fn transitioned(&self) -> bool {
        matches!(self, TransitionOutcome::Transitioned)
    }
}
