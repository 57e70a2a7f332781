//! Lifecycle application services.
//!
//! [`SessionTransitionHandler`] applies individual guarded transitions;
//! [`StatusTransitionDriver`] runs them over the scheduler's batch.

mod driver;
mod transition_handler;

pub use driver::{StatusTransitionDriver, TransitionFailure, TransitionReport};
pub use transition_handler::SessionTransitionHandler;
