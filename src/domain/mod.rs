//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `session` - Session aggregate, timing policy, and transition guards
//! - `attendance` - Join/leave cycle accounting and classification
//! - `settlement` - Teacher earnings records for completed sessions

pub mod attendance;
pub mod foundation;
pub mod session;
pub mod settlement;
