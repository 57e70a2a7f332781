//! Academy Sessions - Live tutoring session lifecycle core.
//!
//! Drives scheduled sessions through their lifecycle (readiness, start,
//! completion, absence, cancellation), orchestrates meeting rooms on the
//! video provider, reconciles attendance from provider webhooks, and
//! records teacher earnings on completion.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
