//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ACADEMY_SESSIONS_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use academy_sessions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Polling every {:?}", config.scheduler.poll_interval());
//! ```

mod database;
mod error;
mod meeting;
mod scheduler;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use meeting::MeetingConfig;
pub use scheduler::SchedulerConfig;

use serde::Deserialize;

use crate::domain::session::TimingPolicy;

/// Root application configuration
///
/// Contains all configuration sections for the session lifecycle service.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Meeting provider configuration (LiveKit)
    pub meeting: MeetingConfig,

    /// Scheduler loop configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Lifecycle timing policy (windows, graces, thresholds)
    #[serde(default)]
    pub timing: TimingPolicy,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ACADEMY_SESSIONS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ACADEMY_SESSIONS__DATABASE__URL=...` -> `database.url = ...`
    /// - `ACADEMY_SESSIONS__SCHEDULER__POLL_INTERVAL_SECS=30` -> `scheduler.poll_interval_secs = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ACADEMY_SESSIONS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.meeting.validate()?;
        self.scheduler.validate()?;
        self.timing
            .validate()
            .map_err(ValidationError::InvalidTimingPolicy)?;
        Ok(())
    }
}
