//! Scheduler loop configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scheduler loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between transition passes
    pub poll_interval_secs: u64,

    /// Hours behind now the candidate window reaches
    pub lookback_hours: u32,

    /// Hours ahead of now the candidate window reaches
    pub lookahead_hours: u32,
}

impl SchedulerConfig {
    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.lookback_hours == 0 || self.lookahead_hours == 0 {
            return Err(ValidationError::InvalidSchedulerWindow);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            lookback_hours: 24,
            lookahead_hours: 1,
        }
    }
}
