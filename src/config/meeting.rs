//! Meeting provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Meeting provider (LiveKit) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingConfig {
    /// Provider server URL, e.g. `https://livekit.example.com`
    pub host: String,

    /// API key (token issuer)
    pub api_key: String,

    /// API secret (token signing key)
    pub api_secret: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Join token lifetime in seconds
    #[serde(default = "default_join_token_ttl")]
    pub join_token_ttl_secs: u64,
}

impl MeetingConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate meeting provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::MissingRequired("MEETING_HOST"));
        }
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(ValidationError::InvalidMeetingHost);
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("MEETING_API_KEY"));
        }
        if self.api_secret.is_empty() {
            return Err(ValidationError::MissingRequired("MEETING_API_SECRET"));
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    10
}

fn default_join_token_ttl() -> u64 {
    600
}
