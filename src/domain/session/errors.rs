//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, SessionStatus};

/// Session-specific errors surfaced by the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session was not found.
    NotFound(SessionId),
    /// Transition is not allowed from the current status.
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
    /// Invalid state for operation.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// The meeting provider rejected or failed the request.
    Provider(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn invalid_transition(from: SessionStatus, to: SessionStatus) -> Self {
        SessionError::InvalidTransition { from, to }
    }
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn provider(message: impl Into<String>) -> Self {
        SessionError::Provider(message.into())
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Provider(_) => ErrorCode::ProviderError,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::InvalidTransition { from, to } => {
                format!("Cannot transition from {} to {}", from, to)
            }
            SessionError::InvalidState(msg) => format!("Invalid state: {}", msg),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Provider(msg) => format!("Meeting provider error: {}", msg),
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SessionNotFound => SessionError::InvalidState(err.to_string()),
            ErrorCode::InvalidStateTransition | ErrorCode::SessionTerminal => {
                SessionError::InvalidState(err.to_string())
            }
            ErrorCode::ValidationFailed => SessionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.to_string(),
            },
            ErrorCode::ProviderError | ErrorCode::MeetingUnavailable => {
                SessionError::Provider(err.to_string())
            }
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}
