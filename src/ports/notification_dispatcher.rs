//! Notification dispatcher port.
//!
//! Lifecycle transitions announce themselves through this port.
//! Dispatch is fire-and-forget from the caller's point of view: a
//! failed notification is logged, never fatal to the transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;
use crate::domain::session::Session;

/// Kinds of lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNotification {
    SessionReady,
    SessionStarted,
    SessionCompleted,
    SessionCancelled,
    AttendanceMarkedAbsent,
}

/// Port for announcing lifecycle transitions to interested parties.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Dispatch one notification about a session.
    async fn dispatch(
        &self,
        session: &Session,
        notification: SessionNotification,
    ) -> Result<(), DomainError>;
}
