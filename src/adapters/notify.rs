//! Logging notification dispatcher.
//!
//! Downstream delivery (push, email) is owned by another service; this
//! dispatcher records the announcement in the structured log where that
//! service's ingest picks it up.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::DomainError;
use crate::domain::session::Session;
use crate::ports::{NotificationDispatcher, SessionNotification};

/// Dispatcher that emits lifecycle notifications as structured logs.
pub struct LoggingNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingNotificationDispatcher {
    async fn dispatch(
        &self,
        session: &Session,
        notification: SessionNotification,
    ) -> Result<(), DomainError> {
        info!(
            session_id = %session.id(),
            academy_id = %session.academy_id(),
            notification = ?notification,
            "session notification"
        );
        Ok(())
    }
}
