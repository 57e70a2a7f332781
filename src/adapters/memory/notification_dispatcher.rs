//! In-memory notification dispatcher.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::session::Session;
use crate::ports::{NotificationDispatcher, SessionNotification};

/// In-memory implementation of [`NotificationDispatcher`] that records
/// every dispatched notification.
#[derive(Default)]
pub struct InMemoryNotificationDispatcher {
    dispatched: Mutex<Vec<SessionNotification>>,
}

impl InMemoryNotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<SessionNotification> {
        match self.dispatched.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationDispatcher {
    async fn dispatch(
        &self,
        _session: &Session,
        notification: SessionNotification,
    ) -> Result<(), DomainError> {
        match self.dispatched.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
        Ok(())
    }
}
