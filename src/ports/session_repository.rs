//! Session repository port (write side).
//!
//! Defines the contract for persisting and retrieving Session aggregates.
//!
//! # Concurrency
//!
//! Status changes go through [`SessionRepository::update_status`], a
//! compare-and-set keyed on the status the caller read. Two schedulers
//! racing the same transition produce one winner and one clean no-op;
//! nobody blocks on row locks.

use crate::domain::foundation::{DomainError, RoomName, SessionId, SessionStatus, Timestamp};
use crate::domain::session::Session;
use async_trait::async_trait;

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Update an existing session without a status change.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Persist a status transition with compare-and-set semantics.
    ///
    /// Writes the full aggregate only if the stored status still equals
    /// `expected`. Returns false when a concurrent writer got there
    /// first; callers treat that as "lost the race, nothing to do".
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_status(
        &self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, DomainError>;

    /// Find a session by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Find the session owning a meeting room.
    async fn find_by_room(&self, room: &RoomName) -> Result<Option<Session>, DomainError>;

    /// Find non-terminal sessions scheduled inside a window.
    ///
    /// The scheduler loop feeds these to the transition driver.
    async fn find_non_terminal_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Session>, DomainError>;

    /// Find Ready/Ongoing sessions that still hold a meeting room.
    ///
    /// Input to the expired-meeting sweep.
    async fn find_live_with_rooms(&self) -> Result<Vec<Session>, DomainError>;
}
