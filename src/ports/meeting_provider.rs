//! Meeting provider port.
//!
//! Contract for the external video-meeting service: room lifecycle,
//! participant listing, and join-token issuance. The lifecycle core
//! never assumes a room it created still exists; the provider is the
//! source of truth for room state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantSid, RoomName, Timestamp};

/// Options for creating a meeting room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOptions {
    /// Maximum participants allowed in the room.
    pub max_participants: u32,
    /// Seconds the provider keeps an empty room alive.
    pub empty_timeout_secs: u32,
    /// Hard cap on room lifetime in seconds.
    pub max_duration_secs: u32,
}

impl RoomOptions {
    /// Options for an individual session: teacher, one student, slack
    /// for reconnects.
    pub fn individual(duration_minutes: u32, buffer_minutes: u32) -> Self {
        Self {
            max_participants: 4,
            empty_timeout_secs: 300,
            max_duration_secs: (duration_minutes + buffer_minutes) * 60,
        }
    }

    /// Options for a course session with many participants.
    pub fn course(duration_minutes: u32, buffer_minutes: u32, max_participants: u32) -> Self {
        Self {
            max_participants,
            empty_timeout_secs: 300,
            max_duration_secs: (duration_minutes + buffer_minutes) * 60,
        }
    }
}

/// Provider-side state of a meeting room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub name: RoomName,
    pub num_participants: u32,
    pub created_at: Timestamp,
}

/// A participant currently connected to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// Application-level identity the participant authenticated with.
    pub identity: String,
    pub sid: ParticipantSid,
    pub joined_at: Timestamp,
}

/// Errors from the meeting provider.
#[derive(Debug, thiserror::Error)]
pub enum MeetingProviderError {
    /// Provider could not be reached or timed out.
    #[error("meeting provider unavailable: {0}")]
    Unavailable(String),

    /// Provider rejected the request.
    #[error("meeting provider rejected request: {0}")]
    Rejected(String),

    /// Room does not exist on the provider side.
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// Malformed response or token material.
    #[error("meeting provider protocol error: {0}")]
    Protocol(String),
}

/// Port for the external meeting service.
#[async_trait]
pub trait MeetingProvider: Send + Sync {
    /// Create a room, or return the existing room of the same name.
    ///
    /// Creation is idempotent on room name; re-creating an existing
    /// room must not evict its participants.
    async fn create_room(
        &self,
        name: &RoomName,
        options: &RoomOptions,
    ) -> Result<RoomInfo, MeetingProviderError>;

    /// Check whether a room exists on the provider side.
    async fn room_exists(&self, name: &RoomName) -> Result<bool, MeetingProviderError>;

    /// Close a room, disconnecting everyone.
    ///
    /// Returns false if the room was already gone.
    async fn close_room(&self, name: &RoomName) -> Result<bool, MeetingProviderError>;

    /// List participants currently in a room.
    async fn list_participants(
        &self,
        name: &RoomName,
    ) -> Result<Vec<ParticipantInfo>, MeetingProviderError>;

    /// Issue a join token for an identity, valid for `ttl_secs`.
    fn issue_join_token(
        &self,
        room: &RoomName,
        identity: &str,
        ttl_secs: u64,
    ) -> Result<String, MeetingProviderError>;
}
