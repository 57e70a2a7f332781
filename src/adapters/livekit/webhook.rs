//! LiveKit webhook payloads.
//!
//! The webhook receiver deserializes the provider's event envelope and
//! converts the participant events into domain attendance events. Other
//! event kinds (room_started, track_published, ...) are ignored.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::attendance::{JoinEvent, LeaveEvent};
use crate::domain::foundation::{EventId, ParticipantSid, RoomName, Timestamp, UserId};

/// Raw webhook envelope as LiveKit posts it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event: String,
    pub id: String,
    // Twirp encodes int64 as a JSON string.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub room: Option<WebhookRoom>,
    #[serde(default)]
    pub participant: Option<WebhookParticipant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRoom {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookParticipant {
    /// Identity the participant joined with; we issue user ids here.
    pub identity: String,
    pub sid: String,
    #[serde(default)]
    pub joined_at: Option<String>,
    /// Connection duration in seconds, present on participant_left.
    #[serde(default)]
    pub duration: Option<String>,
}

/// A webhook event translated into domain terms.
#[derive(Debug, Clone)]
pub enum AttendanceUpdate {
    Join {
        room: RoomName,
        user_id: UserId,
        event: JoinEvent,
    },
    Leave {
        room: RoomName,
        user_id: UserId,
        event: LeaveEvent,
    },
    /// Event kind the lifecycle core does not care about.
    Ignored,
}

#[derive(Debug, Error)]
pub enum WebhookParseError {
    #[error("webhook event {0} is missing its room")]
    MissingRoom(String),
    #[error("webhook event {0} is missing its participant")]
    MissingParticipant(String),
    #[error("webhook field invalid: {0}")]
    InvalidField(String),
}

impl WebhookEvent {
    /// Translate the envelope into an attendance update.
    pub fn into_update(self) -> Result<AttendanceUpdate, WebhookParseError> {
        if self.event != "participant_joined" && self.event != "participant_left" {
            return Ok(AttendanceUpdate::Ignored);
        }

        let room = self
            .room
            .as_ref()
            .ok_or_else(|| WebhookParseError::MissingRoom(self.id.clone()))?;
        let room = RoomName::new(room.name.clone())
            .map_err(|e| WebhookParseError::InvalidField(e.to_string()))?;

        let participant = self
            .participant
            .as_ref()
            .ok_or_else(|| WebhookParseError::MissingParticipant(self.id.clone()))?;
        let user_id = UserId::new(participant.identity.clone())
            .map_err(|e| WebhookParseError::InvalidField(e.to_string()))?;
        let participant_sid = ParticipantSid::new(participant.sid.clone())
            .map_err(|e| WebhookParseError::InvalidField(e.to_string()))?;
        let event_id = EventId::new(self.id.clone())
            .map_err(|e| WebhookParseError::InvalidField(e.to_string()))?;

        let occurred_at = self
            .created_at
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Timestamp::from_unix_secs)
            .unwrap_or_else(Timestamp::now);

        if self.event == "participant_joined" {
            return Ok(AttendanceUpdate::Join {
                room,
                user_id,
                event: JoinEvent {
                    event_id,
                    participant_sid,
                    occurred_at,
                },
            });
        }

        let provider_duration_secs = participant
            .duration
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok());
        Ok(AttendanceUpdate::Leave {
            room,
            user_id,
            event: LeaveEvent {
                event_id,
                participant_sid,
                occurred_at,
                provider_duration_secs,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_joined_parses_to_join_update() {
        let payload = r#"{
            "event": "participant_joined",
            "id": "EV_123",
            "createdAt": "1700000000",
            "room": {"name": "session-abc"},
            "participant": {"identity": "student-1", "sid": "PA_1", "joinedAt": "1700000000"}
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();

        match event.into_update().unwrap() {
            AttendanceUpdate::Join { room, user_id, event } => {
                assert_eq!(room.as_str(), "session-abc");
                assert_eq!(user_id.as_str(), "student-1");
                assert_eq!(event.event_id.as_str(), "EV_123");
                assert_eq!(event.occurred_at.as_unix_secs(), 1_700_000_000);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn participant_left_carries_provider_duration() {
        let payload = r#"{
            "event": "participant_left",
            "id": "EV_124",
            "createdAt": "1700003000",
            "room": {"name": "session-abc"},
            "participant": {"identity": "student-1", "sid": "PA_1", "duration": "2950"}
        }"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();

        match event.into_update().unwrap() {
            AttendanceUpdate::Leave { event, .. } => {
                assert_eq!(event.provider_duration_secs, Some(2950));
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let payload = r#"{"event": "room_started", "id": "EV_125", "room": {"name": "session-abc"}}"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            event.into_update().unwrap(),
            AttendanceUpdate::Ignored
        ));
    }

    #[test]
    fn join_without_participant_is_an_error() {
        let payload = r#"{"event": "participant_joined", "id": "EV_126", "room": {"name": "session-abc"}}"#;
        let event: WebhookEvent = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            event.into_update(),
            Err(WebhookParseError::MissingParticipant(_))
        ));
    }
}
