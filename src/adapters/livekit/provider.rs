//! LiveKit Provider - Implementation of MeetingProvider for LiveKit's
//! RoomService API.
//!
//! Talks twirp JSON (`/twirp/livekit.RoomService/<Method>`) with a
//! short-lived HS256 admin token per request. Join tokens are minted
//! locally with the same key pair.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantSid, RoomName, Timestamp};
use crate::ports::{MeetingProvider, MeetingProviderError, ParticipantInfo, RoomInfo, RoomOptions};

/// Lifetime of per-request admin tokens.
const ADMIN_TOKEN_TTL_SECS: u64 = 60;

/// Configuration for the LiveKit provider.
#[derive(Debug, Clone)]
pub struct LiveKitConfig {
    /// Server URL, e.g. `https://livekit.example.com`.
    pub host: String,
    /// API key (token issuer).
    pub api_key: String,
    /// API secret (token signing key).
    pub api_secret: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl LiveKitConfig {
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// LiveKit RoomService implementation of MeetingProvider.
pub struct LiveKitMeetingProvider {
    config: LiveKitConfig,
    client: Client,
}

impl LiveKitMeetingProvider {
    /// Creates a new LiveKit provider with the given configuration.
    pub fn new(config: LiveKitConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn twirp_url(&self, method: &str) -> String {
        format!(
            "{}/twirp/livekit.RoomService/{}",
            self.config.host.trim_end_matches('/'),
            method
        )
    }

    fn admin_token(&self) -> Result<String, MeetingProviderError> {
        let grant = VideoGrant {
            room_create: Some(true),
            room_list: Some(true),
            room_admin: Some(true),
            ..VideoGrant::default()
        };
        self.sign_token(None, grant, ADMIN_TOKEN_TTL_SECS)
    }

    fn sign_token(
        &self,
        identity: Option<&str>,
        video: VideoGrant,
        ttl_secs: u64,
    ) -> Result<String, MeetingProviderError> {
        let now = Timestamp::now().as_unix_secs();
        let claims = AccessClaims {
            iss: self.config.api_key.clone(),
            sub: identity.map(str::to_string),
            // Small backdate absorbs clock skew between us and the server.
            nbf: now.saturating_sub(10),
            exp: now + ttl_secs,
            video,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.api_secret.as_bytes()),
        )
        .map_err(|e| MeetingProviderError::Protocol(format!("token signing failed: {}", e)))
    }

    async fn call<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Resp, MeetingProviderError> {
        let token = self.admin_token()?;
        let response = self
            .client
            .post(self.twirp_url(method))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| MeetingProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| MeetingProviderError::Protocol(e.to_string()));
        }

        let error: TwirpError = response.json().await.unwrap_or_default();
        if error.code == "not_found" {
            return Err(MeetingProviderError::RoomNotFound(error.msg));
        }
        if status.is_server_error() {
            return Err(MeetingProviderError::Unavailable(format!(
                "{}: {}",
                status, error.msg
            )));
        }
        Err(MeetingProviderError::Rejected(format!(
            "{}: {}",
            status, error.msg
        )))
    }
}

#[async_trait]
impl MeetingProvider for LiveKitMeetingProvider {
    async fn create_room(
        &self,
        name: &RoomName,
        options: &RoomOptions,
    ) -> Result<RoomInfo, MeetingProviderError> {
        let request = CreateRoomRequest {
            name: name.as_str().to_string(),
            empty_timeout: options.empty_timeout_secs,
            max_participants: options.max_participants,
            departure_timeout: 20,
        };
        let room: Room = self.call("CreateRoom", &request).await?;
        room_to_info(&room)
    }

    async fn room_exists(&self, name: &RoomName) -> Result<bool, MeetingProviderError> {
        let request = ListRoomsRequest {
            names: vec![name.as_str().to_string()],
        };
        let response: ListRoomsResponse = self.call("ListRooms", &request).await?;
        Ok(!response.rooms.is_empty())
    }

    async fn close_room(&self, name: &RoomName) -> Result<bool, MeetingProviderError> {
        let request = DeleteRoomRequest {
            room: name.as_str().to_string(),
        };
        match self
            .call::<_, serde_json::Value>("DeleteRoom", &request)
            .await
        {
            Ok(_) => Ok(true),
            Err(MeetingProviderError::RoomNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_participants(
        &self,
        name: &RoomName,
    ) -> Result<Vec<ParticipantInfo>, MeetingProviderError> {
        let request = ListParticipantsRequest {
            room: name.as_str().to_string(),
        };
        let response: ListParticipantsResponse = self.call("ListParticipants", &request).await?;
        response
            .participants
            .iter()
            .map(participant_to_info)
            .collect()
    }

    fn issue_join_token(
        &self,
        room: &RoomName,
        identity: &str,
        ttl_secs: u64,
    ) -> Result<String, MeetingProviderError> {
        let grant = VideoGrant {
            room_join: Some(true),
            room: Some(room.as_str().to_string()),
            ..VideoGrant::default()
        };
        self.sign_token(Some(identity), grant, ttl_secs)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessClaims {
    iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    nbf: u64,
    exp: u64,
    video: VideoGrant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    room_create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_list: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_join: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    name: String,
    empty_timeout: u32,
    max_participants: u32,
    departure_timeout: u32,
}

#[derive(Debug, Serialize)]
struct ListRoomsRequest {
    names: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteRoomRequest {
    room: String,
}

#[derive(Debug, Serialize)]
struct ListParticipantsRequest {
    room: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Room {
    name: String,
    #[serde(default)]
    num_participants: u32,
    // Twirp encodes int64 as a JSON string.
    #[serde(default)]
    creation_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListRoomsResponse {
    #[serde(default)]
    rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Participant {
    identity: String,
    sid: String,
    #[serde(default)]
    joined_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListParticipantsResponse {
    #[serde(default)]
    participants: Vec<Participant>,
}

#[derive(Debug, Default, Deserialize)]
struct TwirpError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
}

fn parse_unix_secs(value: Option<&str>) -> Timestamp {
    value
        .and_then(|s| s.parse::<u64>().ok())
        .map(Timestamp::from_unix_secs)
        .unwrap_or_else(Timestamp::now)
}

fn room_to_info(room: &Room) -> Result<RoomInfo, MeetingProviderError> {
    let name = RoomName::new(room.name.clone())
        .map_err(|e| MeetingProviderError::Protocol(format!("invalid room name: {}", e)))?;
    Ok(RoomInfo {
        name,
        num_participants: room.num_participants,
        created_at: parse_unix_secs(room.creation_time.as_deref()),
    })
}

fn participant_to_info(p: &Participant) -> Result<ParticipantInfo, MeetingProviderError> {
    let sid = ParticipantSid::new(p.sid.clone())
        .map_err(|e| MeetingProviderError::Protocol(format!("invalid participant sid: {}", e)))?;
    Ok(ParticipantInfo {
        identity: p.identity.clone(),
        sid,
        joined_at: parse_unix_secs(p.joined_at.as_deref()),
    })
}
