//! In-memory meeting provider.
//!
//! Simulates the video provider for tests: room lifecycle, participant
//! listing, and injectable per-room failures.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{RoomName, Timestamp};
use crate::ports::{MeetingProvider, MeetingProviderError, ParticipantInfo, RoomInfo, RoomOptions};

struct Room {
    info: RoomInfo,
    participants: Vec<ParticipantInfo>,
}

#[derive(Default)]
struct State {
    rooms: HashMap<RoomName, Room>,
    failing: HashSet<RoomName>,
}

/// In-memory implementation of [`MeetingProvider`].
#[derive(Default)]
pub struct InMemoryMeetingProvider {
    state: Mutex<State>,
}

impl InMemoryMeetingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make create/close calls for this room fail with `Unavailable`.
    pub fn fail_room(&self, name: &RoomName) {
        self.lock().failing.insert(name.clone());
    }

    /// Place a participant in a room, as the provider would report it.
    pub fn add_participant(&self, name: &RoomName, participant: ParticipantInfo) {
        let mut state = self.lock();
        if let Some(room) = state.rooms.get_mut(name) {
            room.participants.push(participant);
            room.info.num_participants = room.participants.len() as u32;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MeetingProvider for InMemoryMeetingProvider {
    async fn create_room(
        &self,
        name: &RoomName,
        _options: &RoomOptions,
    ) -> Result<RoomInfo, MeetingProviderError> {
        let mut state = self.lock();
        if state.failing.contains(name) {
            return Err(MeetingProviderError::Unavailable(format!(
                "injected failure for room {}",
                name
            )));
        }
        let room = state.rooms.entry(name.clone()).or_insert_with(|| Room {
            info: RoomInfo {
                name: name.clone(),
                num_participants: 0,
                created_at: Timestamp::now(),
            },
            participants: Vec::new(),
        });
        Ok(room.info.clone())
    }

    async fn room_exists(&self, name: &RoomName) -> Result<bool, MeetingProviderError> {
        Ok(self.lock().rooms.contains_key(name))
    }

    async fn close_room(&self, name: &RoomName) -> Result<bool, MeetingProviderError> {
        let mut state = self.lock();
        if state.failing.contains(name) {
            return Err(MeetingProviderError::Unavailable(format!(
                "injected failure for room {}",
                name
            )));
        }
        Ok(state.rooms.remove(name).is_some())
    }

    async fn list_participants(
        &self,
        name: &RoomName,
    ) -> Result<Vec<ParticipantInfo>, MeetingProviderError> {
        let state = self.lock();
        let room = state
            .rooms
            .get(name)
            .ok_or_else(|| MeetingProviderError::RoomNotFound(name.to_string()))?;
        Ok(room.participants.clone())
    }

    fn issue_join_token(
        &self,
        room: &RoomName,
        identity: &str,
        ttl_secs: u64,
    ) -> Result<String, MeetingProviderError> {
        Ok(format!("token:{}:{}:{}", room, identity, ttl_secs))
    }
}
