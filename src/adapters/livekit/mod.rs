//! LiveKit adapters - RoomService client and webhook payloads.

mod provider;
mod webhook;

pub use provider::{LiveKitConfig, LiveKitMeetingProvider};
pub use webhook::{AttendanceUpdate, WebhookEvent, WebhookParseError};
