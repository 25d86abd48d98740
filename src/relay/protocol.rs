//! JSON wire frames exchanged with clients.
//!
//! Every frame is a flat object with a `type` discriminator. Song and
//! position payloads are opaque and forwarded verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::channel::Frame;

/// Command sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    JoinMeeting {
        meeting_id: String,
        meeting_password: String,
    },
    SetSong {
        #[serde(default)]
        song: Value,
    },
    #[serde(rename_all = "camelCase")]
    SetSongPosition {
        #[serde(default)]
        song_position: Value,
    },
}

impl ClientCommand {
    /// Names accepted in the `type` field.
    pub const TYPES: [&'static str; 3] = ["joinMeeting", "setSong", "setSongPosition"];

    pub fn join(meeting_id: &str, meeting_password: &str) -> Self {
        Self::JoinMeeting {
            meeting_id: meeting_id.to_string(),
            meeting_password: meeting_password.to_string(),
        }
    }

    pub fn set_song(song: Value) -> Self {
        Self::SetSong { song }
    }

    pub fn set_song_position(song_position: Value) -> Self {
        Self::SetSongPosition { song_position }
    }
}

/// Event pushed to meeting members.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent<'a> {
    SetSong {
        song: &'a Value,
    },
    #[serde(rename_all = "camelCase")]
    SetSongPosition {
        song_position: &'a Value,
    },
}

impl ServerEvent<'_> {
    /// Serializes the event into a frame that can be shared between recipients.
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}

/// Reasons an inbound frame is rejected.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame is not a JSON object: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("frame has no string `type` field")]
    MissingType,
    #[error("invalid message type: {0}")]
    UnknownType(String),
    #[error("invalid `{kind}` payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes a raw text frame into a command.
pub fn decode(raw: &str) -> Result<ClientCommand, FrameError> {
    let value: Value = serde_json::from_str(raw).map_err(FrameError::Malformed)?;
    let kind = match value.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(FrameError::MissingType),
    };
    if !ClientCommand::TYPES.contains(&kind.as_str()) {
        return Err(FrameError::UnknownType(kind));
    }
    serde_json::from_value(value).map_err(|source| FrameError::InvalidPayload { kind, source })
}
