//! Meetings: broadcast groups sharing one song and playback position.

use serde_json::Value;
use std::collections::HashMap;

use super::channel::{Frame, SharedSink};
use super::protocol::ServerEvent;
use super::session::SessionId;

/// A named broadcast group protected by a password.
pub struct Meeting {
    id: String,
    password: String,
    song: Option<Value>,
    song_position: Option<Value>,
    members: HashMap<SessionId, SharedSink>,
}

impl Meeting {
    /// Creates an empty meeting with no song.
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
            song: None,
            song_position: None,
            members: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Exact comparison against the meeting password.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    /// Current song, if one has been set.
    pub fn song(&self) -> Option<&Value> {
        self.song.as_ref()
    }

    /// Playback position within the current song, if one has been set.
    pub fn song_position(&self) -> Option<&Value> {
        self.song_position.as_ref()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, session: SessionId) -> bool {
        self.members.contains_key(&session)
    }

    /// Adds a member. Returns false if the session was already a member.
    pub(crate) fn add_member(&mut self, session: SessionId, sink: SharedSink) -> bool {
        if self.members.contains_key(&session) {
            return false;
        }
        self.members.insert(session, sink);
        true
    }

    /// Removes a member. Removing an absent session is a no-op.
    pub(crate) fn remove_member(&mut self, session: SessionId) -> bool {
        self.members.remove(&session).is_some()
    }

    /// Replaces the song, forgets the old position, and notifies every member.
    pub fn set_song(&mut self, song: Value) {
        let frame = ServerEvent::SetSong { song: &song }.to_frame();
        self.song = present(song);
        self.song_position = None;

        match frame {
            Ok(frame) => self.broadcast(frame),
            Err(e) => tracing::warn!(meeting = %self.id, ?e, "Failed to encode setSong"),
        }
    }

    /// Records a new playback position and notifies every member.
    pub fn set_song_position(&mut self, song_position: Value) {
        let frame = ServerEvent::SetSongPosition {
            song_position: &song_position,
        }
        .to_frame();
        self.song_position = present(song_position);

        match frame {
            Ok(frame) => self.broadcast(frame),
            Err(e) => tracing::warn!(meeting = %self.id, ?e, "Failed to encode setSongPosition"),
        }
    }

    /// Frames that bring a new member up to date: song first, then position.
    ///
    /// Only a missing or `null` value is skipped. Unlike the JavaScript
    /// orchestrator's truthiness check, `0`, `""` and `false` are sent.
    pub fn catch_up_frames(&self) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(2);
        let Some(song) = self.song.as_ref() else {
            return frames;
        };
        match (ServerEvent::SetSong { song }).to_frame() {
            Ok(frame) => frames.push(frame),
            Err(e) => {
                tracing::warn!(meeting = %self.id, ?e, "Failed to encode catch-up song");
                return frames;
            }
        }
        if let Some(song_position) = self.song_position.as_ref() {
            match (ServerEvent::SetSongPosition { song_position }).to_frame() {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    tracing::warn!(meeting = %self.id, ?e, "Failed to encode catch-up position")
                }
            }
        }
        frames
    }

    /// Writes the same frame to every member. A failed write is logged and
    /// does not stop delivery to the others.
    fn broadcast(&self, frame: Frame) {
        for (session, sink) in &self.members {
            if let Err(e) = sink.send_frame(Frame::clone(&frame)) {
                tracing::warn!(meeting = %self.id, session = %session, %e, "Failed to deliver frame");
            }
        }
        tracing::debug!(meeting = %self.id, members = self.members.len(), "Broadcast frame");
    }
}

/// JSON `null` means "not set".
fn present(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        value => Some(value),
    }
}
