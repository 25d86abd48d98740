//! Client sessions and per-connection frame handling.

use std::fmt;
use std::sync::Arc;

use super::channel::{Frame, SharedSink};
use super::meeting::Meeting;
use super::protocol::{decode, ClientCommand};
use super::registry::{MeetingKey, Registry};

/// Identifies a connected client within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side state for one connected client.
pub struct ClientSession {
    id: SessionId,
    sink: SharedSink,
    meeting: Option<MeetingKey>,
}

impl ClientSession {
    pub(super) fn new(id: SessionId, sink: SharedSink) -> Self {
        Self {
            id,
            sink,
            meeting: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The meeting this session joined, if any.
    pub fn meeting(&self) -> Option<MeetingKey> {
        self.meeting
    }

    /// Writes a frame to this client. Failures are logged, never retried.
    pub fn send(&self, frame: Frame) {
        if let Err(e) = self.sink.send_frame(frame) {
            tracing::warn!(session = %self.id, %e, "Failed to send frame");
        }
    }
}

impl Registry {
    /// Handles one raw text frame received from `session`.
    ///
    /// Frames that cannot be decoded are logged and dropped. The connection
    /// stays open and nothing is sent back.
    pub fn on_frame(&mut self, session: SessionId, raw: &str) {
        match decode(raw) {
            Ok(command) => self.dispatch(session, command),
            Err(e) => {
                tracing::warn!(
                    session = %session,
                    %e,
                    frame = %raw.chars().take(200).collect::<String>(),
                    "Error while handling message"
                );
            }
        }
    }

    /// Applies a decoded command on behalf of `session`.
    pub fn dispatch(&mut self, session: SessionId, command: ClientCommand) {
        match command {
            ClientCommand::JoinMeeting {
                meeting_id,
                meeting_password,
            } => self.join_meeting(session, &meeting_id, &meeting_password),
            ClientCommand::SetSong { song } => {
                if let Some(meeting) = self.joined_meeting_mut(session) {
                    meeting.set_song(song);
                }
            }
            ClientCommand::SetSongPosition { song_position } => {
                if let Some(meeting) = self.joined_meeting_mut(session) {
                    meeting.set_song_position(song_position);
                }
            }
        }
    }

    /// Removes `session` from the registry and from its meeting.
    ///
    /// Calling this for a session that is already gone does nothing.
    pub fn on_close(&mut self, session: SessionId) {
        let Some(closed) = self.sessions.remove(&session) else {
            return;
        };
        if let Some(meeting) = closed
            .meeting
            .and_then(|key| self.meeting_by_key_mut(key))
        {
            meeting.remove_member(session);
        }
        tracing::debug!(session = %session, sessions = self.sessions.len(), "Session closed");
    }

    /// Joins `session` to a meeting and sends it the meeting's current state.
    ///
    /// Sessions that already joined, unknown ids, and wrong passwords are
    /// ignored without any reply.
    fn join_meeting(&mut self, session: SessionId, meeting_id: &str, password: &str) {
        let Some(client) = self.sessions.get(&session) else {
            return;
        };
        if client.meeting.is_some() {
            return;
        }
        let sink = Arc::clone(&client.sink);

        let Some(key) = self.meeting_key(meeting_id) else {
            tracing::debug!(session = %session, meeting = %meeting_id, "Join for unknown meeting");
            return;
        };
        let Some(meeting) = self.meeting_by_key_mut(key) else {
            return;
        };
        if !meeting.password_matches(password) {
            tracing::debug!(session = %session, meeting = %meeting_id, "Join with wrong password");
            return;
        }
        meeting.add_member(session, sink);
        let catch_up = meeting.catch_up_frames();
        let members = meeting.member_count();

        if let Some(client) = self.sessions.get_mut(&session) {
            client.meeting = Some(key);
            for frame in catch_up {
                client.send(frame);
            }
        }
        tracing::info!(session = %session, meeting = %meeting_id, members, "Session joined meeting");
    }

    fn joined_meeting_mut(&mut self, session: SessionId) -> Option<&mut Meeting> {
        let key = self.sessions.get(&session)?.meeting?;
        self.meeting_by_key_mut(key)
    }
}
