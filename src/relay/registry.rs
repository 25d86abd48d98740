//! Process-wide directory of meetings and connected sessions.

use std::collections::HashMap;

use super::channel::SharedSink;
use super::meeting::Meeting;
use super::session::{ClientSession, SessionId};

/// Handle to a meeting owned by the registry.
///
/// Stays valid after the meeting's id is reassigned to a newer meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeetingKey(usize);

/// Directory of meetings by id and of all live sessions.
#[derive(Default)]
pub struct Registry {
    /// Every meeting ever created. Meetings are never torn down.
    meetings: Vec<Meeting>,
    /// Meeting id to the meeting currently reachable under it.
    meeting_index: HashMap<String, MeetingKey>,
    pub(super) sessions: HashMap<SessionId, ClientSession>,
    next_session: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a meeting under `id`.
    ///
    /// An existing meeting with the same id is replaced in the index. Its
    /// members stay attached to it but it can no longer be joined.
    pub fn create_meeting(&mut self, id: &str, password: &str) -> MeetingKey {
        let key = MeetingKey(self.meetings.len());
        self.meetings.push(Meeting::new(id, password));
        if self.meeting_index.insert(id.to_string(), key).is_some() {
            tracing::warn!(meeting = %id, "Meeting id reused, previous meeting is no longer joinable");
        } else {
            tracing::info!(meeting = %id, "Meeting created");
        }
        key
    }

    /// Registers a new connection and returns the id its events are reported under.
    pub fn register_connection(&mut self, sink: SharedSink) -> SessionId {
        self.next_session += 1;
        let id = SessionId(self.next_session);
        self.sessions.insert(id, ClientSession::new(id, sink));
        tracing::debug!(session = %id, sessions = self.sessions.len(), "Session registered");
        id
    }

    /// Looks up the meeting currently reachable under `id`.
    pub fn meeting(&self, id: &str) -> Option<&Meeting> {
        self.meeting_key(id).and_then(|key| self.meeting_by_key(key))
    }

    pub fn meeting_key(&self, id: &str) -> Option<MeetingKey> {
        self.meeting_index.get(id).copied()
    }

    pub fn meeting_by_key(&self, key: MeetingKey) -> Option<&Meeting> {
        self.meetings.get(key.0)
    }

    pub(super) fn meeting_by_key_mut(&mut self, key: MeetingKey) -> Option<&mut Meeting> {
        self.meetings.get_mut(key.0)
    }

    pub fn session(&self, id: SessionId) -> Option<&ClientSession> {
        self.sessions.get(&id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of meetings reachable by id.
    pub fn meeting_count(&self) -> usize {
        self.meeting_index.len()
    }
}
