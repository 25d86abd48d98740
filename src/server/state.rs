//! Shared application state for the HTTP server.

use chrono::{DateTime, Utc};

use crate::relay::{Registry, SessionId, SharedRegistry, SharedSink};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Meetings and live sessions.
    pub registry: SharedRegistry,
    /// When the server started accepting connections.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates new app state around an already populated registry.
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            started_at: Utc::now(),
        }
    }

    /// Runs `f` with exclusive access to the registry.
    ///
    /// Returns `None` if a previous holder panicked while holding the lock.
    pub fn with_registry<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> Option<R> {
        let Ok(mut registry) = self.registry.lock() else {
            tracing::error!("Registry lock poisoned");
            return None;
        };
        Some(f(&mut registry))
    }

    /// Registers a new connection whose outbound frames go to `sink`.
    pub fn connect(&self, sink: SharedSink) -> Option<SessionId> {
        self.with_registry(|registry| registry.register_connection(sink))
    }

    /// Hands a received text frame to the session's handler.
    pub fn on_frame(&self, session: SessionId, raw: &str) {
        self.with_registry(|registry| registry.on_frame(session, raw));
    }

    /// Deregisters a closed connection.
    pub fn on_close(&self, session: SessionId) {
        self.with_registry(|registry| registry.on_close(session));
    }
}
