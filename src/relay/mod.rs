//! In-memory meeting relay.
//!
//! Provides the registry of meetings and connected sessions, the join
//! protocol, and fan-out of song/position changes to meeting members.

pub mod channel;
pub mod meeting;
pub mod protocol;
pub mod registry;
pub mod session;

pub use channel::*;
pub use meeting::*;
pub use protocol::*;
pub use registry::*;
pub use session::*;

use std::sync::{Arc, Mutex};

/// Registry shared between connection tasks.
///
/// Every connect, frame, and close event takes the lock once, so events
/// are applied one at a time.
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Wraps a registry for sharing across connection tasks.
pub fn shared(registry: Registry) -> SharedRegistry {
    Arc::new(Mutex::new(registry))
}
