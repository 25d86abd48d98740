//! Outbound side of a client's message channel.

use std::sync::Arc;
use tokio::sync::mpsc;

/// One serialized text frame.
///
/// Broadcasts serialize once and hand the same allocation to every member.
pub type Frame = Arc<str>;

/// Errors that can occur when writing to a channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,
}

/// Write half of a client connection.
///
/// Writes are fire-and-forget: they must not block and give no guarantee
/// of remote receipt.
pub trait FrameSink: Send + Sync {
    fn send_frame(&self, frame: Frame) -> Result<(), ChannelError>;
}

/// Queue drained by the connection's writer task.
impl FrameSink for mpsc::UnboundedSender<Frame> {
    fn send_frame(&self, frame: Frame) -> Result<(), ChannelError> {
        self.send(frame).map_err(|_| ChannelError::Closed)
    }
}

/// Shared handle to a sink, held by the session and by its meeting.
pub type SharedSink = Arc<dyn FrameSink>;
