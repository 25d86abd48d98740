//! Musicociel orchestrator: keeps a meeting of music players on the same
//! song and playback position.

pub mod config;
pub mod relay;
pub mod server;
