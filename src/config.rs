//! Command-line configuration.

use clap::Parser;
use std::net::SocketAddr;
use url::Url;

use crate::server::ORCHESTRATOR_PATH;

/// Relay server that keeps a meeting of Musicociel players in sync
#[derive(Parser, Clone, Debug)]
#[command(name = "musicociel-orchestrator", version, about)]
pub struct Config {
    /// Host to use for the server
    #[arg(long, env = "ORCHESTRATOR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to use for the server
    #[arg(long, env = "ORCHESTRATOR_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Meeting id
    #[arg(long, env = "ORCHESTRATOR_MEETING_ID", default_value = "privateMeeting")]
    pub meeting_id: String,

    /// Meeting password
    #[arg(
        long,
        env = "ORCHESTRATOR_MEETING_PASSWORD",
        default_value = "secret",
        hide_env_values = true
    )]
    pub meeting_password: String,
}

impl Config {
    /// Address players enter to join the configured meeting.
    pub fn meeting_url(&self, addr: SocketAddr) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!("http://{addr}{ORCHESTRATOR_PATH}"),
            [
                ("meetingId", self.meeting_id.as_str()),
                ("meetingPassword", self.meeting_password.as_str()),
            ],
        )
    }
}
