//! Musicociel orchestrator server.
//!
//! Creates the configured meeting, then relays song and position changes
//! between players connected over WebSocket.

use clap::Parser;
use musicociel_orchestrator::config::Config;
use musicociel_orchestrator::relay::{self, Registry};
use musicociel_orchestrator::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("musicociel_orchestrator=info")
            }),
        )
        .init();

    let mut registry = Registry::new();
    registry.create_meeting(&config.meeting_id, &config.meeting_password);
    let registry = relay::shared(registry);

    let (listener, addr) = server::bind(&config.host, config.port).await?;
    tracing::info!(%addr, "Relay server listening");

    println!("Listening on {addr}");
    let meeting_url = config.meeting_url(addr)?;
    println!(
        "Enter the following address in Musicociel to orchestrate multiple clients: {meeting_url}"
    );

    server::serve(listener, registry, shutdown_signal()).await?;

    tracing::info!("Relay server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
