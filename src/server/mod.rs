//! HTTP server module for the relay WebSocket and health endpoints.
//!
//! Accepts raw connections, upgrades them to WebSockets, and feeds their
//! frames into the shared registry.

pub mod routes;
pub mod state;
pub mod ws;

use crate::relay::SharedRegistry;
use crate::server::routes::health;
use crate::server::state::AppState;
use crate::server::ws::ws_handler;

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Path players connect to.
pub const ORCHESTRATOR_PATH: &str = "/orchestrator";

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Builds the router over the given registry.
pub fn build_router(registry: SharedRegistry) -> Router {
    let state = Arc::new(AppState::new(registry));

    // CORS layer for browser players
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // WebSocket
        .route(ORCHESTRATOR_PATH, get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Binds the listener for `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<(TcpListener, SocketAddr), ServerError> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr().map_err(ServerError::LocalAddr)?;
    Ok((listener, local))
}

/// Serves the relay until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    registry: SharedRegistry,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let app = build_router(registry);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}
