//! Health check endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Meetings reachable by id.
    pub meetings: usize,
    /// Live connections, joined or not.
    pub sessions: usize,
    pub started_at: String,
    pub timestamp: String,
}

/// GET /health - Liveness plus registry counts
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let (meetings, sessions) = state
        .with_registry(|registry| (registry.meeting_count(), registry.session_count()))
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(HealthResponse {
        status: "ok",
        meetings,
        sessions,
        started_at: state.started_at.to_rfc3339(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
