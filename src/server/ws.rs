//! WebSocket transport for relay sessions.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::relay::Frame;
use crate::server::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an individual WebSocket connection.
///
/// The session's outbound queue is drained by a writer task; inbound text
/// frames are applied to the registry in arrival order.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();

    let Some(session) = state.connect(Arc::new(tx)) else {
        return;
    };
    tracing::info!(session = %session, "WebSocket connection opened");

    // Forward queued frames to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(frame.to_string())).await {
                tracing::debug!(session = %session, ?e, "WebSocket write failed");
                break;
            }
        }
    });

    let recv_state = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => recv_state.on_frame(session, &text),
                Message::Binary(data) => {
                    tracing::debug!(session = %session, len = data.len(), "Ignoring binary frame");
                }
                Message::Close(_) => break,
                // Pong is handled automatically by axum
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.on_close(session);
    tracing::info!(session = %session, "WebSocket connection closed");
}
