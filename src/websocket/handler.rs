//! WebSocket handler for client connections
//!
//! Handles WebSocket upgrade, connection lifecycle, and message forwarding.
//! Each socket gets a writer task (channel → socket) and a reader task
//! (socket → [`Broadcaster`]); whichever finishes first tears down the other.

use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::broadcaster::Broadcaster;
use super::messages::ServerMessage;
use crate::gateway::state::AppState;

/// WebSocket upgrade handler
///
/// Endpoint: GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

/// Handle WebSocket connection lifecycle
async fn handle_socket(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let conn_id = broadcaster.on_open(tx);

    // Forward messages from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(conn_id, error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let inbound = broadcaster.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    inbound.on_message(conn_id, text.as_str());
                }
                Message::Binary(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    inbound.on_message(conn_id, &text);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    broadcaster.on_close(conn_id);
}
