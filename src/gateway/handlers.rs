//! HTTP handlers around the WebSocket core

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use super::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Health check endpoint
///
/// GET /health -> 200 {"ok": true}
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Client bootstrap data
#[derive(Debug, Serialize)]
pub struct ClientConfigResponse {
    pub ws_url: String,
}

/// Advertised WebSocket endpoint for the browser client
///
/// GET /config -> 200 {"ws_url": "ws://<host>:<port>/ws"}
pub async fn client_config(State(state): State<Arc<AppState>>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        ws_url: state.ws_url.clone(),
    })
}
