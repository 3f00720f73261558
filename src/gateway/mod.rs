pub mod handlers;
pub mod state;

use axum::{Router, routing::get};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::websocket::ws_handler;
use state::AppState;

/// Build the gateway router
///
/// - `/ws`: transfer relay WebSocket
/// - `/health`: liveness probe
/// - `/config`: advertised WebSocket URL
/// - everything else: static files from the public directory
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.public_dir);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(handlers::health_check))
        .route("/config", get(handlers::client_config))
        .fallback_service(static_files)
        .with_state(state)
}

/// Serve the gateway on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    use anyhow::Context;

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {} (port already in use?)", addr))?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("WebSocket URL: {}", state.ws_url);
    tracing::info!(public_dir = %state.public_dir.display(), "Serving static files");

    serve(listener, state, shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
