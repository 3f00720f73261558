use std::path::PathBuf;
use std::sync::Arc;

use crate::websocket::{Broadcaster, ConnectionManager};

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Registry + dispatcher for `/ws`
    pub broadcaster: Arc<Broadcaster>,
    /// WebSocket URL advertised to browser clients
    pub ws_url: String,
    /// Directory served at `/`
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn new(ws_url: impl Into<String>, public_dir: impl Into<PathBuf>) -> Self {
        let manager = Arc::new(ConnectionManager::new());
        Self {
            broadcaster: Arc::new(Broadcaster::new(manager)),
            ws_url: ws_url.into(),
            public_dir: public_dir.into(),
        }
    }
}
