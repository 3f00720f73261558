//! tx_relay - Real-time transfer relay
//!
//! Clients connect over WebSocket, submit transfer intents, and every
//! accepted intent is stamped with a transaction id and pushed to all
//! connected clients as a CSV row.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (ConnectionId, SeqNum)
//! - [`record`] - Record Formatter and the sequence counter
//! - [`websocket`] - Connection registry, broadcast dispatcher, `/ws` handler
//! - [`gateway`] - HTTP router (`/ws`, `/health`, `/config`, static files)
//! - [`config`] - YAML + environment configuration
//! - [`logging`] - tracing subscriber setup

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod gateway;
pub mod logging;
pub mod record;
pub mod websocket;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use core_types::{ConnectionId, SeqNum};
pub use record::{Record, RecordFormatter, TransferRequest};
pub use websocket::{Broadcaster, ClientMessage, ConnectionManager, RelayError, ServerMessage};
