//! WebSocket module: connection registry and broadcast dispatcher
//!
//! Clients submit transfer intents over `/ws`; accepted ones are stamped
//! and pushed to every connected client as CSV rows.

pub mod broadcaster;
pub mod connection;
pub mod error;
pub mod handler;
pub mod messages;

pub use broadcaster::Broadcaster;
pub use connection::{ConnectionManager, WsSender};
pub use error::RelayError;
pub use handler::ws_handler;
pub use messages::{ClientMessage, ServerMessage, TxPayload};
