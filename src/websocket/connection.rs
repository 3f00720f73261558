//! WebSocket connection manager
//!
//! Tracks the open-set of client connections using DashMap for concurrent
//! access. Each entry is the sending half of the connection's outbound
//! channel; the socket itself belongs to the handler task.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::messages::ServerMessage;
use crate::core_types::ConnectionId;

/// WebSocket sender channel type
pub type WsSender = mpsc::UnboundedSender<ServerMessage>;

/// WebSocket connection manager
///
/// The registry never closes connections. It forgets them when the handler
/// reports a close, or when a send fails (treated as an implicit close).
pub struct ConnectionManager {
    /// connection_id -> outbound sender
    connections: DashMap<ConnectionId, WsSender>,
    /// Next connection ID
    next_conn_id: AtomicU64,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Register an open connection and return its ID.
    pub fn add_connection(&self, tx: WsSender) -> ConnectionId {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.connections.insert(conn_id, tx);

        tracing::info!(
            conn_id,
            open_connections = self.connections.len(),
            "WebSocket connection added"
        );

        conn_id
    }

    /// Remove a connection by ID. Idempotent; returns whether it was present.
    pub fn remove_connection(&self, conn_id: ConnectionId) -> bool {
        let removed = self.connections.remove(&conn_id).is_some();
        if removed {
            tracing::info!(
                conn_id,
                open_connections = self.connections.len(),
                "WebSocket connection removed"
            );
        }
        removed
    }

    /// Send a message to one connection only.
    ///
    /// Returns false if the connection is unknown or already gone.
    pub fn send_to(&self, conn_id: ConnectionId, message: ServerMessage) -> bool {
        let Some(tx) = self.connections.get(&conn_id).map(|entry| entry.value().clone()) else {
            tracing::debug!(conn_id, "Unicast to unknown connection dropped");
            return false;
        };

        if tx.send(message).is_err() {
            tracing::warn!(conn_id, "Failed to send - client disconnected");
            self.remove_connection(conn_id);
            return false;
        }
        true
    }

    /// Send a message to every open connection.
    ///
    /// Iterates a snapshot taken up front, so no map lock is held while
    /// sending. Connections whose channel is already closed are skipped
    /// and left for the handler to remove. A failed send drops that
    /// recipient and moves on to the next one.
    ///
    /// Returns the number of connections the message was delivered to.
    pub fn broadcast(&self, message: &ServerMessage) -> usize {
        let recipients: Vec<(ConnectionId, WsSender)> = self
            .connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        let mut skipped = 0;
        for (conn_id, tx) in recipients {
            if tx.is_closed() {
                skipped += 1;
                continue;
            }
            if tx.send(message.clone()).is_err() {
                tracing::warn!(conn_id, "Broadcast delivery failed - dropping connection");
                self.remove_connection(conn_id);
                continue;
            }
            delivered += 1;
        }

        tracing::debug!(delivered, skipped, "Broadcast sent");
        delivered
    }

    /// Number of connections in the open-set
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, conn_id: ConnectionId) -> bool {
        self.connections.contains_key(&conn_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
