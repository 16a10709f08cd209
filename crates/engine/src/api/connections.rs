//! Connection management for WebSocket clients.
//!
//! Tracks connected clients and their game associations. This registry is
//! an explicit per-process object injected into the handlers, never
//! ambient state.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use nightshade_domain::GameCode;
use nightshade_shared::ServerMessage;

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    /// The game this connection has joined (if any)
    pub code: Option<GameCode>,
    /// The seat this connection occupies (if joined)
    pub username: Option<String>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    pub async fn register(&self, connection_id: Uuid, sender: mpsc::Sender<ServerMessage>) {
        let info = ConnectionInfo {
            connection_id,
            code: None,
            username: None,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection. A player disconnecting does not cancel
    /// their pending action or vote; those live in the game aggregate.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections
            .get(&connection_id)
            .map(|(info, _)| info.clone())
    }

    /// Associate a connection with a seat in a game. A reconnecting player
    /// may reclaim their username; two live connections may not share one.
    pub async fn join_game(
        &self,
        connection_id: Uuid,
        code: GameCode,
        username: String,
    ) -> Result<(), ConnectionError> {
        let mut connections = self.connections.write().await;

        for (id, (info, _)) in connections.iter() {
            if *id != connection_id
                && info.code.as_ref() == Some(&code)
                && info.username.as_deref() == Some(username.as_str())
            {
                return Err(ConnectionError::UsernameTaken);
            }
        }

        if let Some((info, _)) = connections.get_mut(&connection_id) {
            info.code = Some(code.clone());
            info.username = Some(username.clone());
            tracing::info!(
                connection_id = %connection_id,
                code = %code,
                username = %username,
                "Connection joined game"
            );
            Ok(())
        } else {
            Err(ConnectionError::NotFound)
        }
    }

    /// All usernames currently seated in a game.
    pub async fn usernames_in(&self, code: &GameCode) -> Vec<String> {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|(info, _)| info.code.as_ref() == Some(code))
            .filter_map(|(info, _)| info.username.clone())
            .collect()
    }

    /// Broadcast a message to all connections in a game.
    pub async fn broadcast_to_game(&self, code: &GameCode, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.code.as_ref() == Some(code) {
                if let Err(e) = sender.try_send(message.clone()) {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to broadcast message"
                    );
                }
            }
        }
    }

    /// Send a private message to one seat in a game.
    pub async fn send_to_player(&self, code: &GameCode, username: &str, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.code.as_ref() == Some(code) && info.username.as_deref() == Some(username) {
                if let Err(e) = sender.try_send(message.clone()) {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to send private message"
                    );
                }
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
    #[error("Username already connected in this game")]
    UsernameTaken,
}
