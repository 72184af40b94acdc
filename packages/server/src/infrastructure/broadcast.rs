//! Connection registry that delivers events to WebSocket clients.
//!
//! Every connection owns an unbounded channel of serialized frames; the
//! WebSocket send task drains it. Frames pushed by one publisher call arrive
//! at each client in the order they were pushed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use crate::{
    domain::{ClassroomEvent, ConnectionId, EventPublisher},
    infrastructure::dto::websocket::ServerMessage,
};

/// Outbound channel of a connection
pub struct ClientInfo {
    /// Serialized frame sender
    pub sender: mpsc::UnboundedSender<String>,
    /// Unix timestamp when connected (UTC, milliseconds)
    pub connected_at: i64,
}

/// Registry of connected clients implementing [`EventPublisher`]
#[derive(Default)]
pub struct BroadcastHub {
    clients: RwLock<HashMap<ConnectionId, ClientInfo>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return the receiving half of its channel
    pub async fn register(&self, connection_id: ConnectionId) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let info = ClientInfo {
            sender: tx,
            connected_at: kyoshitsu_shared::time::get_utc_timestamp(),
        };
        self.clients.write().await.insert(connection_id, info);
        rx
    }

    /// Remove a connection; later events for it are dropped.
    ///
    /// Returns how long the connection was registered, in milliseconds.
    pub async fn unregister(&self, connection_id: &ConnectionId) -> Option<i64> {
        let info = self.clients.write().await.remove(connection_id)?;
        Some(kyoshitsu_shared::time::get_utc_timestamp() - info.connected_at)
    }

    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    fn encode(event: &ClassroomEvent) -> Option<String> {
        match serde_json::to_string(&ServerMessage::from(event)) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!("Failed to serialize '{}' event: {}", event.name(), e);
                None
            }
        }
    }
}

#[async_trait]
impl EventPublisher for BroadcastHub {
    async fn send_to(&self, connection_id: ConnectionId, event: ClassroomEvent) {
        let clients = self.clients.read().await;
        let Some(client) = clients.get(&connection_id) else {
            tracing::debug!(
                "Dropping '{}' for disconnected client '{}'",
                event.name(),
                connection_id
            );
            return;
        };
        let Some(json) = Self::encode(&event) else {
            return;
        };
        if client.sender.send(json).is_err() {
            tracing::warn!(
                "Failed to send '{}' to client '{}'",
                event.name(),
                connection_id
            );
        }
    }

    async fn broadcast(&self, event: ClassroomEvent) {
        let Some(json) = Self::encode(&event) else {
            return;
        };
        let clients = self.clients.read().await;
        for (id, client) in clients.iter() {
            if client.sender.send(json.clone()).is_err() {
                tracing::warn!("Failed to send '{}' to client '{}'", event.name(), id);
            }
        }
        tracing::debug!(
            "Broadcasted '{}' to {} client(s)",
            event.name(),
            clients.len()
        );
    }
}
