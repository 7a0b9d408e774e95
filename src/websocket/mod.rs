//! Device pairing channel
//!
//! Each mobile device connects with a self-declared device id and holds
//! at most one live mapping in the registry; a reconnect replaces the
//! prior one. Pushes are fire-and-forget over a per-connection channel.
//! Device ids are not bound to an authenticated principal (known trust
//! gap, kept for behavioral fidelity).

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Messages pushed to a paired device
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage {
    #[serde(rename = "FACE_REQUEST")]
    #[serde(rename_all = "camelCase")]
    FaceRequest {
        challenge_id: String,
        user_id: String,
        message: String,
    },
}

/// One live connection for a device id.
#[derive(Debug, Clone)]
struct DeviceConnection {
    connection_id: Uuid,
    tx: mpsc::UnboundedSender<DeviceMessage>,
}

/// Registry of live device connections, keyed by device id.
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    inner: Arc<RwLock<HashMap<String, DeviceConnection>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a device id to a connection, replacing any existing mapping
    /// (last-connect-wins).
    pub async fn register(
        &self,
        device_id: &str,
        connection_id: Uuid,
        tx: mpsc::UnboundedSender<DeviceMessage>,
    ) {
        let mut connections = self.inner.write().await;
        connections.insert(device_id.to_string(), DeviceConnection { connection_id, tx });
        tracing::info!(device_id = %device_id, "Device connected");
    }

    /// Remove the mapping only if it still points at this connection, so
    /// a stale disconnect cannot evict a newer connection for the id.
    pub async fn unregister(&self, device_id: &str, connection_id: Uuid) {
        let mut connections = self.inner.write().await;
        if connections
            .get(device_id)
            .map(|c| c.connection_id == connection_id)
            .unwrap_or(false)
        {
            connections.remove(device_id);
            tracing::info!(device_id = %device_id, "Device disconnected");
        }
    }

    /// Push a message to a device. Returns false when no live connection
    /// exists or its channel is closed; never blocks, never retries.
    pub async fn push(&self, device_id: &str, message: DeviceMessage) -> bool {
        let connections = self.inner.read().await;
        match connections.get(device_id) {
            Some(connection) => connection.tx.send(message).is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingQuery {
    pub device_id: Option<String>,
}

/// WebSocket handler - upgrades the pairing connection
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<PairingQuery>,
    State(registry): State<DeviceRegistry>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry, query.device_id))
}

/// Drive one device connection until either side drops it.
async fn handle_socket(socket: WebSocket, registry: DeviceRegistry, device_id: Option<String>) {
    let Some(device_id) = device_id.filter(|id| !id.is_empty()) else {
        tracing::warn!("Pairing connection without a device id, closing");
        return;
    };

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register(&device_id, connection_id, tx).await;

    let (mut sender, mut receiver) = socket.split();

    // Forward queued pushes out to the device.
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to encode device message"),
            }
        }
    });

    // Drain the inbound side; the protocol defines no client messages.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    registry.unregister(&device_id, connection_id).await;
}
