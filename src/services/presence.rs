//! Process-local record of which users hold a live socket

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound side of one bound socket
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: Uuid,
    pub tx: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// New handle plus the receiver the socket writer drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }
}

/// Presence store. A single-instance deployment uses [`InMemoryPresence`];
/// several instances need a shared implementation.
pub trait PresenceService: Send + Sync {
    fn bind(&self, user_id: i64, handle: ConnectionHandle);
    /// Drop the binding only if it still belongs to `connection_id`
    fn unbind(&self, user_id: i64, connection_id: Uuid);
    fn is_online(&self, user_id: i64) -> bool;
    /// Push a frame to the user's socket; false when not bound or the socket is gone
    fn deliver(&self, user_id: i64, frame: String) -> bool;
    fn online_users(&self) -> Vec<i64>;
}

#[derive(Default)]
pub struct InMemoryPresence {
    connections: RwLock<HashMap<i64, ConnectionHandle>>,
}

impl InMemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresenceService for InMemoryPresence {
    fn bind(&self, user_id: i64, handle: ConnectionHandle) {
        // Newest connection wins
        let previous = self.connections.write().insert(user_id, handle);
        if previous.is_some() {
            tracing::debug!(user_id, "Replaced existing socket binding");
        }
    }

    fn unbind(&self, user_id: i64, connection_id: Uuid) {
        let mut connections = self.connections.write();
        if connections
            .get(&user_id)
            .is_some_and(|h| h.id == connection_id)
        {
            connections.remove(&user_id);
        }
    }

    fn is_online(&self, user_id: i64) -> bool {
        self.connections.read().contains_key(&user_id)
    }

    fn deliver(&self, user_id: i64, frame: String) -> bool {
        let handle = self.connections.read().get(&user_id).cloned();
        match handle {
            Some(handle) => {
                if handle.tx.send(frame).is_ok() {
                    true
                } else {
                    self.unbind(user_id, handle.id);
                    false
                }
            }
            None => false,
        }
    }

    fn online_users(&self) -> Vec<i64> {
        let mut users: Vec<i64> = self.connections.read().keys().copied().collect();
        users.sort_unstable();
        users
    }
}
