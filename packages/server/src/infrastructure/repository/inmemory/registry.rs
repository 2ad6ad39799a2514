//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomKey, Session, Timestamp};

/// In-memory session records, one per live connection.
///
/// The whole map sits behind a single tokio mutex; every trait method
/// is one lock acquisition, so each operation is atomic with respect to
/// concurrently handled connections.
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    sessions: Mutex<HashMap<ConnectionId, Session>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, conn_id: ConnectionId, connected_at: Timestamp) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(conn_id.clone(), Session::new(conn_id, connected_at));
    }

    async fn set_name(&self, conn_id: &ConnectionId, name: String) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(conn_id) {
            session.set_name(name);
        }
    }

    async fn join_room(&self, conn_id: &ConnectionId, key: RoomKey) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(conn_id) {
            session.join(key);
        }
    }

    async fn room_of(&self, conn_id: &ConnectionId) -> Option<RoomKey> {
        let sessions = self.sessions.lock().await;
        sessions.get(conn_id).and_then(|s| s.room_key().cloned())
    }

    async fn effective_name(&self, conn_id: &ConnectionId) -> String {
        let sessions = self.sessions.lock().await;
        match sessions.get(conn_id) {
            Some(session) => session.effective_name().to_string(),
            // Stale reference after teardown: fall back to the id itself.
            None => conn_id.as_str().to_string(),
        }
    }

    async fn unregister(&self, conn_id: &ConnectionId) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(conn_id);
    }
}
