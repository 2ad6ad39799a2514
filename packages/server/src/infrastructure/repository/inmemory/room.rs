//! InMemory RoomStore 実装
//!
//! ドメイン層が定義する RoomStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Drawing, Room, RoomKey, RoomStore, Timestamp};

/// In-memory room map.
///
/// One tokio mutex guards the whole map, so every trait method is
/// atomic with respect to concurrently handled connections; in
/// particular, remove-member and delete-room-on-empty happen under a
/// single lock acquisition.
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: Mutex<HashMap<RoomKey, Room>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn join(
        &self,
        key: &RoomKey,
        conn_id: &ConnectionId,
        created_at: Timestamp,
    ) -> (Vec<ConnectionId>, Vec<Drawing>) {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.entry(key.clone()).or_insert_with(|| {
            tracing::info!(room = %key, "creating room");
            Room::new(key.clone(), created_at)
        });
        room.add_member(conn_id.clone());
        (room.members.clone(), room.drawings.all().to_vec())
    }

    async fn remove_member(
        &self,
        key: &RoomKey,
        conn_id: &ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(key)?;
        room.remove_member(conn_id);
        if room.is_empty() {
            // No member left: the room goes away with the last one.
            rooms.remove(key);
            tracing::info!(room = %key, "room empty, deleting");
            return Some(Vec::new());
        }
        Some(room.members.clone())
    }

    async fn snapshot(&self, key: &RoomKey) -> Option<Vec<ConnectionId>> {
        let rooms = self.rooms.lock().await;
        rooms.get(key).map(|room| room.members.clone())
    }

    async fn drawings(&self, key: &RoomKey) -> Option<Vec<Drawing>> {
        let rooms = self.rooms.lock().await;
        rooms.get(key).map(|room| room.drawings.all().to_vec())
    }

    async fn append_drawing(
        &self,
        key: &RoomKey,
        user_id: &ConnectionId,
        name: String,
        at: Timestamp,
        drawing_data: serde_json::Value,
    ) -> Option<Drawing> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(key)?;
        Some(room.drawings.append(user_id.clone(), name, at, drawing_data))
    }

    async fn remove_drawing(&self, key: &RoomKey, drawing_id: u64) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(key) {
            Some(room) => {
                room.drawings.remove(drawing_id);
                true
            }
            None => false,
        }
    }

    async fn clear_drawings(&self, key: &RoomKey) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(key) {
            Some(room) => {
                room.drawings.clear();
                true
            }
            None => false,
        }
    }

    async fn get_room(&self, key: &RoomKey) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(key).cloned()
    }

    async fn all_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn key(k: &str) -> RoomKey {
        RoomKey::new(k.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_creates_room_lazily_without_resetting_it() {
        // given (前提条件):
        let store = InMemoryRoomStore::new();
        assert_eq!(store.snapshot(&key("42")).await, None);

        // when (操作): two joins with different creation timestamps
        let (members, drawings) = store.join(&key("42"), &conn("a"), Timestamp::new(1)).await;
        assert_eq!(members, vec![conn("a")]);
        assert!(drawings.is_empty());
        let (members, _) = store.join(&key("42"), &conn("b"), Timestamp::new(2)).await;

        // then (期待する結果): second join appended to the existing room
        assert_eq!(members, vec![conn("a"), conn("b")]);
        let room = store.get_room(&key("42")).await.unwrap();
        assert_eq!(room.created_at, Timestamp::new(1));
    }

    #[tokio::test]
    async fn test_join_twice_appends_twice() {
        // given (前提条件):
        let store = InMemoryRoomStore::new();

        // when (操作): the same connection joins the same room twice
        store.join(&key("42"), &conn("a"), Timestamp::new(0)).await;
        let (members, _) = store.join(&key("42"), &conn("a"), Timestamp::new(0)).await;

        // then (期待する結果): duplicates are not checked
        assert_eq!(members, vec![conn("a"), conn("a")]);
    }

    #[tokio::test]
    async fn test_remove_member_deletes_room_when_empty() {
        // given (前提条件): a room with a single member
        let store = InMemoryRoomStore::new();
        store.join(&key("42"), &conn("a"), Timestamp::new(0)).await;

        // when (操作):
        let remaining = store.remove_member(&key("42"), &conn("a")).await;

        // then (期待する結果): empty remainder reported, room gone from the
        // store (absent, not merely empty)
        assert_eq!(remaining, Some(Vec::new()));
        assert_eq!(store.snapshot(&key("42")).await, None);
        assert!(store.all_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_member_keeps_room_with_remaining_members() {
        // given (前提条件):
        let store = InMemoryRoomStore::new();
        store.join(&key("42"), &conn("a"), Timestamp::new(0)).await;
        store.join(&key("42"), &conn("b"), Timestamp::new(0)).await;

        // when (操作):
        let remaining = store.remove_member(&key("42"), &conn("a")).await;

        // then (期待する結果):
        assert_eq!(remaining, Some(vec![conn("b")]));
        assert_eq!(store.snapshot(&key("42")).await, Some(vec![conn("b")]));
    }

    #[tokio::test]
    async fn test_remove_member_on_missing_room_is_noop() {
        // given (前提条件):
        let store = InMemoryRoomStore::new();

        // when (操作):
        let remaining = store.remove_member(&key("42"), &conn("a")).await;

        // then (期待する結果):
        assert_eq!(remaining, None);
    }

    #[tokio::test]
    async fn test_drawing_operations_on_missing_room_are_noops() {
        // given (前提条件): an empty store
        let store = InMemoryRoomStore::new();

        // then (期待する結果): every drawing operation degrades silently
        assert_eq!(store.drawings(&key("7")).await, None);
        assert_eq!(
            store
                .append_drawing(
                    &key("7"),
                    &conn("a"),
                    "a".to_string(),
                    Timestamp::new(0),
                    json!(1)
                )
                .await,
            None
        );
        assert!(!store.remove_drawing(&key("7"), 0).await);
        assert!(!store.clear_drawings(&key("7")).await);
    }

    #[tokio::test]
    async fn test_append_and_remove_drawing_round_trip() {
        // given (前提条件):
        let store = InMemoryRoomStore::new();
        store.join(&key("7"), &conn("a"), Timestamp::new(0)).await;

        // when (操作):
        let d = store
            .append_drawing(
                &key("7"),
                &conn("a"),
                "alice".to_string(),
                Timestamp::new(5),
                json!({ "x": 1 }),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(d.drawing_id, 0);
        assert_eq!(store.drawings(&key("7")).await.unwrap().len(), 1);

        // when (操作): remove an id that is not there
        assert!(store.remove_drawing(&key("7"), 99).await);
        assert_eq!(store.drawings(&key("7")).await.unwrap().len(), 1);

        // when (操作): remove the real one
        assert!(store.remove_drawing(&key("7"), 0).await);
        assert!(store.drawings(&key("7")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_joins_lose_no_members() {
        // given (前提条件): many tasks joining the same room key
        use std::sync::Arc;
        let store = Arc::new(InMemoryRoomStore::new());
        let n = 32;

        // when (操作): all joins race on the same key
        let mut handles = Vec::new();
        for i in 0..n {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .join(&key("42"), &conn(&format!("sid-{i}")), Timestamp::new(0))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果): exactly the n distinct members, none lost
        let members = store.snapshot(&key("42")).await.unwrap();
        assert_eq!(members.len(), n);
        let mut ids: Vec<String> = members.into_iter().map(|c| c.into_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[tokio::test]
    async fn test_join_survives_concurrent_last_member_leave() {
        // given (前提条件): repeated races between the last member leaving
        // (which deletes the room) and a fresh join on the same key
        use std::sync::Arc;
        let store = Arc::new(InMemoryRoomStore::new());

        for round in 0..64 {
            let k = key("42");
            store.join(&k, &conn("old"), Timestamp::new(round)).await;

            let joiner = {
                let store = store.clone();
                tokio::spawn(async move {
                    store.join(&key("42"), &conn("new"), Timestamp::new(round)).await
                })
            };
            let leaver = {
                let store = store.clone();
                tokio::spawn(
                    async move { store.remove_member(&key("42"), &conn("old")).await },
                )
            };

            // when (操作): both orders of the race
            let (members, _) = joiner.await.unwrap();
            leaver.await.unwrap();

            // then (期待する結果): the join reported "new" as a member, and
            // whichever side won the lock, the room still holds "new"
            assert!(members.contains(&conn("new")));
            let after = store.snapshot(&key("42")).await;
            assert_eq!(after, Some(vec![conn("new")]), "round {round}");

            store.remove_member(&key("42"), &conn("new")).await;
        }
    }
}
