//! Repository traits owned by the domain layer.
//!
//! The usecase layer depends on these traits, not on the in-memory
//! implementations in the infrastructure layer (dependency inversion).
//!
//! Failure semantics follow the silent-drop policy: operations on a
//! room key that is not in the store are no-ops signalled through
//! `Option`/`bool` return values, never through errors.

use async_trait::async_trait;

use super::{
    entity::{Drawing, Room},
    value_object::{ConnectionId, RoomKey, Timestamp},
};

/// Per-connection session records: display name and current room.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Create an empty session record. Must be called exactly once per
    /// connection, before any other operation referencing the id.
    async fn register(&self, conn_id: ConnectionId, connected_at: Timestamp);

    /// Set the display name unconditionally (last write wins).
    async fn set_name(&self, conn_id: &ConnectionId, name: String);

    /// Record that the connection entered the room. The key has already
    /// been validated by construction of [`RoomKey`].
    async fn join_room(&self, conn_id: &ConnectionId, key: RoomKey);

    /// The room the connection is currently in, if any.
    async fn room_of(&self, conn_id: &ConnectionId) -> Option<RoomKey>;

    /// The display name shown for the connection: the submitted name,
    /// or the connection id itself until a name is submitted.
    async fn effective_name(&self, conn_id: &ConnectionId) -> String;

    /// Remove the session record. Must be the last operation for the id.
    async fn unregister(&self, conn_id: &ConnectionId);
}

/// Rooms keyed by [`RoomKey`]: member lists plus per-room drawing logs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Join the room: create it if it does not exist yet, append the
    /// connection to its member list (duplicates are not checked) and
    /// return the member list plus the drawing log as of the join.
    /// One critical section, so a concurrent leave can never observe
    /// the room between creation and the append, and the join can
    /// never be lost to a concurrent delete-on-empty. Never fails.
    async fn join(
        &self,
        key: &RoomKey,
        conn_id: &ConnectionId,
        created_at: Timestamp,
    ) -> (Vec<ConnectionId>, Vec<Drawing>);

    /// Remove the first occurrence of the member and return the
    /// remaining member list. When the list empties, the room is
    /// deleted from the store within the same operation. Returns `None`
    /// when the room is not in the store.
    async fn remove_member(
        &self,
        key: &RoomKey,
        conn_id: &ConnectionId,
    ) -> Option<Vec<ConnectionId>>;

    /// The current member list, or `None` when the room is not in the
    /// store.
    async fn snapshot(&self, key: &RoomKey) -> Option<Vec<ConnectionId>>;

    /// The full ordered drawing log, or `None` when the room is not in
    /// the store.
    async fn drawings(&self, key: &RoomKey) -> Option<Vec<Drawing>>;

    /// Append a drawing and return the stored record with its assigned
    /// id, or `None` when the room is not in the store.
    async fn append_drawing(
        &self,
        key: &RoomKey,
        user_id: &ConnectionId,
        name: String,
        at: Timestamp,
        drawing_data: serde_json::Value,
    ) -> Option<Drawing>;

    /// Delete all drawings matching the id (at most one in practice).
    /// Returns whether the room exists; removal of a non-existent id is
    /// not an error and still reports `true`.
    async fn remove_drawing(&self, key: &RoomKey, drawing_id: u64) -> bool;

    /// Empty the room's drawing log. Returns whether the room exists.
    async fn clear_drawings(&self, key: &RoomKey) -> bool;

    /// Full snapshot of one room, for the debug endpoints.
    async fn get_room(&self, key: &RoomKey) -> Option<Room>;

    /// Full snapshot of every live room, for the debug endpoints.
    async fn all_rooms(&self) -> Vec<Room>;
}
