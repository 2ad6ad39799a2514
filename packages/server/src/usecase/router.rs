//! UseCase: inbound event dispatch.
//!
//! [`EventRouter`] turns one inbound event into state mutations on the
//! stores plus a list of outbound deliveries. It never touches the
//! transport: recipients are concrete connection ids and the caller
//! decides how to deliver to them, which keeps the whole state machine
//! unit-testable without a socket.
//!
//! Failure policy: invalid input (non-numeric room key) and stale
//! references (room already torn down) degrade to an empty outbound
//! list, never to an error. Validation happens here, before any
//! mutation; the store operations themselves are total.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, ConnectionRegistry, RoomKey, RoomStore, Timestamp},
    infrastructure::dto::websocket::{
        ChatBroadcast, ClientEvent, CursorBroadcast, DrawingDto, RoomKeyPayload, ServerEvent,
        VideoBroadcast,
    },
};
use kokuban_shared::time::{now_unix_millis, unix_millis_to_rfc3339};

/// Who receives one outbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipients {
    /// A single connection (e.g. the drawing log sent to a joiner)
    One(ConnectionId),
    /// An explicit set of connections, computed under the store locks
    Many(Vec<ConnectionId>),
}

/// One outbound delivery the transport layer must perform.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipients: Recipients,
    pub event: ServerEvent,
}

impl Outbound {
    fn to_one(conn_id: ConnectionId, event: ServerEvent) -> Self {
        Self {
            recipients: Recipients::One(conn_id),
            event,
        }
    }

    fn to_many(conn_ids: Vec<ConnectionId>, event: ServerEvent) -> Self {
        Self {
            recipients: Recipients::Many(conn_ids),
            event,
        }
    }
}

/// Translates inbound events into store mutations and broadcasts.
pub struct EventRouter {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomStore>,
}

impl EventRouter {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, rooms: Arc<dyn RoomStore>) -> Self {
        Self { registry, rooms }
    }

    /// Connection lifecycle start: create the empty session record.
    /// Called exactly once per connection, before any [`handle`] call.
    ///
    /// [`handle`]: EventRouter::handle
    pub async fn connect(&self, conn_id: &ConnectionId) {
        tracing::debug!(conn = %conn_id, "client connected");
        self.registry
            .register(conn_id.clone(), Timestamp::new(now_unix_millis()))
            .await;
    }

    /// Dispatch one inbound event for a connection.
    pub async fn handle(&self, conn_id: &ConnectionId, event: ClientEvent) -> Vec<Outbound> {
        match event {
            ClientEvent::RoomId(payload) => self.join_room(conn_id, payload).await,
            ClientEvent::SubmitName(name) => self.submit_name(conn_id, name).await,
            ClientEvent::ChatMessage(text) => self.chat_message(conn_id, text).await,
            ClientEvent::CursorStart(data) => self.cursor(conn_id, data, CursorKind::Start).await,
            ClientEvent::UpdateCursor(data) => self.cursor(conn_id, data, CursorKind::Update).await,
            ClientEvent::AddDrawing(data) => self.add_drawing(conn_id, data).await,
            ClientEvent::RemoveDrawing(drawing_id) => {
                self.remove_drawing(conn_id, drawing_id).await
            }
            ClientEvent::ClearAll => self.clear_all(conn_id).await,
            ClientEvent::VideoData(frame) => self.video_data(conn_id, frame).await,
        }
    }

    /// Connection lifecycle end: leave the current room (deleting it if
    /// it empties), tear the session down, and notify the remaining
    /// members.
    pub async fn disconnect(&self, conn_id: &ConnectionId) -> Vec<Outbound> {
        tracing::debug!(conn = %conn_id, "client disconnected");
        let mut outbound = Vec::new();
        if let Some(key) = self.registry.room_of(conn_id).await
            && let Some(remaining) = self.rooms.remove_member(&key, conn_id).await
            && !remaining.is_empty()
        {
            outbound.push(Outbound::to_many(
                remaining.clone(),
                ServerEvent::Users(id_strings(&remaining)),
            ));
        }
        self.registry.unregister(conn_id).await;
        outbound
    }

    async fn join_room(&self, conn_id: &ConnectionId, payload: RoomKeyPayload) -> Vec<Outbound> {
        let raw = payload.into_key_string();
        let key = match RoomKey::new(raw) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(conn = %conn_id, error = %e, "rejecting join request");
                return Vec::new();
            }
        };

        // The store joins atomically: a concurrent delete-on-empty can
        // order before (fresh room) or after (appended member) this
        // call, but never drop the joiner. Registry membership is only
        // recorded once the append has happened.
        let (members, drawings) = self
            .rooms
            .join(&key, conn_id, Timestamp::new(now_unix_millis()))
            .await;
        self.registry.join_room(conn_id, key.clone()).await;
        tracing::info!(conn = %conn_id, room = %key, "joined room");

        vec![
            Outbound::to_many(members.clone(), ServerEvent::Users(id_strings(&members))),
            Outbound::to_one(
                conn_id.clone(),
                ServerEvent::InitDrawings(drawings.into_iter().map(DrawingDto::from).collect()),
            ),
        ]
    }

    async fn submit_name(&self, conn_id: &ConnectionId, name: String) -> Vec<Outbound> {
        self.registry.set_name(conn_id, name).await;

        // The member-list broadcast only happens once the connection is
        // in a live room; the name itself is kept either way.
        let Some(key) = self.registry.room_of(conn_id).await else {
            return Vec::new();
        };
        let Some(members) = self.rooms.snapshot(&key).await else {
            return Vec::new();
        };
        vec![Outbound::to_many(
            members.clone(),
            ServerEvent::Users(id_strings(&members)),
        )]
    }

    async fn chat_message(&self, conn_id: &ConnectionId, text: String) -> Vec<Outbound> {
        let Some(members) = self.room_members(conn_id).await else {
            tracing::debug!(conn = %conn_id, "dropping chat message from roomless connection");
            return Vec::new();
        };
        let name = self.registry.effective_name(conn_id).await;
        vec![Outbound::to_many(
            members,
            ServerEvent::ChatMessage(ChatBroadcast {
                time: unix_millis_to_rfc3339(now_unix_millis()),
                name,
                data: text,
            }),
        )]
    }

    async fn cursor(
        &self,
        conn_id: &ConnectionId,
        data: serde_json::Value,
        kind: CursorKind,
    ) -> Vec<Outbound> {
        let Some(members) = self.room_members(conn_id).await else {
            return Vec::new();
        };
        // Cursor relays go to everyone but the sender; the sender is
        // already rendering its own cursor locally.
        let others: Vec<ConnectionId> = members.into_iter().filter(|m| m != conn_id).collect();
        let name = self.registry.effective_name(conn_id).await;
        let broadcast = CursorBroadcast {
            name,
            drawing_data: data,
        };
        let event = match kind {
            CursorKind::Start => ServerEvent::CursorStart(broadcast),
            CursorKind::Update => ServerEvent::UpdateCursor(broadcast),
        };
        vec![Outbound::to_many(others, event)]
    }

    async fn add_drawing(&self, conn_id: &ConnectionId, data: serde_json::Value) -> Vec<Outbound> {
        let Some(key) = self.registry.room_of(conn_id).await else {
            return Vec::new();
        };
        let name = self.registry.effective_name(conn_id).await;
        let Some(drawing) = self
            .rooms
            .append_drawing(
                &key,
                conn_id,
                name,
                Timestamp::new(now_unix_millis()),
                data,
            )
            .await
        else {
            tracing::debug!(conn = %conn_id, room = %key, "dropping drawing for missing room");
            return Vec::new();
        };
        let members = self.rooms.snapshot(&key).await.unwrap_or_default();
        vec![Outbound::to_many(
            members,
            ServerEvent::AddDrawing(DrawingDto::from(drawing)),
        )]
    }

    async fn remove_drawing(&self, conn_id: &ConnectionId, drawing_id: u64) -> Vec<Outbound> {
        let Some(key) = self.registry.room_of(conn_id).await else {
            return Vec::new();
        };
        if !self.rooms.remove_drawing(&key, drawing_id).await {
            return Vec::new();
        }
        // The removal id is broadcast whether or not anything matched.
        let members = self.rooms.snapshot(&key).await.unwrap_or_default();
        vec![Outbound::to_many(
            members,
            ServerEvent::RemoveDrawing(drawing_id),
        )]
    }

    async fn clear_all(&self, conn_id: &ConnectionId) -> Vec<Outbound> {
        let Some(key) = self.registry.room_of(conn_id).await else {
            return Vec::new();
        };
        tracing::debug!(conn = %conn_id, room = %key, "clearing drawings");
        if !self.rooms.clear_drawings(&key).await {
            return Vec::new();
        }
        // Broadcast even when the log was already empty.
        let members = self.rooms.snapshot(&key).await.unwrap_or_default();
        vec![Outbound::to_many(members, ServerEvent::ClearAll)]
    }

    async fn video_data(&self, conn_id: &ConnectionId, frame: serde_json::Value) -> Vec<Outbound> {
        let Some(members) = self.room_members(conn_id).await else {
            return Vec::new();
        };
        let name = self.registry.effective_name(conn_id).await;
        vec![Outbound::to_many(
            members,
            ServerEvent::VideoData(VideoBroadcast {
                name,
                video_data: frame,
            }),
        )]
    }

    /// The member list of the sender's current room, or `None` when the
    /// sender has no room or the room is already gone.
    async fn room_members(&self, conn_id: &ConnectionId) -> Option<Vec<ConnectionId>> {
        let key = self.registry.room_of(conn_id).await?;
        self.rooms.snapshot(&key).await
    }
}

enum CursorKind {
    Start,
    Update,
}

fn id_strings(members: &[ConnectionId]) -> Vec<String> {
    members.iter().map(|m| m.as_str().to_string()).collect()
}
