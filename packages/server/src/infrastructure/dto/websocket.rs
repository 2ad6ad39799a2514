//! WebSocket message DTOs for the collaborative session wire contract.
//!
//! Every frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Event names and payload shapes are a compatibility contract with
//! existing clients and must not change.

use serde::{Deserialize, Serialize};

use crate::domain::Drawing;
use kokuban_shared::time::unix_millis_to_rfc3339;

/// The `room id` payload arrives as a JSON string or number; both are
/// accepted and coerced to the string form, which is then validated as
/// a room key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoomKeyPayload {
    Text(String),
    Number(i64),
}

impl RoomKeyPayload {
    /// The string form of the payload, as the key literal.
    pub fn into_key_string(self) -> String {
        match self {
            RoomKeyPayload::Text(s) => s,
            RoomKeyPayload::Number(n) => n.to_string(),
        }
    }
}

/// Inbound client events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Join the room with the given key
    #[serde(rename = "room id")]
    RoomId(RoomKeyPayload),
    /// Submit the display name (once per real client)
    #[serde(rename = "submit name")]
    SubmitName(String),
    /// Chat text, relayed unmodified
    #[serde(rename = "chat message")]
    ChatMessage(String),
    /// Live cursor stroke start, opaque
    #[serde(rename = "cursorStart")]
    CursorStart(serde_json::Value),
    /// Live cursor movement, opaque
    #[serde(rename = "updateCursor")]
    UpdateCursor(serde_json::Value),
    /// New drawing payload, opaque
    #[serde(rename = "addDrawing")]
    AddDrawing(serde_json::Value),
    /// Remove the drawing with this id
    #[serde(rename = "removeDrawing")]
    RemoveDrawing(u64),
    /// Wipe the room's drawing log
    #[serde(rename = "clearAll")]
    ClearAll,
    /// Video frame payload, opaque
    #[serde(rename = "video data")]
    VideoData(serde_json::Value),
}

/// Outbound server events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Ordered list of connection ids currently in the room
    #[serde(rename = "users")]
    Users(Vec<String>),
    /// Full drawing log, sent only to a joining connection
    #[serde(rename = "initDrawings")]
    InitDrawings(Vec<DrawingDto>),
    #[serde(rename = "chat message")]
    ChatMessage(ChatBroadcast),
    #[serde(rename = "cursorStart")]
    CursorStart(CursorBroadcast),
    #[serde(rename = "updateCursor")]
    UpdateCursor(CursorBroadcast),
    #[serde(rename = "addDrawing")]
    AddDrawing(DrawingDto),
    #[serde(rename = "removeDrawing")]
    RemoveDrawing(u64),
    #[serde(rename = "clearAll")]
    ClearAll,
    #[serde(rename = "video data")]
    VideoData(VideoBroadcast),
}

/// Chat relay payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatBroadcast {
    /// RFC 3339 timestamp of the relay
    pub time: String,
    /// Sender's effective name
    pub name: String,
    /// The chat text, opaque
    pub data: String,
}

/// Cursor relay payload, shared by `cursorStart` and `updateCursor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorBroadcast {
    pub name: String,
    #[serde(rename = "drawingData")]
    pub drawing_data: serde_json::Value,
}

/// Video relay payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoBroadcast {
    pub name: String,
    #[serde(rename = "videoData")]
    pub video_data: serde_json::Value,
}

/// Full drawing record as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingDto {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "drawingId")]
    pub drawing_id: u64,
    pub name: String,
    #[serde(rename = "addedTime")]
    pub added_time: String,
    #[serde(rename = "lastUpdatedUserId")]
    pub last_updated_user_id: String,
    #[serde(rename = "lastUpdatedTime")]
    pub last_updated_time: String,
    #[serde(rename = "drawingData")]
    pub drawing_data: serde_json::Value,
}

impl From<Drawing> for DrawingDto {
    fn from(drawing: Drawing) -> Self {
        Self {
            user_id: drawing.user_id.into_string(),
            drawing_id: drawing.drawing_id,
            name: drawing.name,
            added_time: unix_millis_to_rfc3339(drawing.added_at.value()),
            last_updated_user_id: drawing.last_updated_user_id.into_string(),
            last_updated_time: unix_millis_to_rfc3339(drawing.last_updated_at.value()),
            drawing_data: drawing.drawing_data,
        }
    }
}
