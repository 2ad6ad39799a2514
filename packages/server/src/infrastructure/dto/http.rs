//! HTTP API response DTOs for the debug/observability endpoints.

use serde::{Deserialize, Serialize};

use super::websocket::DrawingDto;
use crate::domain::Room;
use kokuban_shared::time::unix_millis_to_rfc3339;

/// Room summary for the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub key: String,
    pub members: Vec<String>,
    pub drawing_count: usize,
    pub created_at: String, // ISO 8601
}

impl From<Room> for RoomSummaryDto {
    fn from(room: Room) -> Self {
        Self {
            key: room.key.into_string(),
            members: room.members.into_iter().map(|c| c.into_string()).collect(),
            drawing_count: room.drawings.len(),
            created_at: unix_millis_to_rfc3339(room.created_at.value()),
        }
    }
}

/// Room detail for the detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetailDto {
    pub key: String,
    pub members: Vec<String>,
    pub drawings: Vec<DrawingDto>,
    pub created_at: String, // ISO 8601
}

impl From<Room> for RoomDetailDto {
    fn from(room: Room) -> Self {
        Self {
            key: room.key.into_string(),
            members: room.members.into_iter().map(|c| c.into_string()).collect(),
            drawings: room
                .drawings
                .all()
                .iter()
                .cloned()
                .map(DrawingDto::from)
                .collect(),
            created_at: unix_millis_to_rfc3339(room.created_at.value()),
        }
    }
}
