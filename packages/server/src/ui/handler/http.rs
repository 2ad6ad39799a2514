//! HTTP API endpoint handlers.
//!
//! Debug/observability surface only; the collaborative session itself
//! runs over the WebSocket endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomKey,
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let mut summaries: Vec<RoomSummaryDto> = state
        .rooms
        .all_rooms()
        .await
        .into_iter()
        .map(RoomSummaryDto::from)
        .collect();
    summaries.sort_by(|a, b| a.key.cmp(&b.key));
    Json(summaries)
}

/// Get room detail by key
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_key): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let key = RoomKey::new(room_key).map_err(|_| StatusCode::NOT_FOUND)?;
    match state.rooms.get_room(&key).await {
        Some(room) => Ok(Json(RoomDetailDto::from(room))),
        None => Err(StatusCode::NOT_FOUND),
    }
}
