//! Server assembly: builds the shared state and the axum router, binds
//! the listener and serves until shutdown.

use std::{collections::HashMap, sync::Arc};

use axum::{Router, routing::get};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::repository::{InMemoryConnectionRegistry, InMemoryRoomStore},
    ui::{
        handler::{get_room_detail, get_rooms, health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
    usecase::EventRouter,
};

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Run the server until ctrl-c (or SIGTERM on unix).
pub async fn run(config: ServerConfig) -> Result<(), std::io::Error> {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let rooms = Arc::new(InMemoryRoomStore::new());
    let state = Arc::new(AppState {
        router: EventRouter::new(registry, rooms.clone()),
        rooms,
        connected_clients: Arc::new(Mutex::new(HashMap::new())),
    });

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_key}", get(get_room_detail))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("URL: http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
