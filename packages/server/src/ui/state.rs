//! Server state and connection management.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, mpsc};

use crate::{domain::RoomStore, usecase::EventRouter};

/// Client connection information
pub struct ClientInfo {
    /// Message sender channel for this client's outbound frames
    pub sender: mpsc::UnboundedSender<String>,
}

/// Shared application state
pub struct AppState {
    /// Event dispatch over the registry and room store
    pub router: EventRouter,
    /// Room store handle for the debug endpoints
    pub rooms: Arc<dyn RoomStore>,
    /// WebSocket sender channels keyed by connection id, used to turn
    /// the router's recipient lists into actual deliveries
    pub connected_clients: Arc<Mutex<HashMap<String, ClientInfo>>>,
}
