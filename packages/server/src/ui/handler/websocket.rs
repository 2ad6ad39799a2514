//! WebSocket connection handlers.
//!
//! The transport layer: accepts a connection, assigns its opaque id,
//! pumps inbound frames through the [`EventRouter`] and delivers the
//! resulting outbound events over per-client channels. Delivery is
//! fire-and-forget; a closed channel only logs a warning.
//!
//! [`EventRouter`]: crate::usecase::EventRouter

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::ClientEvent,
    ui::state::{AppState, ClientInfo},
    usecase::{Outbound, Recipients},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // The opaque connection id, assigned at accept time (the wire
    // equivalent of a socket id).
    let conn_id_str = Uuid::new_v4().to_string();
    let conn_id = match ConnectionId::new(conn_id_str.clone()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("failed to build connection id: {}", e);
            return;
        }
    };

    // Create a channel for this client to receive messages
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.router.connect(&conn_id).await;
    {
        let mut clients = state.connected_clients.lock().await;
        clients.insert(conn_id_str.clone(), ClientInfo { sender: tx });
    }
    tracing::info!("client '{}' connected and registered", conn_id_str);

    let (mut sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let conn_id_clone = conn_id.clone();

    // Task: inbound frames from this client, handled strictly in arrival
    // order so one connection's events never interleave with themselves.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!(
                                conn = %conn_id_clone,
                                "dropping unparseable frame: {}",
                                e
                            );
                            continue;
                        }
                    };

                    let outbound = state_clone.router.handle(&conn_id_clone, event).await;
                    deliver(&state_clone, outbound).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("client '{}' requested close", conn_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Task: outbound frames queued for this client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Teardown: leave the room, notify the remaining members, drop the
    // delivery channel.
    {
        let mut clients = state.connected_clients.lock().await;
        clients.remove(&conn_id_str);
    }
    let outbound = state.router.disconnect(&conn_id).await;
    deliver(&state, outbound).await;
    tracing::info!("client '{}' disconnected and removed", conn_id_str);
}

/// Resolve recipient ids to live sender channels and push the frames.
async fn deliver(state: &Arc<AppState>, outbound: Vec<Outbound>) {
    if outbound.is_empty() {
        return;
    }
    let clients = state.connected_clients.lock().await;
    for Outbound { recipients, event } in outbound {
        let frame = match serde_json::to_string(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("failed to serialize outbound event: {}", e);
                continue;
            }
        };
        let targets: Vec<&str> = match &recipients {
            Recipients::One(conn_id) => vec![conn_id.as_str()],
            Recipients::Many(conn_ids) => conn_ids.iter().map(|c| c.as_str()).collect(),
        };
        for target in targets {
            if let Some(client_info) = clients.get(target)
                && client_info.sender.send(frame.clone()).is_err()
            {
                tracing::warn!("failed to send event to client '{}'", target);
            }
        }
    }
}
