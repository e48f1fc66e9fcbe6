//! Browser WebSocket connections.
//!
//! Clients only listen. Each socket is registered with the hub on upgrade,
//! a writer task drains the client's queue into the socket, and inbound
//! frames are read only to notice when the client goes away.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::debug;

use crate::relay::BroadcastHub;
use crate::web::AppState;

/// WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Drive one client connection until either side closes it.
pub async fn handle_socket(socket: WebSocket, hub: BroadcastHub) {
    let (id, mut rx) = hub.register().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_tx.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
        // Queue closed by the hub (shutdown)
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    let mut reader = tokio::spawn(async move {
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {} // axum answers pings itself
                Err(e) => {
                    debug!(error = %e, "socket_read_failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    hub.unregister(id).await;
}
