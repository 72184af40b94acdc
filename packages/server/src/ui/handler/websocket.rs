//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};

use crate::{
    domain::{ClassroomEvent, ConnectionIdFactory, EventPublisher},
    ui::{handler::gateway, state::AppState},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    let mut rx = state.hub.register(connection_id.clone()).await;
    tracing::info!("Client '{}' connected", connection_id);

    state
        .hub
        .send_to(
            connection_id.clone(),
            ClassroomEvent::Connected {
                connection_id: connection_id.clone(),
            },
        )
        .await;

    let (mut sender, mut receiver) = socket.split();

    // Forward frames published for this connection to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", recv_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match gateway::parse_frame(text.as_str()) {
                    Ok(message) => {
                        tracing::debug!("Received {:?} from '{}'", message, recv_id);
                        gateway::dispatch(&recv_state, &recv_id, message).await;
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring malformed frame from '{}': {}", recv_id, e);
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", recv_id);
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let connected_ms = state.hub.unregister(&connection_id).await.unwrap_or_default();
    state.registry.disconnect(&connection_id).await;
    tracing::info!(
        "Client '{}' disconnected after {}ms",
        connection_id,
        connected_ms
    );
}
