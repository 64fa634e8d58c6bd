use crate::AppState;
use crate::services::notifier::SocketHub;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;

/// Event sent once per connection carrying the id to pass as `socketId`.
pub const ON_CONNECT_EVENT: &str = "connect";

pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<SocketHub>) {
    let (session_id, mut events) = hub.register();
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("🔌 Push session {} connected", session_id);

    let hello = SocketHub::frame(ON_CONNECT_EVENT, json!({ "id": session_id }));
    if sender.send(Message::Text(hello)).await.is_ok() {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(frame) => {
                        if sender.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    hub.unregister(&session_id);
    tracing::info!("🔌 Push session {} disconnected", session_id);
}
