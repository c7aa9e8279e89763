//! WebSocket connection handling

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ProtocolError, ServerMessage, decode_client_frame};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one participant's connection for its whole lifetime
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before joining so the join broadcast is not missed.
    let mut snapshots = state.room.subscribe();
    let id = state.room.join(Instant::now()).await;
    info!(participant = %id, "WebSocket client connected");

    let assigned = ServerMessage::AssignedId { id: id.clone() };
    let sent = match assigned.encode() {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!("Failed to encode assigned id: {}", e);
            false
        }
    };

    if sent {
        loop {
            tokio::select! {
                frame = snapshots.recv() => match frame {
                    Ok(frame) => {
                        if sender.send(Message::Text(frame.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Snapshots are full state; the next one supersedes what was skipped.
                        debug!(participant = %id, skipped, "snapshot subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                msg = receiver.next() => match msg {
                    Some(Ok(Message::Text(text))) => handle_text_message(&text, &id, &state).await,
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(participant = %id, "WebSocket client sent close frame");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us
                    }
                    Some(Err(e)) => {
                        warn!(participant = %id, "WebSocket error: {}", e);
                        break;
                    }
                },
            }
        }
    }

    state.room.leave(&id).await;
    info!(participant = %id, "WebSocket client disconnected");
}

/// Apply one client frame to the room
///
/// Bad frames are logged and dropped; they never end the connection.
async fn handle_text_message(text: &str, id: &str, state: &AppState) {
    let message = match decode_client_frame(text) {
        Ok(message) => message,
        Err(ProtocolError::UnknownMessageType(kind)) => {
            debug!(participant = %id, kind = %kind, "ignoring unknown message type");
            return;
        }
        Err(e) => {
            warn!(participant = %id, "dropping frame: {}", e);
            return;
        }
    };

    let now = Instant::now();
    match message {
        ClientMessage::UpdatePosition { x, y } => {
            let outcome = state.room.update_position(id, x, y, now).await;
            debug!(participant = %id, ?outcome, "position update");
        }
        ClientMessage::SendMessage { message } => {
            state.room.send_message(id, &message, now).await;
        }
        ClientMessage::SetPlayerInfo { name, sprite_type } => {
            state.room.set_profile(id, &name, &sprite_type, now).await;
        }
    }
}
