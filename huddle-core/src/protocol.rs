//! WebSocket protocol message types
//!
//! Every frame is a JSON object `{"type": ..., "payload": {...}}`. Encoding
//! uses the derived adjacently-tagged representation; decoding goes through
//! [`Envelope`] so that an unknown `type` can be told apart from a broken frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::participant::RoomSnapshot;

/// Messages sent from client to hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Move the sender's avatar
    UpdatePosition { x: f64, y: f64 },

    /// Show a chat bubble over the sender's avatar
    SendMessage { message: String },

    /// Set the sender's display name and avatar
    SetPlayerInfo {
        name: String,
        #[serde(rename = "spriteType")]
        sprite_type: String,
    },
}

impl ClientMessage {
    /// Wire discriminator of this message
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::UpdatePosition { .. } => "updatePosition",
            ClientMessage::SendMessage { .. } => "sendMessage",
            ClientMessage::SetPlayerInfo { .. } => "setPlayerInfo",
        }
    }

    /// Encode as a single text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Messages sent from hub to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Identity of the receiving connection, sent once right after accept
    AssignedId { id: String },

    /// Full room snapshot, replaces the receiver's view
    GameState(RoomSnapshot),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::AssignedId { .. } => "assignedId",
            ServerMessage::GameState(_) => "gameState",
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outer shape shared by every frame
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct PositionPayload {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct ChatPayload {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePayload {
    name: String,
    sprite_type: String,
}

#[derive(Deserialize)]
struct AssignedIdPayload {
    id: String,
}

fn parse_envelope(text: &str) -> Result<Envelope, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::MalformedFrame)
}

fn payload<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(ProtocolError::MalformedFrame)
}

/// Decode a frame received by the hub
pub fn decode_client_frame(text: &str) -> Result<ClientMessage, ProtocolError> {
    let envelope = parse_envelope(text)?;
    match envelope.kind.as_str() {
        "updatePosition" => {
            let PositionPayload { x, y } = payload(envelope.payload)?;
            Ok(ClientMessage::UpdatePosition { x, y })
        }
        "sendMessage" => {
            let ChatPayload { message } = payload(envelope.payload)?;
            Ok(ClientMessage::SendMessage { message })
        }
        "setPlayerInfo" => {
            let ProfilePayload { name, sprite_type } = payload(envelope.payload)?;
            Ok(ClientMessage::SetPlayerInfo { name, sprite_type })
        }
        _ => Err(ProtocolError::UnknownMessageType(envelope.kind)),
    }
}

/// Decode a frame received by a session client
pub fn decode_server_frame(text: &str) -> Result<ServerMessage, ProtocolError> {
    let envelope = parse_envelope(text)?;
    match envelope.kind.as_str() {
        "assignedId" => {
            let AssignedIdPayload { id } = payload(envelope.payload)?;
            Ok(ServerMessage::AssignedId { id })
        }
        "gameState" => Ok(ServerMessage::GameState(payload(envelope.payload)?)),
        _ => Err(ProtocolError::UnknownMessageType(envelope.kind)),
    }
}
