//! Outbound intents produced by the presentation layer

use crate::geometry::Point;
use crate::participant::AvatarKind;
use crate::protocol::ClientMessage;

/// A locally generated, not-yet-sent description of a desired state change
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundIntent {
    Move { x: f64, y: f64 },
    Chat { text: String },
    SetProfile { name: String, avatar: AvatarKind },
}

impl OutboundIntent {
    pub fn move_to(point: Point) -> Self {
        OutboundIntent::Move {
            x: point.x,
            y: point.y,
        }
    }
}

impl From<OutboundIntent> for ClientMessage {
    fn from(intent: OutboundIntent) -> Self {
        match intent {
            OutboundIntent::Move { x, y } => ClientMessage::UpdatePosition { x, y },
            OutboundIntent::Chat { text } => ClientMessage::SendMessage { message: text },
            OutboundIntent::SetProfile { name, avatar } => ClientMessage::SetPlayerInfo {
                name,
                sprite_type: avatar.as_str().to_string(),
            },
        }
    }
}
