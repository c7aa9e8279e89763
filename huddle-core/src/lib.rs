//! huddle-core: Core library for the huddle shared-room presence protocol
//!
//! This crate holds everything both sides of the protocol agree on, plus the
//! client-side logic that does not need a network:
//!
//! - **Data model** - [`Participant`], [`RoomSnapshot`] and [`AvatarKind`]
//! - **Wire protocol** - [`ClientMessage`] / [`ServerMessage`] and the envelope decoders
//! - **Intents** - [`OutboundIntent`], what the presentation layer asks for
//! - **Input** - [`InputController`] turning pointer/keyboard input into intents
//! - **Local view** - [`LocalView`], the client's mirror of the last snapshot
//! - **Timers** - [`DeferredTask`], a cancellable run-once-after-delay handle
//!
//! # Data flow
//!
//! ```text
//!  input ──► InputController ──► OutboundIntent ──► ClientMessage ──► hub
//!                                                                      │
//!  render ◄── LocalView ◄──────────────── ServerMessage::GameState ◄───┘
//! ```

pub mod error;
pub mod geometry;
pub mod input;
pub mod intent;
pub mod participant;
pub mod protocol;
pub mod timer;
pub mod view;

// Re-export key types for convenience
pub use error::ProtocolError;
pub use geometry::{AvatarSize, Point, RoomBounds};
pub use input::{ArrowKey, InputController};
pub use intent::OutboundIntent;
pub use participant::{AvatarKind, Participant, RoomSnapshot};
pub use protocol::{ClientMessage, ServerMessage, decode_client_frame, decode_server_frame};
pub use timer::DeferredTask;
pub use view::LocalView;

/// Well-known path of the hub's WebSocket endpoint
pub const WS_PATH: &str = "/ws";
