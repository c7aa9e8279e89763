//! huddle-client - Session client for huddle
//!
//! Keeps one WebSocket channel to the room hub open (reconnecting after
//! drops), turns local input into protocol messages and mirrors the hub's
//! snapshots into a [`LocalView`](huddle_core::LocalView).

mod connection;
mod endpoint;
mod error;
mod reconnect;
mod session;

pub use connection::{ConnectionManager, Disposer};
pub use endpoint::endpoint_from_origin;
pub use error::ClientError;
pub use reconnect::{DEFAULT_RECONNECT_DELAY, ReconnectConfig};
pub use session::SessionClient;
