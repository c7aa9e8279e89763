//! Room tuning knobs

use std::time::Duration;

use huddle_core::RoomBounds;

/// How long a chat bubble stays up
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(5);
/// Minimum spacing between applied position updates of one participant
pub const DEFAULT_POSITION_INTERVAL: Duration = Duration::from_millis(50);
/// Period of the maintenance tick (pending positions, bubble expiry)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration for a [`Room`](super::Room)
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Positions are re-clamped to these bounds
    pub bounds: RoomBounds,
    pub message_ttl: Duration,
    /// Zero disables coalescing
    pub position_interval: Duration,
    pub tick_interval: Duration,
    /// Chat text is truncated to this many characters
    pub max_chat_len: usize,
    /// Display names are truncated to this many characters
    pub max_name_len: usize,
    /// Snapshots buffered per slow subscriber before it skips ahead
    pub broadcast_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            bounds: RoomBounds::default(),
            message_ttl: DEFAULT_MESSAGE_TTL,
            position_interval: DEFAULT_POSITION_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_chat_len: 280,
            max_name_len: 32,
            broadcast_capacity: 64,
        }
    }
}
