//! Shared application state for the huddle server

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::room::{Room, RoomConfig};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The single room this hub serves
    pub room: Arc<Room>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState with a room built from `config`
    pub fn new(config: RoomConfig) -> Self {
        Self::with_room(Arc::new(Room::new(config)))
    }

    /// Create AppState around an existing room (for testing)
    pub fn with_room(room: Arc<Room>) -> Self {
        Self {
            room,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
