//! The authoritative room
//!
//! All mutations go through one lock. Each mutation that changes state encodes
//! the resulting `gameState` frame while still holding the lock and publishes
//! it on a broadcast channel, so subscribers observe snapshots in exactly the
//! order the mutations happened.

mod config;
mod record;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use huddle_core::{Participant, Point, RoomSnapshot, ServerMessage};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub use config::{
    DEFAULT_MESSAGE_TTL, DEFAULT_POSITION_INTERVAL, DEFAULT_TICK_INTERVAL, RoomConfig,
};
use record::ParticipantRecord;

/// An encoded `gameState` frame, shared by every subscriber
pub type SnapshotFrame = Arc<str>;

/// Outcome of a position update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionUpdate {
    /// Applied and broadcast
    Applied,
    /// Inside the rate-limit window; applied by a later tick
    Coalesced,
    /// Unknown participant or non-finite coordinates
    Ignored,
}

/// Authoritative participant map for one room
pub struct Room {
    config: RoomConfig,
    participants: Mutex<HashMap<String, ParticipantRecord>>,
    tx: broadcast::Sender<SnapshotFrame>,
}

impl Room {
    pub fn new(config: RoomConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            config,
            participants: Mutex::new(HashMap::new()),
            tx,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Subscribe to snapshot broadcasts from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotFrame> {
        self.tx.subscribe()
    }

    /// Add a participant with a fresh id and broadcast
    pub async fn join(&self, now: Instant) -> String {
        let mut participants = self.participants.lock().await;
        let id = Uuid::new_v4().to_string();
        let spread = 100.0 + 50.0 * participants.len() as f64;
        let position = self.config.bounds.clamp(Point::new(spread, 100.0));
        participants.insert(
            id.clone(),
            ParticipantRecord::new(Participant::new(id.clone(), position)),
        );
        debug!(participant = %id, count = participants.len(), "participant joined");
        self.publish(&participants, now);
        id
    }

    /// Remove a participant and broadcast; false if it was not present
    pub async fn leave(&self, id: &str) -> bool {
        let mut participants = self.participants.lock().await;
        if participants.remove(id).is_none() {
            return false;
        }
        debug!(participant = %id, count = participants.len(), "participant left");
        self.publish(&participants, Instant::now());
        true
    }

    /// Move a participant, re-clamped to the room bounds
    pub async fn update_position(&self, id: &str, x: f64, y: f64, now: Instant) -> PositionUpdate {
        if !x.is_finite() || !y.is_finite() {
            warn!(participant = %id, "ignoring non-finite position");
            return PositionUpdate::Ignored;
        }
        let position = self.config.bounds.clamp(Point::new(x, y));

        let mut participants = self.participants.lock().await;
        let Some(record) = participants.get_mut(id) else {
            return PositionUpdate::Ignored;
        };
        if record.throttled(now, self.config.position_interval) {
            record.pending_position = Some(position);
            return PositionUpdate::Coalesced;
        }
        record.set_position(position, now);
        self.publish(&participants, now);
        PositionUpdate::Applied
    }

    /// Overwrite a participant's display name and avatar
    pub async fn set_profile(&self, id: &str, name: &str, sprite_type: &str, now: Instant) -> bool {
        let mut participants = self.participants.lock().await;
        let Some(record) = participants.get_mut(id) else {
            return false;
        };
        record.participant.name = truncate_chars(name, self.config.max_name_len);
        record.participant.sprite_type = sprite_type.to_string();
        self.publish(&participants, now);
        true
    }

    /// Show a chat bubble that expires after the configured ttl
    ///
    /// Blank text clears the current bubble.
    pub async fn send_message(&self, id: &str, text: &str, now: Instant) -> bool {
        let mut participants = self.participants.lock().await;
        let Some(record) = participants.get_mut(id) else {
            return false;
        };
        if text.trim().is_empty() {
            record.clear_message();
        } else {
            let message = truncate_chars(text, self.config.max_chat_len);
            record.set_message(message, now + self.config.message_ttl);
        }
        self.publish(&participants, now);
        true
    }

    /// Apply due pending positions and clear expired bubbles
    ///
    /// Broadcasts once if anything changed; returns whether it did.
    pub async fn tick(&self, now: Instant) -> bool {
        let mut participants = self.participants.lock().await;
        let mut changed = false;
        for record in participants.values_mut() {
            if let Some(position) = record.pending_position
                && !record.throttled(now, self.config.position_interval)
            {
                record.set_position(position, now);
                changed = true;
            }
            if record.message_expired(now) {
                changed |= record.clear_message();
            }
        }
        if changed {
            self.publish(&participants, now);
        }
        changed
    }

    /// Current state in wire form
    pub async fn snapshot(&self) -> RoomSnapshot {
        let participants = self.participants.lock().await;
        Self::wire_snapshot(&participants, Instant::now())
    }

    pub async fn participant_count(&self) -> usize {
        self.participants.lock().await.len()
    }

    fn wire_snapshot(
        participants: &HashMap<String, ParticipantRecord>,
        now: Instant,
    ) -> RoomSnapshot {
        participants.values().map(|r| r.to_wire(now)).collect()
    }

    /// Encode and broadcast; called with the lock held
    fn publish(&self, participants: &HashMap<String, ParticipantRecord>, now: Instant) {
        let message = ServerMessage::GameState(Self::wire_snapshot(participants, now));
        match message.encode() {
            Ok(frame) => {
                // No receivers is fine: nobody is connected.
                let receivers = self.tx.send(Arc::from(frame)).unwrap_or(0);
                debug!(receivers, "broadcast snapshot");
            }
            Err(e) => error!("Failed to encode snapshot: {}", e),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
