//! The session client's mirror of hub state
//!
//! A [`LocalView`] never evolves on its own: it only changes when a frame
//! arrives from the hub or the channel drops. Snapshots replace the whole
//! view, there is no per-field merge.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::participant::{Participant, RoomSnapshot};
use crate::protocol::ServerMessage;

/// Last known room state plus the local identity
#[derive(Debug, Clone, Default)]
pub struct LocalView {
    own_id: Option<String>,
    snapshot: RoomSnapshot,
    connected: bool,
    /// Local instant after which each participant's bubble is hidden
    message_deadlines: HashMap<String, Instant>,
    snapshots_received: u64,
}

impl LocalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded hub frame received at `now`
    ///
    /// Returns true if the local identity changed.
    pub fn apply(&mut self, message: ServerMessage, now: Instant) -> bool {
        match message {
            ServerMessage::AssignedId { id } => {
                let changed = self.own_id.as_deref() != Some(id.as_str());
                self.own_id = Some(id);
                self.connected = true;
                changed
            }
            ServerMessage::GameState(snapshot) => {
                self.replace_snapshot(snapshot, now);
                false
            }
        }
    }

    fn replace_snapshot(&mut self, snapshot: RoomSnapshot, now: Instant) {
        self.message_deadlines = snapshot
            .participants()
            .filter(|p| p.message.is_some())
            .filter_map(|p| {
                p.message_ttl_ms
                    .map(|ttl| (p.id.clone(), now + Duration::from_millis(ttl)))
            })
            .collect();
        self.snapshot = snapshot;
        self.snapshots_received += 1;
    }

    /// Mark a new channel as open; identity arrives with the first frame
    pub fn mark_connected(&mut self) {
        self.connected = true;
    }

    /// The channel dropped: forget the identity, keep the snapshot on display
    ///
    /// Returns true if an identity was forgotten.
    pub fn mark_disconnected(&mut self) -> bool {
        self.connected = false;
        self.own_id.take().is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn own_id(&self) -> Option<&str> {
        self.own_id.as_deref()
    }

    pub fn snapshot(&self) -> &RoomSnapshot {
        &self.snapshot
    }

    /// Number of snapshots applied since creation
    pub fn snapshots_received(&self) -> u64 {
        self.snapshots_received
    }

    /// The participant this session controls, once the hub has reported it
    pub fn me(&self) -> Option<&Participant> {
        self.own_id.as_deref().and_then(|id| self.snapshot.get(id))
    }

    pub fn is_me(&self, id: &str) -> bool {
        self.own_id.as_deref() == Some(id)
    }

    /// The bubble to render for `id`, hidden once its lifetime has passed
    ///
    /// Bubbles broadcast without a lifetime stay until a snapshot clears them.
    pub fn visible_message(&self, id: &str, now: Instant) -> Option<&str> {
        let message = self.snapshot.get(id)?.message.as_deref()?;
        match self.message_deadlines.get(id) {
            Some(deadline) if now >= *deadline => None,
            _ => Some(message),
        }
    }
}
