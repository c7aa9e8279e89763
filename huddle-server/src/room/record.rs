//! Hub-side bookkeeping for one participant

use std::time::{Duration, Instant};

use huddle_core::{Participant, Point};

/// Authoritative entry plus the timing state the wire format does not carry
#[derive(Debug, Clone)]
pub(crate) struct ParticipantRecord {
    pub participant: Participant,
    pub message_expires_at: Option<Instant>,
    pub last_position_at: Option<Instant>,
    /// Newest position received inside the rate-limit window
    pub pending_position: Option<Point>,
}

impl ParticipantRecord {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            message_expires_at: None,
            last_position_at: None,
            pending_position: None,
        }
    }

    pub fn set_position(&mut self, position: Point, now: Instant) {
        self.participant.x = position.x;
        self.participant.y = position.y;
        self.last_position_at = Some(now);
        self.pending_position = None;
    }

    /// Whether a position update at `now` falls inside the rate-limit window
    pub fn throttled(&self, now: Instant, interval: Duration) -> bool {
        self.last_position_at
            .is_some_and(|last| now.saturating_duration_since(last) < interval)
    }

    pub fn set_message(&mut self, message: String, expires_at: Instant) {
        self.participant.message = Some(message);
        self.message_expires_at = Some(expires_at);
    }

    pub fn clear_message(&mut self) -> bool {
        self.message_expires_at = None;
        self.participant.message.take().is_some()
    }

    pub fn message_expired(&self, now: Instant) -> bool {
        self.message_expires_at.is_some_and(|at| now >= at)
    }

    /// Wire form with the bubble's remaining lifetime filled in
    pub fn to_wire(&self, now: Instant) -> Participant {
        let mut participant = self.participant.clone();
        participant.message_ttl_ms = match (&participant.message, self.message_expires_at) {
            (Some(_), Some(at)) => {
                let remaining = at.saturating_duration_since(now).as_millis();
                Some(u64::try_from(remaining).unwrap_or(u64::MAX))
            }
            _ => None,
        };
        participant
    }
}
