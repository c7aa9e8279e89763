//! Participant and room snapshot types

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One connected identity as broadcast by the hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Hub-assigned id
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Current chat bubble, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Remaining bubble lifetime when the snapshot was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ttl_ms: Option<u64>,
    /// Display name, empty until setup completes
    #[serde(default)]
    pub name: String,
    /// Avatar kind as sent on the wire (see [`AvatarKind::parse_lenient`])
    #[serde(default)]
    pub sprite_type: String,
}

impl Participant {
    /// Create a participant with an empty profile and the default avatar
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            x: position.x,
            y: position.y,
            message: None,
            message_ttl_ms: None,
            name: String::new(),
            sprite_type: AvatarKind::default().as_str().to_string(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The avatar to render, unknown kinds falling back to the default
    pub fn avatar(&self) -> AvatarKind {
        AvatarKind::parse_lenient(&self.sprite_type)
    }
}

/// Known avatar kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    #[default]
    Ghost,
    Robot,
    Skull,
    Bird,
    Cat,
    Dog,
}

impl AvatarKind {
    pub const ALL: [AvatarKind; 6] = [
        AvatarKind::Ghost,
        AvatarKind::Robot,
        AvatarKind::Skull,
        AvatarKind::Bird,
        AvatarKind::Cat,
        AvatarKind::Dog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarKind::Ghost => "ghost",
            AvatarKind::Robot => "robot",
            AvatarKind::Skull => "skull",
            AvatarKind::Bird => "bird",
            AvatarKind::Cat => "cat",
            AvatarKind::Dog => "dog",
        }
    }

    /// Parse a wire value, returning None for unknown kinds
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Parse a wire value, mapping unknown kinds to the default
    pub fn parse_lenient(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for AvatarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete participant-id → participant mapping
///
/// Serialized as a plain JSON object keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RoomSnapshot {
    participants: HashMap<String, Participant>,
}

impl RoomSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.participants.keys().map(String::as_str)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Participants ordered by id, for stable rendering
    pub fn sorted(&self) -> Vec<&Participant> {
        let mut participants: Vec<_> = self.participants.values().collect();
        participants.sort_by(|a, b| a.id.cmp(&b.id));
        participants
    }
}

impl FromIterator<Participant> for RoomSnapshot {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self {
            participants: iter.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}
