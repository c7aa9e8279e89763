//! Room geometry and clamping

use serde::{Deserialize, Serialize};

/// A point in room coordinates (origin at the room's top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of an avatar's hit box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarSize {
    pub width: f64,
    pub height: f64,
}

impl Default for AvatarSize {
    fn default() -> Self {
        Self {
            width: 32.0,
            height: 32.0,
        }
    }
}

/// Visible extent of the room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl RoomBounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether `point` lies inside the room
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Clamp a position to `[0, width] x [0, height]`
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            clamp_axis(point.x, self.width),
            clamp_axis(point.y, self.height),
        )
    }

    /// Clamp a position so an avatar of `avatar` size stays fully visible
    pub fn clamp_avatar(&self, point: Point, avatar: AvatarSize) -> Point {
        Point::new(
            clamp_axis(point.x, self.width - avatar.width),
            clamp_axis(point.y, self.height - avatar.height),
        )
    }
}

/// Clamp `value` into `[0, max]`; a negative `max` collapses to zero.
fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}
