//! Pointer and keyboard input → position intents
//!
//! The controller only ever moves the participant the [`LocalView`] reports
//! as "me". Positions are computed from the last snapshot; nothing is
//! predicted locally, so what is displayed is always what the hub reported.

use crate::geometry::{AvatarSize, Point, RoomBounds};
use crate::intent::OutboundIntent;
use crate::view::LocalView;

/// Default distance moved by one arrow-key press
pub const DEFAULT_KEY_STEP: f64 = 10.0;

/// Discrete movement keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Parse a key name such as `ArrowUp`, `up` or `left`
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("arrow").unwrap_or(&name);
        match name {
            "up" => Some(ArrowKey::Up),
            "down" => Some(ArrowKey::Down),
            "left" => Some(ArrowKey::Left),
            "right" => Some(ArrowKey::Right),
            _ => None,
        }
    }
}

/// Turns user input into `Move` intents for the local participant
#[derive(Debug, Clone)]
pub struct InputController {
    bounds: RoomBounds,
    avatar: AvatarSize,
    step: f64,
    dragging: bool,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(RoomBounds::default())
    }
}

impl InputController {
    pub fn new(bounds: RoomBounds) -> Self {
        Self {
            bounds,
            avatar: AvatarSize::default(),
            step: DEFAULT_KEY_STEP,
            dragging: false,
        }
    }

    #[must_use]
    pub fn with_avatar_size(mut self, avatar: AvatarSize) -> Self {
        self.avatar = avatar;
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// The room was resized
    pub fn set_bounds(&mut self, bounds: RoomBounds) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> RoomBounds {
        self.bounds
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer pressed at `point`; starts a drag when it hits our own avatar
    pub fn pointer_down(&mut self, view: &LocalView, point: Point) -> bool {
        let Some(me) = view.me() else {
            return false;
        };
        let hit = point.x >= me.x
            && point.x <= me.x + self.avatar.width
            && point.y >= me.y
            && point.y <= me.y + self.avatar.height;
        if hit {
            self.dragging = true;
        }
        hit
    }

    /// Pointer moved to `point` (room coordinates)
    pub fn pointer_move(&self, view: &LocalView, point: Point) -> Option<OutboundIntent> {
        if !self.dragging || !self.bounds.contains(point) {
            return None;
        }
        view.me()?;
        Some(OutboundIntent::move_to(
            self.bounds.clamp_avatar(point, self.avatar),
        ))
    }

    /// Pointer released anywhere, inside the room or not
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// One key press moves one step from the last snapshot position
    pub fn arrow_key(&self, view: &LocalView, key: ArrowKey) -> Option<OutboundIntent> {
        let current = view.me()?.position();
        let target = match key {
            ArrowKey::Up => Point::new(current.x, current.y - self.step),
            ArrowKey::Down => Point::new(current.x, current.y + self.step),
            ArrowKey::Left => Point::new(current.x - self.step, current.y),
            ArrowKey::Right => Point::new(current.x + self.step, current.y),
        };
        Some(OutboundIntent::move_to(
            self.bounds.clamp_avatar(target, self.avatar),
        ))
    }

    /// Forget any drag in progress
    pub fn reset(&mut self) {
        self.dragging = false;
    }
}
