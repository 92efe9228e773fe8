//! Axis-aligned boxes and the capability traits shared by every entity
//!
//! Collision, AI and rendering code work against these traits instead of
//! branching on concrete entity types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    /// Bottom-right corner
    pub max: Vec2,
}

impl Aabb {
    /// Box from its top-left corner and size
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Point of this box closest to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Anything with a top-left position in the playfield
pub trait HasPosition {
    fn position(&self) -> Vec2;
}

pub trait HasVelocity {
    /// Pixels per second
    fn velocity(&self) -> Vec2;
}

/// Anything that can collide
pub trait HasHitbox {
    fn hitbox(&self) -> Aabb;

    fn center(&self) -> Vec2 {
        self.hitbox().center()
    }
}

impl HasHitbox for Aabb {
    fn hitbox(&self) -> Aabb {
        *self
    }
}

/// Anything with health
pub trait Damageable {
    fn health(&self) -> i32;
    fn max_health(&self) -> i32;

    /// Apply a hit at simulation time `now_ms`. Returns true if the hit
    /// landed (it may be mitigated or ignored entirely).
    fn take_damage(&mut self, amount: i32, now_ms: u64) -> bool;

    fn is_alive(&self) -> bool {
        self.health() > 0
    }
}
