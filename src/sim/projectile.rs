//! Bullets, missiles and explosions
//!
//! Bullets and missiles live in playfield coordinates. Removal is
//! mark-then-compact: collision passes only set `destroyed`, and the world
//! drops marked entries once per tick.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, HasHitbox, HasPosition, HasVelocity};
use crate::consts::*;
use crate::tuning::ProjectileTuning;

/// Explosion radius when spawned
pub const EXPLOSION_START_RADIUS: f32 = 30.0;
/// Explosion radius at which it is spent
pub const EXPLOSION_END_RADIUS: f32 = 100.0;
/// Explosion growth (pixels/s)
pub const EXPLOSION_GROWTH: f32 = 100.0;

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
    Turret,
}

/// A straight-flying bullet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub size: Vec2,
    pub owner: Owner,
    pub destroyed: bool,
}

impl Bullet {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, owner: Owner, tuning: &ProjectileTuning) -> Self {
        Self {
            id,
            pos,
            vel,
            size: Vec2::new(tuning.bullet_width, tuning.bullet_height),
            owner,
            destroyed: false,
        }
    }

    pub fn step(&mut self, dt_ms: u32) {
        self.pos += self.vel * dt_ms as f32 / 1000.0;
    }

    /// Left the playfield entirely
    pub fn off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
            || self.pos.x > SCREEN_WIDTH
            || self.pos.y + self.size.y < 0.0
            || self.pos.y > SCREEN_HEIGHT
    }

    /// Pin to a boundary band after a ricochet
    pub fn pin_y(&mut self, y_center: f32) {
        self.pos.y = y_center - self.size.y * 0.5;
    }
}

impl HasPosition for Bullet {
    fn position(&self) -> Vec2 {
        self.pos
    }
}

impl HasVelocity for Bullet {
    fn velocity(&self) -> Vec2 {
        self.vel
    }
}

impl HasHitbox for Bullet {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Turret missile, optionally homing on the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub id: u32,
    pub pos: Vec2,
    /// Pixels per second, relative to the level (not the camera)
    pub vel: Vec2,
    pub size: Vec2,
    pub owner: Owner,
    pub homing: bool,
    /// Radians per second
    pub turn_rate: f32,
    pub blast_radius: f32,
    pub damage: f32,
    pub destroyed: bool,
}

impl Missile {
    /// Launch from `muzzle` aimed at `target`
    pub fn launch(id: u32, muzzle: Vec2, target: Vec2, homing: bool, tuning: &ProjectileTuning) -> Self {
        let size = Vec2::new(tuning.missile_width, tuning.missile_height);
        let pos = muzzle - size * 0.5;
        let dir = (target - muzzle).try_normalize().unwrap_or(Vec2::NEG_X);
        Self {
            id,
            pos,
            vel: dir * tuning.missile_speed,
            size,
            owner: Owner::Turret,
            homing,
            turn_rate: tuning.missile_turn_rate.to_radians(),
            blast_radius: tuning.missile_blast_radius,
            damage: tuning.missile_damage,
            destroyed: false,
        }
    }

    /// Heading in radians
    pub fn angle(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }

    /// Advance by `dt_ms`. Homing missiles turn toward `target` at most
    /// `turn_rate` per second. `scroll_dx` is how far the camera moved this
    /// tick; the missile shifts left by it to stay put in the level.
    pub fn step(&mut self, dt_ms: u32, target: Option<Vec2>, scroll_dx: f32) {
        let dt = dt_ms as f32 / 1000.0;
        if let (true, Some(target)) = (self.homing, target) {
            let to_target = target - self.center();
            if to_target.length_squared() > f32::EPSILON {
                let current = self.angle();
                let wanted = to_target.y.atan2(to_target.x);
                let mut diff = (wanted - current).rem_euclid(TAU);
                if diff > PI {
                    diff -= TAU;
                }
                let max_turn = self.turn_rate * dt;
                let angle = current + diff.clamp(-max_turn, max_turn);
                self.vel = Vec2::from_angle(angle) * self.vel.length();
            }
        }
        self.pos += self.vel * dt;
        self.pos.x -= scroll_dx;
    }

    pub fn off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0 || self.pos.x > SCREEN_WIDTH * 1.5
    }

    pub fn pin_y(&mut self, y_center: f32) {
        self.pos.y = y_center - self.size.y * 0.5;
    }
}

impl HasPosition for Missile {
    fn position(&self) -> Vec2 {
        self.pos
    }
}

impl HasVelocity for Missile {
    fn velocity(&self) -> Vec2 {
        self.vel
    }
}

impl HasHitbox for Missile {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Expanding explosion; purely visual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    /// Absolute level coordinates
    pub center: Vec2,
    pub radius: f32,
    pub done: bool,
}

impl Explosion {
    /// `rel_center` is in playfield coordinates
    pub fn at(id: u32, rel_center: Vec2, camera_x: f32) -> Self {
        Self {
            id,
            center: Vec2::new(rel_center.x + camera_x, rel_center.y),
            radius: EXPLOSION_START_RADIUS,
            done: false,
        }
    }

    pub fn grow(&mut self, dt_ms: u32) {
        self.radius += EXPLOSION_GROWTH * dt_ms as f32 / 1000.0;
        if self.radius >= EXPLOSION_END_RADIUS {
            self.radius = EXPLOSION_END_RADIUS;
            self.done = true;
        }
    }

    pub fn rel_center(&self, camera_x: f32) -> Vec2 {
        Vec2::new(self.center.x - camera_x, self.center.y)
    }
}
