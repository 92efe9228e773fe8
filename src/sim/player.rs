//! Player craft controller

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, Damageable, HasHitbox, HasPosition, HasVelocity};
use super::input::{Direction, Intent};
use super::motion::{MotionParams, MovementState, Thrust};
use super::projectile::{Bullet, Owner};
use super::weapon::WeaponHeat;
use crate::consts::*;
use crate::difficulty::Difficulty;
use crate::tuning::{PlayerTuning, ProjectileTuning, Tuning};

/// Timed power-up effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// Shots add no heat
    InfiniteAmmo,
    /// Hits are ignored
    Invincible,
    /// Both guns fire whenever they can
    Autofire,
}

/// Expiry timestamps of the active power-ups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUps {
    pub infinite_ammo_until: Option<u64>,
    pub invincible_until: Option<u64>,
    pub autofire_until: Option<u64>,
}

impl PowerUps {
    fn slot(&mut self, kind: PowerUp) -> &mut Option<u64> {
        match kind {
            PowerUp::InfiniteAmmo => &mut self.infinite_ammo_until,
            PowerUp::Invincible => &mut self.invincible_until,
            PowerUp::Autofire => &mut self.autofire_until,
        }
    }

    pub fn is_active(&self, kind: PowerUp, now_ms: u64) -> bool {
        let until = match kind {
            PowerUp::InfiniteAmmo => self.infinite_ammo_until,
            PowerUp::Invincible => self.invincible_until,
            PowerUp::Autofire => self.autofire_until,
        };
        until.is_some_and(|t| now_ms < t)
    }

    /// Clear expired effects, returning the ones that just ran out
    pub fn expire(&mut self, now_ms: u64) -> Vec<PowerUp> {
        let mut expired = Vec::new();
        for kind in [PowerUp::InfiniteAmmo, PowerUp::Invincible, PowerUp::Autofire] {
            let slot = self.slot(kind);
            if slot.is_some_and(|t| now_ms >= t) {
                *slot = None;
                expired.push(kind);
            }
        }
        expired
    }
}

/// The player's craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub movement: MovementState,
    pub thrust: Thrust,
    pub front_gun: WeaponHeat,
    pub back_gun: WeaponHeat,
    pub power_ups: PowerUps,
    health: i32,
    difficulty: Difficulty,
    /// Time of the last landed hit (starts the flicker window)
    time_hit: Option<u64>,
    tuning: PlayerTuning,
}

impl Player {
    pub fn new(tuning: &Tuning, difficulty: Difficulty) -> Self {
        Self {
            movement: MovementState::at(Self::start_position()),
            thrust: Thrust::default(),
            front_gun: WeaponHeat::new(tuning.weapon),
            back_gun: WeaponHeat::new(tuning.weapon),
            power_ups: PowerUps::default(),
            health: tuning.player.max_health,
            difficulty,
            time_hit: None,
            tuning: tuning.player.clone(),
        }
    }

    /// Left quarter of the screen, vertically centered
    pub fn start_position() -> Vec2 {
        Vec2::new(
            SCREEN_WIDTH / 4.0 - PLAYER_WIDTH / 2.0,
            SCREEN_HEIGHT / 2.0 - PLAYER_HEIGHT / 2.0,
        )
    }

    pub fn size() -> Vec2 {
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    /// Sprite box (the hitbox is the smaller hurt box)
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.movement.pos, Self::size())
    }

    pub fn params(&self) -> MotionParams {
        MotionParams::from_player(&self.tuning)
    }

    /// Update held thrust from a thrust intent
    pub fn apply_thrust(&mut self, dir: Direction, pressed: bool) {
        match dir {
            Direction::Up => self.thrust.up = pressed,
            Direction::Down => self.thrust.down = pressed,
            Direction::Left => self.thrust.left = pressed,
            Direction::Right => {
                if pressed && !self.thrust.right && self.tuning.forward_kick {
                    self.movement.x.vel += self.tuning.max_vel;
                }
                self.thrust.right = pressed;
            }
        }
    }

    /// Thrust intents only; firing needs ids and tuning from the world
    pub fn apply_intent(&mut self, intent: &Intent) {
        if let Intent::Thrust { dir, pressed } = *intent {
            self.apply_thrust(dir, pressed);
        }
    }

    /// Integrate motion for `dt_ms`
    pub fn advance(&mut self, dt_ms: u32) {
        let max_pos = Vec2::new(SCREEN_WIDTH - PLAYER_WIDTH, SCREEN_HEIGHT - PLAYER_HEIGHT);
        let params = self.params();
        self.movement
            .advance(self.thrust, &params, self.tuning.tilt_divisor, dt_ms as f32, max_pos);
    }

    /// Weapon decay and power-up expiry
    pub fn update(&mut self, now_ms: u64, dt_ms: u32) {
        self.front_gun.update(now_ms, dt_ms);
        self.back_gun.update(now_ms, dt_ms);
        for kind in self.power_ups.expire(now_ms) {
            log::debug!("Power-up {:?} expired at {} ms", kind, now_ms);
        }
    }

    pub fn grant(&mut self, kind: PowerUp, now_ms: u64) {
        *self.power_ups.slot(kind) = Some(now_ms + self.tuning.power_up_ms);
        log::debug!("Power-up {:?} granted at {} ms", kind, now_ms);
    }

    pub fn has(&self, kind: PowerUp, now_ms: u64) -> bool {
        self.power_ups.is_active(kind, now_ms)
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.tuning.max_health);
    }

    pub fn reset_heat(&mut self) {
        self.front_gun.reset();
        self.back_gun.reset();
    }

    fn in_flicker(&self, now_ms: u64) -> bool {
        self.time_hit
            .is_some_and(|t| now_ms.saturating_sub(t) < self.tuning.flicker_ms)
    }

    /// Blinks during the post-hit flicker window
    pub fn visible(&self, now_ms: u64) -> bool {
        match self.time_hit {
            Some(t) if self.in_flicker(now_ms) => {
                let freq = self.tuning.flicker_freq_ms.max(1);
                (now_ms.saturating_sub(t) / freq) % 2 != 0
            }
            _ => true,
        }
    }

    /// Fire the nose gun. Spawn point and direction follow the tilt.
    pub fn fire_forward(&mut self, now_ms: u64, id: u32, tuning: &ProjectileTuning) -> Option<Bullet> {
        let free = self.has(PowerUp::InfiniteAmmo, now_ms);
        if !self.front_gun.try_fire(now_ms, free) {
            return None;
        }
        let (sin, cos) = self.movement.tilt_deg.to_radians().sin_cos();
        let p = self.movement.pos;
        let pos = Vec2::new(
            p.x + PLAYER_WIDTH + 5.0 - (PLAYER_WIDTH / 8.0 * sin).abs(),
            p.y + PLAYER_HEIGHT / 2.0 + PLAYER_HEIGHT * sin,
        );
        let speed = tuning.bullet_speed;
        let vel = Vec2::new((speed * cos).abs(), sin.signum() * (speed * sin).abs());
        Some(Bullet::new(id, pos, vel, Owner::Player, tuning))
    }

    /// Fire the tail gun, mirrored from the nose gun
    pub fn fire_back(&mut self, now_ms: u64, id: u32, tuning: &ProjectileTuning) -> Option<Bullet> {
        let free = self.has(PowerUp::InfiniteAmmo, now_ms);
        if !self.back_gun.try_fire(now_ms, free) {
            return None;
        }
        let (sin, cos) = self.movement.tilt_deg.to_radians().sin_cos();
        let p = self.movement.pos;
        let pos = Vec2::new(
            p.x - 10.0 + (PLAYER_WIDTH / 8.0 * sin).abs(),
            p.y + PLAYER_HEIGHT / 2.0 - PLAYER_HEIGHT * sin,
        );
        let speed = tuning.bullet_speed;
        let vel = Vec2::new(-(speed * cos).abs(), -sin.signum() * (speed * sin).abs());
        Some(Bullet::new(id, pos, vel, Owner::Player, tuning))
    }
}

impl HasPosition for Player {
    fn position(&self) -> Vec2 {
        self.movement.pos
    }
}

impl HasVelocity for Player {
    fn velocity(&self) -> Vec2 {
        self.movement.velocity()
    }
}

impl HasHitbox for Player {
    fn hitbox(&self) -> Aabb {
        self.bounds().inset(PLAYER_HURT_INSET)
    }
}

impl Damageable for Player {
    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    /// Mitigated by difficulty; ignored while invincible or flickering
    fn take_damage(&mut self, amount: i32, now_ms: u64) -> bool {
        if self.has(PowerUp::Invincible, now_ms) || self.in_flicker(now_ms) {
            return false;
        }
        let dealt = self.difficulty.mitigate(amount);
        self.health = (self.health - dealt).max(0);
        self.time_hit = Some(now_ms);
        log::debug!("Player hit for {} ({} left)", dealt, self.health);
        true
    }
}
