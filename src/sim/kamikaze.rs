//! Kamikaze controller
//!
//! One kamikaze exists at a time. It waits off the right edge until its
//! arrival time, then cruises left at a fixed speed while chasing the player's
//! altitude. Any collision detonates it and schedules the next arrival.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, HasHitbox, HasPosition, HasVelocity};
use super::motion::{AxisInput, AxisState, MotionParams, MovementState, step_axis};
use crate::consts::*;
use crate::tuning::KamikazeTuning;

/// Vertical misalignment tolerated before the kamikaze corrects
const TRACK_DEAD_ZONE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kamikaze {
    pub movement: MovementState,
    /// Simulation time at which it enters the screen
    pub arrival_ms: u64,
    /// Held off-screen while a cave is active
    pub parked: bool,
    tuning: KamikazeTuning,
}

impl Kamikaze {
    pub fn new(tuning: &KamikazeTuning) -> Self {
        Self {
            movement: MovementState::at(Self::waiting_position()),
            arrival_ms: tuning.initial_arrival_ms,
            parked: false,
            tuning: tuning.clone(),
        }
    }

    /// Just past the right edge, vertically centered
    pub fn waiting_position() -> Vec2 {
        Vec2::new(SCREEN_WIDTH + CRAFT_WIDTH, SCREEN_HEIGHT / 2.0)
    }

    pub fn size() -> Vec2 {
        Vec2::new(CRAFT_WIDTH, CRAFT_HEIGHT)
    }

    /// Past its spawn-in window and not parked
    pub fn can_blast(&self, now_ms: u64) -> bool {
        !self.parked && now_ms >= self.arrival_ms
    }

    /// Back to the waiting spot, arriving `delay_ms` from `now_ms`
    pub fn respawn(&mut self, now_ms: u64, delay_ms: u64) {
        self.movement = MovementState::at(Self::waiting_position());
        self.arrival_ms = now_ms + delay_ms;
        log::debug!("Kamikaze respawn, arriving at {} ms", self.arrival_ms);
    }

    /// Hold off-screen until [`Kamikaze::release`]
    pub fn park(&mut self) {
        self.parked = true;
        self.movement = MovementState::at(Self::waiting_position());
    }

    pub fn release(&mut self, now_ms: u64) {
        self.parked = false;
        self.respawn(now_ms, self.tuning.post_cave_respawn_ms);
    }

    /// Respawn after being shot or colliding
    pub fn detonate(&mut self, now_ms: u64) {
        self.respawn(now_ms, self.tuning.hit_respawn_ms);
    }

    /// Fully past the left edge
    pub fn off_left(&self) -> bool {
        self.movement.pos.x + CRAFT_WIDTH < 0.0
    }

    /// Cruise left and chase `player_center_y`
    pub fn advance(&mut self, player_center_y: f32, now_ms: u64, dt_ms: u32) {
        if !self.can_blast(now_ms) {
            self.movement.settle();
            return;
        }
        let dy = player_center_y - self.center().y;
        let input = AxisInput::new(dy > TRACK_DEAD_ZONE, dy < -TRACK_DEAD_ZONE);
        let params = MotionParams::with_limits(self.tuning.accel_rate, self.tuning.max_vel_y);
        let dt = dt_ms as f32;
        self.movement.y = step_axis(self.movement.y, input, &params, dt);
        self.movement.x = AxisState {
            accel: 0.0,
            vel: -self.tuning.speed,
        };

        let before = self.movement.pos;
        let mut pos = before + self.movement.velocity() * dt / 1000.0;
        pos.y = pos.y.clamp(0.0, SCREEN_HEIGHT - CRAFT_HEIGHT);
        self.movement.translate(pos - before);
    }
}

impl HasPosition for Kamikaze {
    fn position(&self) -> Vec2 {
        self.movement.pos
    }
}

impl HasVelocity for Kamikaze {
    fn velocity(&self) -> Vec2 {
        self.movement.velocity()
    }
}

impl HasHitbox for Kamikaze {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.movement.pos, Self::size())
    }
}
