//! Delta-time scaled acceleration model
//!
//! Every thrust-driven craft (player, enemy, kamikaze) moves through
//! [`step_axis`], once per planar axis per tick. The routine is pure so the
//! same inputs always give the same output regardless of frame rate history.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::PlayerTuning;

/// Acceleration and velocity along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisState {
    pub accel: f32,
    /// Pixels per second
    pub vel: f32,
}

/// Thrust along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisInput {
    pub increasing: bool,
    pub decreasing: bool,
}

impl AxisInput {
    pub fn new(increasing: bool, decreasing: bool) -> Self {
        Self {
            increasing,
            decreasing,
        }
    }

    #[inline]
    pub fn is_coasting(&self) -> bool {
        !self.increasing && !self.decreasing
    }
}

/// Integrator constants for one craft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub accel_rate: f32,
    pub decay_factor: f32,
    pub velocity_gain: f32,
    pub max_accel: f32,
    pub max_vel: f32,
}

impl MotionParams {
    pub fn from_player(t: &PlayerTuning) -> Self {
        Self {
            accel_rate: t.accel_rate,
            decay_factor: t.decay_factor,
            velocity_gain: t.velocity_gain,
            max_accel: t.max_accel,
            max_vel: t.max_vel,
        }
    }

    /// Same response curve as the player with a different rate and top speed
    pub fn with_limits(accel_rate: f32, max_vel: f32) -> Self {
        Self {
            accel_rate,
            max_vel,
            ..Self::from_player(&PlayerTuning::default())
        }
    }
}

/// Advance one axis by `dt_ms` milliseconds
pub fn step_axis(state: AxisState, input: AxisInput, params: &MotionParams, dt_ms: f32) -> AxisState {
    let AxisState { mut accel, mut vel } = state;
    let step = params.accel_rate * dt_ms;

    if input.decreasing {
        accel -= step;
    }
    if input.increasing {
        accel += step;
    }

    if input.is_coasting() {
        if vel < 0.0 {
            accel += params.decay_factor * step;
        } else if vel > 0.0 {
            accel -= params.decay_factor * step;
        }
        let increment = accel * dt_ms;
        vel += increment * params.velocity_gain;
        // Snap instead of creeping toward zero forever
        let band = (params.decay_factor * increment).abs();
        if vel != 0.0 && vel.abs() <= band {
            accel = 0.0;
            vel = 0.0;
        }
    } else {
        vel += accel * dt_ms * params.velocity_gain;
    }

    AxisState {
        accel: accel.clamp(-params.max_accel, params.max_accel),
        vel: vel.clamp(-params.max_vel, params.max_vel),
    }
}

/// Visual heading in degrees derived from vertical acceleration.
/// While coasting the nose never tilts against the direction of travel.
pub fn tilt_degrees(accel_y: f32, vel_y: f32, coasting: bool, divisor: f32) -> f32 {
    let raw = 180.0 * (accel_y / divisor).sin();
    if coasting && vel_y > 0.0 {
        raw.max(0.0)
    } else if coasting && vel_y < 0.0 {
        (-raw).min(0.0)
    } else {
        raw
    }
}

/// Four-way thrust held by a craft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thrust {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Thrust {
    pub fn x_axis(&self) -> AxisInput {
        AxisInput::new(self.right, self.left)
    }

    pub fn y_axis(&self) -> AxisInput {
        AxisInput::new(self.down, self.up)
    }
}

/// Position, per-axis motion and the last applied displacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Top-left corner in playfield coordinates
    pub pos: Vec2,
    pub x: AxisState,
    pub y: AxisState,
    /// Displacement applied by the most recent [`MovementState::advance`]
    pub last_delta: Vec2,
    /// Cosmetic heading, also used to aim the guns
    pub tilt_deg: f32,
}

impl MovementState {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            x: AxisState::default(),
            y: AxisState::default(),
            last_delta: Vec2::ZERO,
            tilt_deg: 0.0,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.x.vel, self.y.vel)
    }

    /// Integrate one tick and clamp the position into `[0, max_pos]` per axis
    pub fn advance(&mut self, thrust: Thrust, params: &MotionParams, tilt_divisor: f32, dt_ms: f32, max_pos: Vec2) {
        let y_input = thrust.y_axis();
        self.y = step_axis(self.y, y_input, params, dt_ms);
        self.tilt_deg = tilt_degrees(self.y.accel, self.y.vel, y_input.is_coasting(), tilt_divisor);
        self.x = step_axis(self.x, thrust.x_axis(), params, dt_ms);

        let before = self.pos;
        let moved = before + self.velocity() * dt_ms / 1000.0;
        self.pos = moved.clamp(Vec2::ZERO, max_pos.max(Vec2::ZERO));
        self.last_delta = self.pos - before;
    }

    /// Kinematic move with no acceleration model (velocity set directly)
    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
        self.last_delta = delta;
    }

    pub fn undo_x(&mut self) {
        self.pos.x -= self.last_delta.x;
    }

    pub fn undo_y(&mut self) {
        self.pos.y -= self.last_delta.y;
    }

    pub fn redo_x(&mut self) {
        self.pos.x += self.last_delta.x;
    }

    pub fn redo_y(&mut self) {
        self.pos.y += self.last_delta.y;
    }

    /// Forget the displacement once it has been undone
    pub fn settle(&mut self) {
        self.last_delta = Vec2::ZERO;
    }
}
