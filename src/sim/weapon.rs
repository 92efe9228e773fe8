//! Weapon heat and fire-rate limiting
//!
//! Each gun accumulates heat per shot. Reaching the heat ceiling locks the gun
//! ("maxed") until a cooldown has elapsed and the heat has vented to zero.
//! All accumulation and decay is scaled by elapsed milliseconds.

use serde::{Deserialize, Serialize};

use crate::tuning::WeaponTuning;

/// Which decay path an update took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatDecay {
    /// Locked and still inside the cooldown
    None,
    /// Normal recovery while not maxed
    Passive,
    /// Venting after the lockout cooldown
    Lockout,
}

/// Heat state of one gun
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponHeat {
    tuning: WeaponTuning,
    heat: f32,
    maxed: bool,
    last_shot_ms: Option<u64>,
    maxed_at_ms: u64,
}

impl WeaponHeat {
    pub fn new(tuning: WeaponTuning) -> Self {
        Self {
            tuning,
            heat: 0.0,
            maxed: false,
            last_shot_ms: None,
            maxed_at_ms: 0,
        }
    }

    #[inline]
    pub fn heat(&self) -> f32 {
        self.heat
    }

    #[inline]
    pub fn is_maxed(&self) -> bool {
        self.maxed
    }

    /// Heat as a 0..=1 fraction for HUD bars
    pub fn fraction(&self) -> f32 {
        (self.heat / self.tuning.max_heat).clamp(0.0, 1.0)
    }

    pub fn tuning(&self) -> &WeaponTuning {
        &self.tuning
    }

    /// Not locked out and the minimum shot interval has passed
    pub fn can_fire(&self, now_ms: u64) -> bool {
        if self.maxed {
            return false;
        }
        match self.last_shot_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.tuning.min_interval_ms,
            None => true,
        }
    }

    /// Attempt a shot. `free_shot` skips heat (infinite ammo power-up).
    /// Returns whether the shot was accepted.
    pub fn try_fire(&mut self, now_ms: u64, free_shot: bool) -> bool {
        if !self.can_fire(now_ms) {
            return false;
        }
        if !free_shot {
            self.heat += self.tuning.shot_cost;
            if self.heat >= self.tuning.max_heat {
                self.heat = self.tuning.max_heat;
                self.maxed = true;
                self.maxed_at_ms = now_ms;
                log::debug!("Weapon maxed at {} ms", now_ms);
            }
        }
        self.last_shot_ms = Some(now_ms);
        true
    }

    /// Per-tick decay. Exactly one path runs per call.
    pub fn update(&mut self, now_ms: u64, dt_ms: u32) -> HeatDecay {
        let dt = dt_ms as f32;
        if self.maxed {
            if now_ms.saturating_sub(self.maxed_at_ms) <= self.tuning.cooldown_ms {
                return HeatDecay::None;
            }
            self.heat = (self.heat - self.tuning.lockout_vent_per_ms * dt).max(0.0);
            if self.heat <= 0.0 {
                self.maxed = false;
                log::debug!("Weapon lockout cleared at {} ms", now_ms);
            }
            HeatDecay::Lockout
        } else {
            self.heat = (self.heat - self.tuning.recovery_per_ms * dt).max(0.0);
            HeatDecay::Passive
        }
    }

    /// Clear heat and any lockout
    pub fn reset(&mut self) {
        self.heat = 0.0;
        self.maxed = false;
    }
}
