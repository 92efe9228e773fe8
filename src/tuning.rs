//! Data-driven game balance
//!
//! Gameplay tuning lives here, separate from the fixed geometry in
//! [`crate::consts`]. Every section deserializes with defaults so a JSON file
//! only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FLOOR_BOTTOM, ROOF_TOP, TURRET_MARGIN};

/// Failure to load a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Player craft handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Acceleration gained per millisecond of thrust, per millisecond of tick
    pub accel_rate: f32,
    /// Multiplier on the acceleration step while coasting
    pub decay_factor: f32,
    /// Velocity gained per unit acceleration per millisecond
    pub velocity_gain: f32,
    /// Hard clamp on acceleration magnitude
    pub max_accel: f32,
    /// Per-axis speed clamp (pixels/s)
    pub max_vel: f32,
    /// Divisor inside the tilt sine curve
    pub tilt_divisor: f32,
    /// Forward thrust key gives an instant full-speed kick
    pub forward_kick: bool,
    /// Post-hit invulnerability window (ms)
    pub flicker_ms: u64,
    /// Visibility toggle period during flicker (ms)
    pub flicker_freq_ms: u64,
    /// Time between the player exploding and game over (ms)
    pub destroyed_grace_ms: u64,
    /// Duration of each timed power-up (ms)
    pub power_up_ms: u64,
    pub max_health: i32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            accel_rate: 0.003,
            decay_factor: 4.0,
            velocity_gain: 2.0,
            max_accel: 3.0,
            max_vel: crate::consts::MAX_PLAYER_VEL,
            tilt_divisor: 12.0,
            forward_kick: true,
            flicker_ms: 1000,
            flicker_freq_ms: 100,
            destroyed_grace_ms: 1000,
            power_up_ms: 5000,
            max_health: crate::consts::PLAYER_MAX_HEALTH,
        }
    }
}

/// Heat parameters for one gun
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub max_heat: f32,
    /// Heat added per accepted shot
    pub shot_cost: f32,
    /// Minimum time between two shots of the same gun (ms)
    pub min_interval_ms: u64,
    /// Time a maxed gun stays locked before it starts venting (ms)
    pub cooldown_ms: u64,
    /// Passive heat loss per millisecond while not maxed
    pub recovery_per_ms: f32,
    /// Heat vented per millisecond once a lockout has cooled down
    pub lockout_vent_per_ms: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            max_heat: 100.0,
            shot_cost: 20.0,
            min_interval_ms: 100,
            cooldown_ms: 1000,
            recovery_per_ms: 0.02,
            // One tenth of a shot per 16 ms frame
            lockout_vent_per_ms: 20.0 / 10.0 / 16.0,
        }
    }
}

impl WeaponTuning {
    /// The enemy's slower, hotter gun
    pub fn enemy() -> Self {
        Self {
            shot_cost: 25.0,
            min_interval_ms: 400,
            cooldown_ms: 2000,
            recovery_per_ms: 0.01,
            ..Self::default()
        }
    }
}

/// Pursuing enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub max_health: i32,
    pub max_vel: f32,
    pub accel_rate: f32,
    /// Horizontal distance the enemy tries to keep behind the player
    pub standoff: f32,
    pub player_weight: f32,
    /// Hazards farther than this are ignored by the steering blend
    pub avoid_range: f32,
    /// Numerator of the inverse-distance avoidance weight
    pub avoid_weight: f32,
    pub cave_weight: f32,
    /// Distance before a corridor at which the enemy starts lining up
    pub cave_lookahead: f32,
    /// Vertical misalignment (px) under which the enemy opens fire
    pub fire_alignment: f32,
    /// Steering components smaller than this count as "no thrust"
    pub steer_dead_zone: f32,
    /// Minimum time between two ramming hits taken from the player (ms)
    pub contact_cooldown_ms: u64,
    pub weapon: WeaponTuning,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_vel: 300.0,
            accel_rate: 0.002,
            standoff: 300.0,
            player_weight: 1.0,
            avoid_range: 200.0,
            avoid_weight: 150.0,
            cave_weight: 2.0,
            cave_lookahead: 400.0,
            fire_alignment: 40.0,
            steer_dead_zone: 0.15,
            contact_cooldown_ms: 1000,
            weapon: WeaponTuning::enemy(),
        }
    }
}

/// Suicide unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KamikazeTuning {
    /// Leftward cruise speed (pixels/s)
    pub speed: f32,
    pub max_vel_y: f32,
    pub accel_rate: f32,
    /// Arrival delay after being shot or colliding (ms)
    pub hit_respawn_ms: u64,
    /// Arrival delay of the very first kamikaze (ms)
    pub initial_arrival_ms: u64,
    /// Arrival delay once a cave ends (ms)
    pub post_cave_respawn_ms: u64,
}

impl Default for KamikazeTuning {
    fn default() -> Self {
        Self {
            speed: 500.0,
            max_vel_y: 400.0,
            accel_rate: 0.004,
            hit_respawn_ms: 1000,
            initial_arrival_ms: 1000,
            post_cave_respawn_ms: 50,
        }
    }
}

/// Bullets, missiles and contact damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    pub bullet_width: f32,
    pub bullet_height: f32,
    /// Chance a bullet bounces off the floor or roof instead of breaking
    pub bullet_ricochet_chance: f64,
    pub missile_speed: f32,
    /// Homing turn rate (degrees/s)
    pub missile_turn_rate: f32,
    pub missile_blast_radius: f32,
    /// Damage at the blast center
    pub missile_damage: f32,
    pub missile_width: f32,
    pub missile_height: f32,
    /// Chance a missile bounces off the floor or roof instead of detonating
    pub missile_ricochet_chance: f64,
    /// Damage of craft-to-craft contact
    pub contact_damage: i32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            bullet_speed: 450.0,
            bullet_damage: 5,
            bullet_width: 12.0,
            bullet_height: 6.0,
            bullet_ricochet_chance: 0.6,
            missile_speed: 250.0,
            missile_turn_rate: 90.0,
            missile_blast_radius: 150.0,
            missile_damage: 30.0,
            missile_width: 30.0,
            missile_height: 12.0,
            missile_ricochet_chance: 0.3,
            contact_damage: 10,
        }
    }
}

/// Procedural level features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTuning {
    /// Counts at full density (hard); scaled down by difficulty
    pub stalagmites: usize,
    pub stalactites: usize,
    pub turrets: usize,
    pub turret_size: f32,
    pub turret_fire_interval_ms: u64,
    /// Chance a turret launches a homing rather than ballistic missile
    pub homing_chance: f64,
    /// Stalactite fall acceleration (pixels/ms²)
    pub stalactite_gravity: f32,
    /// Stalactite terminal velocity (pixels/s)
    pub stalactite_terminal_vel: f32,
    /// Minimum open-air start, in wall blocks
    pub open_air_min_start: u32,
    /// Open-air length is `min + rand % span` wall blocks
    pub open_air_min_len: u32,
    pub open_air_len_span: u32,
}

impl Default for TerrainTuning {
    fn default() -> Self {
        Self {
            stalagmites: 50,
            stalactites: 50,
            turrets: 100,
            turret_size: 100.0,
            turret_fire_interval_ms: 2500,
            homing_chance: 0.5,
            stalactite_gravity: 0.002,
            stalactite_terminal_vel: 600.0,
            open_air_min_start: 50,
            open_air_min_len: 100,
            open_air_len_span: 200,
        }
    }
}

/// Complete tuning table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    /// Front and back player guns share one heat profile
    pub weapon: WeaponTuning,
    pub enemy: EnemyTuning,
    pub kamikaze: KamikazeTuning,
    pub projectile: ProjectileTuning,
    pub terrain: TerrainTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys, serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values the simulation cannot saturate its way out of
    pub fn validate(&self) -> Result<(), TuningError> {
        let probability = |field, p: f64| {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(TuningError::Invalid { field, reason: "must be within [0, 1]" })
            }
        };
        let positive = |field, v: f32| {
            if v > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid { field, reason: "must be positive" })
            }
        };

        probability("projectile.bullet_ricochet_chance", self.projectile.bullet_ricochet_chance)?;
        probability("projectile.missile_ricochet_chance", self.projectile.missile_ricochet_chance)?;
        probability("terrain.homing_chance", self.terrain.homing_chance)?;
        positive("player.max_vel", self.player.max_vel)?;
        positive("player.max_accel", self.player.max_accel)?;
        positive("weapon.max_heat", self.weapon.max_heat)?;
        positive("enemy.weapon.max_heat", self.enemy.weapon.max_heat)?;
        positive("projectile.missile_blast_radius", self.projectile.missile_blast_radius)?;
        positive("terrain.stalactite_terminal_vel", self.terrain.stalactite_terminal_vel)?;
        positive("terrain.stalactite_gravity", self.terrain.stalactite_gravity)?;
        positive("terrain.turret_size", self.terrain.turret_size)?;
        if self.terrain.turret_size >= FLOOR_BOTTOM - ROOF_TOP - 2.0 * TURRET_MARGIN {
            return Err(TuningError::Invalid {
                field: "terrain.turret_size",
                reason: "must fit between roof and floor",
            });
        }
        if self.player.flicker_freq_ms == 0 {
            return Err(TuningError::Invalid {
                field: "player.flicker_freq_ms",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "weapon": { "shot_cost": 25.0 } }"#).unwrap();
        assert_eq!(tuning.weapon.shot_cost, 25.0);
        assert_eq!(tuning.weapon.max_heat, 100.0);
        assert_eq!(tuning.player, PlayerTuning::default());
    }

    #[test]
    fn test_round_trip_through_json() {
        let tuning = Tuning::default();
        let parsed = Tuning::from_json_str(&tuning.to_json()).unwrap();
        assert_eq!(parsed, tuning);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json_str(r#"{ "projectile": { "bullet_ricochet_chance": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid { field: "projectile.bullet_ricochet_chance", .. }
        ));
    }

    #[test]
    fn test_rejects_turret_taller_than_cave() {
        let err = Tuning::from_json_str(r#"{ "terrain": { "turret_size": 548.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "terrain.turret_size", .. }));
        assert!(Tuning::from_json_str(r#"{ "terrain": { "turret_size": 500.0 } }"#).is_ok());
    }

    #[test]
    fn test_rejects_weightless_stalactites() {
        let err = Tuning::from_json_str(r#"{ "terrain": { "stalactite_gravity": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid { field: "terrain.stalactite_gravity", .. }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
