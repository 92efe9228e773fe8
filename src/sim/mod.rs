//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time is passed in, never read from a live clock
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids ascending)
//! - No rendering, audio or platform dependencies

pub mod aabb;
pub mod cave;
pub mod clock;
pub mod collision;
pub mod enemy;
pub mod input;
pub mod kamikaze;
pub mod motion;
pub mod player;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod weapon;

pub use aabb::{Aabb, Damageable, HasHitbox, HasPosition, HasVelocity};
pub use cave::{CavePathSequence, CaveSystem};
pub use clock::{FrameTimer, ManualClock, SystemClock, TimeSource};
pub use collision::{Boundary, Ricochet, blast_damage, intersects};
pub use input::{Direction, Intent, Key, KeyEvent, KeyEventKind, map_key_event};
pub use motion::{AxisInput, AxisState, MotionParams, MovementState, Thrust, step_axis};
pub use player::{Player, PowerUp};
pub use projectile::{Bullet, Explosion, Missile, Owner};
pub use snapshot::{HeatBar, Snapshot, Sprite, SpriteKind};
pub use state::{GameEvent, World, WorldPhase};
pub use terrain::{FallState, Obstacle, ObstacleKind, Terrain, TerrainGenerator};
pub use tick::{TickInput, tick};
pub use weapon::{HeatDecay, WeaponHeat};
