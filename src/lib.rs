//! Cavern Raid - simulation core for a side-scrolling cave shooter
//!
//! Core modules:
//! - `sim`: World state, motion, collisions, weapons, terrain and AI
//! - `difficulty`: Difficulty levels and their balance tables
//! - `tuning`: Data-driven game balance (JSON loadable)
//!
//! Rendering, audio, menus and high-score files live outside this crate and
//! only ever read [`sim::Snapshot`] / [`sim::World::score`].

pub mod difficulty;
pub mod sim;
pub mod tuning;

pub use difficulty::Difficulty;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Playfield (screen) dimensions
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Level length (world space)
    pub const LEVEL_WIDTH: f32 = 100_000.0;

    /// Horizontal camera scroll (pixels/s)
    pub const SCROLL_SPEED: f32 = 420.0;
    /// Camera pixels per point of score
    pub const SCORE_DIVISOR: f32 = 100.0;

    /// Side length of the wall blocks lining roof and floor
    pub const WALL_BLOCK_SIDE: f32 = 72.0;
    /// Lowest y a projectile may reach before hitting the floor band
    pub const FLOOR_BOTTOM: f32 = SCREEN_HEIGHT - 79.0;
    /// Highest y a projectile may reach before hitting the roof band
    pub const ROOF_TOP: f32 = 73.0;
    /// Clearance kept between a turret and the roof/floor bands
    pub const TURRET_MARGIN: f32 = 10.0;

    /// Player sprite box
    pub const PLAYER_WIDTH: f32 = 125.0;
    pub const PLAYER_HEIGHT: f32 = 53.0;
    /// Hurt box inset from the sprite box on every side
    pub const PLAYER_HURT_INSET: f32 = 12.0;
    /// Maximum per-axis player speed (pixels/s)
    pub const MAX_PLAYER_VEL: f32 = 600.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;

    /// Enemy and kamikaze sprite box
    pub const CRAFT_WIDTH: f32 = 125.0;
    pub const CRAFT_HEIGHT: f32 = 53.0;

    /// Sprite animation frame period (ms)
    pub const ANIMATION_FREQ_MS: u64 = 100;

    /// Cave system geometry
    pub const CAVE_BLOCK_WIDTH: f32 = 72.0;
    pub const CAVE_BLOCK_HEIGHT: f32 = 72.0;
    pub const CAVE_SEGMENTS: usize = 40;
    pub const CAVE_PIXEL_WIDTH: f32 = CAVE_BLOCK_WIDTH * CAVE_SEGMENTS as f32;
    /// A cave activates every time the camera crosses a multiple of this
    pub const CAVE_FREQ: f32 = 10_000.0;
}
