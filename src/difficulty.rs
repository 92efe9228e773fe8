//! Difficulty levels
//!
//! Chosen once by the menu collaborator before a level starts and threaded
//! through damage mitigation, kamikaze respawn delay, obstacle density and
//! cave corridor width.

use serde::{Deserialize, Serialize};

/// Difficulty selected at level start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Menu value that means "quit" rather than a difficulty
    pub const QUIT_SENTINEL: i32 = 4;

    /// Map the menu's integer selection (1-3). The quit sentinel and any
    /// other value yield `None`.
    pub fn from_menu(value: i32) -> Option<Self> {
        match value {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Medium),
            3 => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_menu(&self) -> i32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" | "1" => Some(Difficulty::Easy),
            "medium" | "med" | "2" => Some(Difficulty::Medium),
            "hard" | "3" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Divisor applied to every hit the player takes
    pub fn damage_divisor(&self) -> f32 {
        match self {
            Difficulty::Easy => 2.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 1.0,
        }
    }

    /// Player damage after mitigation (truncating)
    pub fn mitigate(&self, damage: i32) -> i32 {
        (damage as f32 / self.damage_divisor()) as i32
    }

    /// Delay before a kamikaze that left the screen comes back (ms)
    pub fn kamikaze_respawn_delay_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 500,
            Difficulty::Medium => 300,
            Difficulty::Hard => 100,
        }
    }

    /// Fraction of the configured obstacle counts actually placed
    pub fn obstacle_density(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 0.75,
            Difficulty::Hard => 1.0,
        }
    }

    /// Cave corridor gap height in pixels
    pub fn cave_gap(&self) -> f32 {
        match self {
            Difficulty::Easy => 216.0,
            Difficulty::Medium => 180.0,
            Difficulty::Hard => 150.0,
        }
    }
}
