//! Static level features and their procedural placement
//!
//! Obstacles store absolute world coordinates and are projected into the
//! playfield every tick. Stalagmites grow from the floor, stalactites hang
//! from the roof (and drop once shot), turrets float and launch missiles.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, HasHitbox};
use super::cave::cave_spans;
use super::collision::intersects;
use crate::consts::*;
use crate::difficulty::Difficulty;
use crate::tuning::TerrainTuning;

/// Attempts to find a legal x for one obstacle before giving up on it
const PLACEMENT_ATTEMPTS: u32 = 16;

/// Half-open horizontal world span `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.start && x < self.end
    }

    /// Whether `[x0, x1]` touches this span
    pub fn overlaps(&self, x0: f32, x1: f32) -> bool {
        x1 >= self.start && x0 < self.end
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Drop sequence of a stalactite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FallState {
    /// Hanging, waiting to be shot
    Dormant,
    /// Shot this tick; starts falling on the next update
    Triggered,
    /// Dropping at `vel` pixels/s
    Falling { vel: f32 },
    /// Landed on the floor, fixed for good
    Resting,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Stalagmite,
    Stalactite(FallState),
    /// Flying block that launches missiles
    Turret { last_fire_ms: Option<u64> },
}

/// A terrain obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Absolute top-left corner
    pub abs: Vec2,
    /// Top-left corner relative to the camera
    pub rel: Vec2,
    pub size: Vec2,
    /// Which sprite/shape variant the renderer should draw
    pub variant: u8,
}

impl HasHitbox for Obstacle {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.rel, self.size)
    }
}

impl Obstacle {
    /// Part of the current playfield
    pub fn on_screen(&self) -> bool {
        self.rel.x + self.size.x >= 0.0 && self.rel.x <= SCREEN_WIDTH
    }

    pub fn is_turret(&self) -> bool {
        matches!(self.kind, ObstacleKind::Turret { .. })
    }

    /// A bullet struck this obstacle; dormant stalactites start to drop
    pub fn shot(&mut self) -> bool {
        if let ObstacleKind::Stalactite(state @ FallState::Dormant) = &mut self.kind {
            *state = FallState::Triggered;
            log::debug!("Stalactite {} triggered", self.id);
            return true;
        }
        false
    }

    /// Advance a stalactite's drop by `dt_ms`
    fn update_fall(&mut self, dt_ms: f32, gravity: f32, terminal_vel: f32) {
        let floor = SCREEN_HEIGHT - WALL_BLOCK_SIDE;
        let ObstacleKind::Stalactite(state) = &mut self.kind else {
            return;
        };
        match *state {
            FallState::Dormant | FallState::Resting => {}
            FallState::Triggered => *state = FallState::Falling { vel: 0.0 },
            FallState::Falling { vel } => {
                let vel = (vel + gravity * dt_ms * 1000.0).min(terminal_vel);
                self.abs.y += vel * dt_ms / 1000.0;
                if self.abs.y + self.size.y >= floor {
                    self.abs.y = floor - self.size.y;
                    *state = FallState::Resting;
                } else {
                    *state = FallState::Falling { vel };
                }
            }
        }
    }
}

/// All obstacles of one level plus the band kept free of them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Terrain {
    pub obstacles: Vec<Obstacle>,
    /// Stretch of the level with no stalagmites or stalactites
    pub open_air: Option<Span>,
}

impl Terrain {
    /// Recompute camera-relative coordinates
    pub fn project(&mut self, camera_x: f32) {
        for o in &mut self.obstacles {
            o.rel = Vec2::new(o.abs.x - camera_x, o.abs.y);
        }
    }

    /// Advance falling stalactites
    pub fn update(&mut self, dt_ms: u32, tuning: &TerrainTuning) {
        for o in &mut self.obstacles {
            o.update_fall(dt_ms as f32, tuning.stalactite_gravity, tuning.stalactite_terminal_vel);
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(|o| o.on_screen())
    }

    /// Index of the first on-screen obstacle overlapping `hitbox`
    pub fn obstacle_hit(&self, hitbox: &Aabb) -> Option<usize> {
        self.obstacles
            .iter()
            .position(|o| o.on_screen() && intersects(&o.hitbox(), hitbox))
    }

    /// Overlaps the roof or floor wall bands
    pub fn wall_hit(hitbox: &Aabb) -> bool {
        hitbox.min.y <= WALL_BLOCK_SIDE || hitbox.max.y >= SCREEN_HEIGHT - WALL_BLOCK_SIDE
    }

    /// Overlaps any solid piece of terrain
    pub fn solid_hit(&self, hitbox: &Aabb) -> bool {
        Self::wall_hit(hitbox) || self.obstacle_hit(hitbox).is_some()
    }

    /// On-screen turrets whose fire interval has elapsed. Returns the hitbox
    /// of each turret that fired.
    pub fn fire_turrets(&mut self, now_ms: u64, interval_ms: u64) -> Vec<Aabb> {
        let mut fired = Vec::new();
        for o in self.obstacles.iter_mut().filter(|o| o.on_screen()) {
            if let ObstacleKind::Turret { last_fire_ms } = &mut o.kind {
                let ready = match *last_fire_ms {
                    Some(last) => now_ms.saturating_sub(last) >= interval_ms,
                    None => true,
                };
                if ready {
                    *last_fire_ms = Some(now_ms);
                    fired.push(Aabb::new(o.rel, o.size));
                }
            }
        }
        fired
    }
}

/// Places obstacles for one level
#[derive(Debug, Clone)]
pub struct TerrainGenerator<'a> {
    pub tuning: &'a TerrainTuning,
    pub difficulty: Difficulty,
    pub level_width: f32,
}

impl<'a> TerrainGenerator<'a> {
    pub fn new(tuning: &'a TerrainTuning, difficulty: Difficulty, level_width: f32) -> Self {
        Self {
            tuning,
            difficulty,
            level_width,
        }
    }

    /// Pick the open-air band in wall-block units
    pub fn open_air<R: Rng + ?Sized>(&self, rng: &mut R) -> Span {
        let blocks = ((self.level_width - 50.0) / WALL_BLOCK_SIDE).max(1.0) as u32;
        let start = rng.random_range(0..blocks) + self.tuning.open_air_min_start;
        let len = rng.random_range(0..self.tuning.open_air_len_span.max(1)) + self.tuning.open_air_min_len;
        let start = start as f32 * WALL_BLOCK_SIDE;
        Span::new(start, start + len as f32 * WALL_BLOCK_SIDE)
    }

    /// Generate the whole level. `next_id` supplies entity ids.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, next_id: &mut u32) -> Terrain {
        let open_air = self.open_air(rng);
        let caves = cave_spans(self.level_width);
        let density = self.difficulty.obstacle_density();
        let scaled = |n: usize| (n as f32 * density).round() as usize;

        let plan = [
            (ObstacleKind::Stalagmite, scaled(self.tuning.stalagmites)),
            (ObstacleKind::Stalactite(FallState::Dormant), scaled(self.tuning.stalactites)),
            (ObstacleKind::Turret { last_fire_ms: None }, scaled(self.tuning.turrets)),
        ];
        let mut obstacles = Vec::new();
        for (kind, count) in plan {
            for _ in 0..count {
                if let Some(o) = self.place_one(kind, &mut *rng, &open_air, &caves, &mut *next_id) {
                    obstacles.push(o);
                }
            }
        }

        obstacles.sort_by(|a, b| a.abs.x.total_cmp(&b.abs.x));
        log::info!(
            "Generated {} obstacles ({:?}), open air {:.0}..{:.0}",
            obstacles.len(),
            self.difficulty,
            open_air.start,
            open_air.end
        );

        Terrain {
            obstacles,
            open_air: Some(open_air),
        }
    }

    fn place_one<R: Rng + ?Sized>(
        &self,
        kind: ObstacleKind,
        rng: &mut R,
        open_air: &Span,
        caves: &[Span],
        next_id: &mut u32,
    ) -> Option<Obstacle> {
        let (size, variant) = match kind {
            ObstacleKind::Turret { .. } => (Vec2::splat(self.tuning.turret_size), rng.random_range(0..2u8)),
            _ => (
                Vec2::new(rng.random_range(60.0..100.0), rng.random_range(100.0..300.0)),
                rng.random_range(0..4u8),
            ),
        };
        // Keep the first screen clear so the player never spawns inside rock
        let min_x = SCREEN_WIDTH;
        let max_x = self.level_width - size.x;
        if max_x <= min_x {
            return None;
        }

        for _ in 0..PLACEMENT_ATTEMPTS {
            let x = rng.random_range(min_x..max_x);
            let x1 = x + size.x;
            if caves.iter().any(|c| c.overlaps(x, x1)) {
                continue;
            }
            let vertical = !matches!(kind, ObstacleKind::Turret { .. });
            if vertical && open_air.overlaps(x, x1) {
                continue;
            }
            let y = match kind {
                ObstacleKind::Stalagmite => SCREEN_HEIGHT - WALL_BLOCK_SIDE - size.y,
                ObstacleKind::Stalactite(_) => WALL_BLOCK_SIDE,
                ObstacleKind::Turret { .. } => {
                    rng.random_range(ROOF_TOP + TURRET_MARGIN..FLOOR_BOTTOM - size.y - TURRET_MARGIN)
                }
            };
            let id = *next_id;
            *next_id += 1;
            let abs = Vec2::new(x, y);
            return Some(Obstacle {
                id,
                kind,
                abs,
                rel: abs,
                size,
                variant,
            });
        }
        None
    }
}
