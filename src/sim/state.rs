//! World state
//!
//! Everything the simulation mutates lives in [`World`]. There are no
//! globals; collaborators hold a `World` and call [`super::tick`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cave::CaveSystem;
use super::enemy::Enemy;
use super::kamikaze::Kamikaze;
use super::player::{Player, PowerUp};
use super::projectile::{Bullet, Explosion, Missile, Owner};
use super::terrain::{Terrain, TerrainGenerator};
use crate::consts::*;
use crate::difficulty::Difficulty;
use crate::tuning::Tuning;

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldPhase {
    Playing,
    /// Player exploded; game over follows after the grace period
    PlayerDestroyed { at_ms: u64 },
    /// Level ended. The score is final.
    GameOver,
}

/// Notable things that happened during a tick, for audio/UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BulletFired { owner: Owner },
    MissileLaunched { homing: bool },
    Ricochet,
    /// Explosion spawned at an absolute position
    Explosion { at: Vec2 },
    PlayerHit { health: i32 },
    EnemyHit { health: i32 },
    EnemyDestroyed,
    KamikazeDetonated,
    StalactiteTriggered { id: u32 },
    CaveSpawned { start_x: f32 },
    CaveExited,
    PowerUpGranted { kind: PowerUp },
    PlayerDestroyed,
    GameOver { score: u64 },
}

/// The complete simulation context
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    pub tuning: Tuning,
    pub difficulty: Difficulty,
    pub(crate) rng: Pcg32,
    /// Simulation clock (ms since level start)
    pub now_ms: u64,
    /// Horizontal scroll offset; the camera's y never changes
    pub camera_x: f32,
    pub phase: WorldPhase,
    pub player: Player,
    /// `None` once destroyed; the enemy does not come back
    pub enemy: Option<Enemy>,
    pub kamikaze: Kamikaze,
    pub bullets: Vec<Bullet>,
    pub missiles: Vec<Missile>,
    pub explosions: Vec<Explosion>,
    pub terrain: Terrain,
    pub cave: Option<CaveSystem>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Build a level for `difficulty` from `seed`
    pub fn new(seed: u64, difficulty: Difficulty, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut next_id = 1;
        let terrain =
            TerrainGenerator::new(&tuning.terrain, difficulty, LEVEL_WIDTH).generate(&mut rng, &mut next_id);
        log::info!("Level start: seed {}, difficulty {}", seed, difficulty.as_str());

        Self {
            seed,
            player: Player::new(&tuning, difficulty),
            enemy: Some(Enemy::new(&tuning.enemy)),
            kamikaze: Kamikaze::new(&tuning.kamikaze),
            tuning,
            difficulty,
            rng,
            now_ms: 0,
            camera_x: 0.0,
            phase: WorldPhase::Playing,
            bullets: Vec::new(),
            missiles: Vec::new(),
            explosions: Vec::new(),
            terrain,
            cave: None,
            events: Vec::new(),
            next_id,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Distance scrolled, in points
    pub fn score(&self) -> u64 {
        (self.camera_x / SCORE_DIVISOR) as u64
    }

    pub fn is_over(&self) -> bool {
        self.phase == WorldPhase::GameOver
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a timed power-up on the player
    pub fn grant_power_up(&mut self, kind: PowerUp) {
        self.player.grant(kind, self.now_ms);
        self.push_event(GameEvent::PowerUpGranted { kind });
    }

    /// Spawn an explosion at a playfield position
    pub fn spawn_explosion(&mut self, rel_center: Vec2) {
        let id = self.next_entity_id();
        let explosion = Explosion::at(id, rel_center, self.camera_x);
        self.push_event(GameEvent::Explosion { at: explosion.center });
        self.explosions.push(explosion);
    }

    /// Drop everything marked destroyed or spent, keeping id order
    pub fn compact(&mut self) {
        self.bullets.retain(|b| !b.destroyed);
        self.missiles.retain(|m| !m.destroyed);
        self.explosions.retain(|e| !e.done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_level() {
        let a = World::new(11, Difficulty::Medium, Tuning::default());
        let b = World::new(11, Difficulty::Medium, Tuning::default());
        assert_eq!(a.terrain.obstacles, b.terrain.obstacles);
        assert_eq!(a.next_id, b.next_id);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut w = World::new(1, Difficulty::Easy, Tuning::default());
        let max_obstacle = w.terrain.obstacles.iter().map(|o| o.id).max().unwrap_or(0);
        let id = w.next_entity_id();
        assert!(id > max_obstacle);
        assert_eq!(w.next_entity_id(), id + 1);
    }

    #[test]
    fn test_score_follows_camera() {
        let mut w = World::new(1, Difficulty::Easy, Tuning::default());
        assert_eq!(w.score(), 0);
        w.camera_x = 12_345.0;
        assert_eq!(w.score(), 123);
    }

    #[test]
    fn test_events_drain_once() {
        let mut w = World::new(1, Difficulty::Easy, Tuning::default());
        w.grant_power_up(PowerUp::Autofire);
        w.spawn_explosion(Vec2::new(10.0, 10.0));
        assert_eq!(w.drain_events().len(), 2);
        assert!(w.drain_events().is_empty());
        assert!(w.player.has(PowerUp::Autofire, 0));
    }

    #[test]
    fn test_compact_removes_marked() {
        let mut w = World::new(1, Difficulty::Easy, Tuning::default());
        let t = w.tuning.projectile.clone();
        for i in 0..4 {
            let mut b = Bullet::new(i, Vec2::ZERO, Vec2::X, Owner::Player, &t);
            b.destroyed = i % 2 == 0;
            w.bullets.push(b);
        }
        w.compact();
        let ids: Vec<u32> = w.bullets.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
