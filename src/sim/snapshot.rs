//! Read-only render view of the world
//!
//! The renderer never touches [`World`] directly. It asks for a [`Snapshot`]
//! once per frame and draws what it finds.

use glam::Vec2;
use serde::Serialize;

use super::aabb::{Damageable, HasHitbox, HasPosition, HasVelocity};
use super::player::PowerUp;
use super::state::{World, WorldPhase};
use super::terrain::ObstacleKind;
use super::weapon::WeaponHeat;
use crate::consts::*;

/// Frames in every craft animation cycle
pub const ANIMATION_FRAMES: u64 = 4;

/// Current animation frame for a looping sprite
pub fn animation_frame(now_ms: u64) -> u32 {
    ((now_ms / ANIMATION_FREQ_MS) % ANIMATION_FRAMES) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpriteKind {
    Player,
    Enemy,
    Kamikaze,
    Bullet,
    Missile,
    Stalagmite,
    Stalactite,
    Turret,
    CaveWall,
}

/// One drawable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub id: u32,
    /// Top-left corner in playfield coordinates
    pub pos: Vec2,
    pub size: Vec2,
    /// For interpolation between snapshots (pixels/s)
    pub vel: Vec2,
    /// Rotation in degrees
    pub angle_deg: f32,
    pub frame: u32,
    /// Which texture variant to use
    pub variant: u8,
    pub visible: bool,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatBar {
    pub fraction: f32,
    pub maxed: bool,
}

impl From<&WeaponHeat> for HeatBar {
    fn from(w: &WeaponHeat) -> Self {
        Self {
            fraction: w.fraction(),
            maxed: w.is_maxed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExplosionView {
    /// Playfield coordinates
    pub center: Vec2,
    pub radius: f32,
}

/// Everything a frame needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub now_ms: u64,
    pub camera_x: f32,
    pub score: u64,
    pub phase: WorldPhase,
    pub player_health: i32,
    pub player_max_health: i32,
    pub enemy_health: Option<i32>,
    pub front_heat: HeatBar,
    pub back_heat: HeatBar,
    pub power_ups: Vec<PowerUp>,
    pub sprites: Vec<Sprite>,
    pub explosions: Vec<ExplosionView>,
}

fn craft_sprite<E>(kind: SpriteKind, id: u32, craft: &E, size: Vec2, angle_deg: f32, now_ms: u64) -> Sprite
where
    E: HasPosition + HasVelocity + HasHitbox,
{
    Sprite {
        kind,
        id,
        pos: craft.position(),
        size,
        vel: craft.velocity(),
        angle_deg,
        frame: animation_frame(now_ms),
        variant: 0,
        visible: true,
        alive: true,
    }
}

impl World {
    /// Build the render view for the current tick
    pub fn snapshot(&self) -> Snapshot {
        let now = self.now_ms;
        let mut sprites = Vec::new();

        let player_alive = self.phase == WorldPhase::Playing;
        let mut player = craft_sprite(
            SpriteKind::Player,
            0,
            &self.player,
            self.player.bounds().size(),
            self.player.movement.tilt_deg,
            now,
        );
        player.visible = player_alive && self.player.visible(now);
        player.alive = player_alive;
        sprites.push(player);

        if let Some(enemy) = &self.enemy {
            sprites.push(craft_sprite(
                SpriteKind::Enemy,
                0,
                enemy,
                enemy.hitbox().size(),
                enemy.movement.tilt_deg,
                now,
            ));
        }

        let mut kamikaze = craft_sprite(
            SpriteKind::Kamikaze,
            0,
            &self.kamikaze,
            self.kamikaze.hitbox().size(),
            0.0,
            now,
        );
        kamikaze.visible = self.kamikaze.can_blast(now);
        sprites.push(kamikaze);

        for o in self.terrain.visible() {
            let kind = match o.kind {
                ObstacleKind::Stalagmite => SpriteKind::Stalagmite,
                ObstacleKind::Stalactite(_) => SpriteKind::Stalactite,
                ObstacleKind::Turret { .. } => SpriteKind::Turret,
            };
            sprites.push(Sprite {
                kind,
                id: o.id,
                pos: o.rel,
                size: o.size,
                vel: Vec2::new(-SCROLL_SPEED, 0.0),
                angle_deg: 0.0,
                frame: 0,
                variant: o.variant,
                visible: true,
                alive: true,
            });
        }

        if let Some(cave) = &self.cave {
            for block in cave.blocks(self.camera_x).filter(|b| b.max.x >= 0.0 && b.min.x <= SCREEN_WIDTH) {
                sprites.push(Sprite {
                    kind: SpriteKind::CaveWall,
                    id: 0,
                    pos: block.min,
                    size: block.size(),
                    vel: Vec2::new(-SCROLL_SPEED, 0.0),
                    angle_deg: 0.0,
                    frame: 0,
                    variant: 0,
                    visible: true,
                    alive: true,
                });
            }
        }

        for b in &self.bullets {
            sprites.push(Sprite {
                kind: SpriteKind::Bullet,
                id: b.id,
                pos: b.position(),
                size: b.size,
                vel: b.velocity(),
                angle_deg: b.vel.y.atan2(b.vel.x).to_degrees(),
                frame: 0,
                variant: 0,
                visible: !b.destroyed,
                alive: !b.destroyed,
            });
        }
        for m in &self.missiles {
            let mut sprite = craft_sprite(SpriteKind::Missile, m.id, m, m.size, m.angle().to_degrees(), now);
            sprite.variant = m.homing as u8;
            sprites.push(sprite);
        }

        let explosions = self
            .explosions
            .iter()
            .map(|e| ExplosionView {
                center: e.rel_center(self.camera_x),
                radius: e.radius,
            })
            .collect();

        let power_ups = [PowerUp::InfiniteAmmo, PowerUp::Invincible, PowerUp::Autofire]
            .into_iter()
            .filter(|&k| self.player.has(k, now))
            .collect();

        Snapshot {
            now_ms: now,
            camera_x: self.camera_x,
            score: self.score(),
            phase: self.phase,
            player_health: self.player.health(),
            player_max_health: self.player.max_health(),
            enemy_health: self.enemy.as_ref().map(|e| e.health()),
            front_heat: HeatBar::from(&self.player.front_gun),
            back_heat: HeatBar::from(&self.player.back_gun),
            power_ups,
            sprites,
            explosions,
        }
    }
}
