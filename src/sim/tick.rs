//! Per-frame simulation step
//!
//! [`tick`] is the only way the world advances. Phases run in a fixed order
//! and collision resolution only marks entities; removal happens once at the
//! end of the tick.

use glam::Vec2;
use rand::Rng;

use super::aabb::{Aabb, Damageable, HasHitbox};
use super::cave::CaveSystem;
use super::collision::{
    Boundary, Ricochet, blast_damage, boundary_contact, bounce_off, collide, contact_radius,
    revert_on_overlap, roll_ricochet,
};
use super::enemy::{Enemy, SteeringContext};
use super::input::Intent;
use super::player::{Player, PowerUp};
use super::projectile::{Missile, Owner};
use super::state::{GameEvent, World, WorldPhase};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub intents: Vec<Intent>,
}

impl TickInput {
    pub fn new(intents: Vec<Intent>) -> Self {
        Self { intents }
    }
}

/// Which gun a fire request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gun {
    Front,
    Back,
}

/// Advance the world by `dt_ms` milliseconds
pub fn tick(world: &mut World, input: &TickInput, dt_ms: u32) {
    if world.phase == WorldPhase::GameOver {
        return;
    }
    world.now_ms += dt_ms as u64;
    let now = world.now_ms;

    // The rest of the world keeps running while the player's wreck burns
    if let WorldPhase::PlayerDestroyed { at_ms } = world.phase {
        if now.saturating_sub(at_ms) >= world.tuning.player.destroyed_grace_ms {
            end_game(world);
            return;
        }
    }
    let player_active = player_in_play(world);

    // Scroll, then drop rock and place it for this frame
    let prev_camera = world.camera_x;
    world.camera_x = (world.camera_x + SCROLL_SPEED * dt_ms as f32 / 1000.0).min(LEVEL_WIDTH - SCREEN_WIDTH);
    let scroll_dx = world.camera_x - prev_camera;
    world.terrain.update(dt_ms, &world.tuning.terrain);
    world.terrain.project(world.camera_x);

    // Intents
    for intent in &input.intents {
        match *intent {
            Intent::RequestGameOver => {
                end_game(world);
                return;
            }
            _ if !player_active => {}
            Intent::Thrust { .. } => world.player.apply_intent(intent),
            Intent::FireForward => fire_player(world, Gun::Front),
            Intent::FireBack => fire_player(world, Gun::Back),
        }
    }
    if player_active && world.player.has(PowerUp::Autofire, now) {
        fire_player(world, Gun::Front);
        fire_player(world, Gun::Back);
    }

    if world.kamikaze.off_left() {
        let delay = world.difficulty.kamikaze_respawn_delay_ms();
        world.kamikaze.respawn(now, delay);
    }

    if player_active {
        world.player.advance(dt_ms);
        world.player.update(now, dt_ms);
    }

    update_enemy(world, dt_ms);
    update_kamikaze(world, dt_ms);

    for b in &mut world.bullets {
        b.step(dt_ms);
    }
    let homing_target = player_active.then(|| world.player.center());
    for m in &mut world.missiles {
        m.step(dt_ms, homing_target, scroll_dx);
    }
    // Fresh missiles start moving next tick
    fire_turrets(world);

    resolve_craft_vs_terrain(world, scroll_dx);
    resolve_bullets(world);
    resolve_missiles(world);
    resolve_craft_contacts(world);
    update_cave(world, prev_camera);
    resolve_deaths(world);

    for e in &mut world.explosions {
        e.grow(dt_ms);
    }
    world.compact();
}

/// Whether the player can still act and be hit
fn player_in_play(world: &World) -> bool {
    world.phase == WorldPhase::Playing
}

fn end_game(world: &mut World) {
    world.phase = WorldPhase::GameOver;
    let score = world.score();
    log::info!("Game over at {} ms, score {}", world.now_ms, score);
    world.push_event(GameEvent::GameOver { score });
}

fn fire_player(world: &mut World, gun: Gun) {
    let now = world.now_ms;
    let id = world.next_entity_id();
    let bullet = match gun {
        Gun::Front => world.player.fire_forward(now, id, &world.tuning.projectile),
        Gun::Back => world.player.fire_back(now, id, &world.tuning.projectile),
    };
    if let Some(b) = bullet {
        world.bullets.push(b);
        world.push_event(GameEvent::BulletFired { owner: Owner::Player });
    }
}

/// Hazards the enemy steers around: live projectiles and the nearest point of
/// every on-screen obstacle
fn enemy_hazards(world: &World, center: Vec2) -> Vec<Vec2> {
    let range = world.tuning.enemy.avoid_range;
    world
        .bullets
        .iter()
        .filter(|b| b.owner != Owner::Enemy)
        .map(|b| b.center())
        .chain(world.missiles.iter().map(|m| m.center()))
        .chain(world.terrain.visible().map(|o| o.hitbox().closest_point(center)))
        .filter(|p| p.distance(center) <= range)
        .collect()
}

fn update_enemy(world: &mut World, dt_ms: u32) {
    let Some(center) = world.enemy.as_ref().map(|e| e.center()) else {
        return;
    };
    let ctx = SteeringContext {
        player_center: world.player.center(),
        hazards: enemy_hazards(world, center),
        cave_center_y: world
            .cave
            .as_ref()
            .and_then(|c| c.centerline_at(center.x + world.camera_x, world.tuning.enemy.cave_lookahead)),
    };
    let now = world.now_ms;
    let id = world.next_entity_id();
    let Some(enemy) = world.enemy.as_mut() else {
        return;
    };
    enemy.steer(&ctx, dt_ms);
    enemy.update(now, dt_ms);
    if let Some(b) = enemy.try_fire(ctx.player_center, now, id, &world.tuning.projectile) {
        world.bullets.push(b);
        world.push_event(GameEvent::BulletFired { owner: Owner::Enemy });
    }
}

/// Launch from every ready turret. The missile appears just outside the
/// turret's side facing the player so it never starts inside its own rock.
fn fire_turrets(world: &mut World) {
    let turrets = world
        .terrain
        .fire_turrets(world.now_ms, world.tuning.terrain.turret_fire_interval_ms);
    let target = world.player.center();
    let clearance = world.tuning.projectile.missile_width * 0.5 + 1.0;
    for turret in turrets {
        let muzzle_x = if target.x < turret.center().x {
            turret.min.x - clearance
        } else {
            turret.max.x + clearance
        };
        let muzzle = Vec2::new(muzzle_x, turret.center().y);
        let homing = world.rng.random_bool(world.tuning.terrain.homing_chance.clamp(0.0, 1.0));
        let id = world.next_entity_id();
        let missile = Missile::launch(id, muzzle, target, homing, &world.tuning.projectile);
        world.missiles.push(missile);
        world.push_event(GameEvent::MissileLaunched { homing });
    }
}

fn update_kamikaze(world: &mut World, dt_ms: u32) {
    let now = world.now_ms;
    let cave_entered = world.cave.as_ref().is_some_and(|c| c.entered(world.camera_x));
    if cave_entered && !world.kamikaze.parked {
        if world.kamikaze.can_blast(now) {
            detonate_kamikaze(world);
        }
        world.kamikaze.park();
        log::debug!("Kamikaze parked for cave");
    }
    let target_y = world.player.center().y;
    world.kamikaze.advance(target_y, now, dt_ms);
}

fn detonate_kamikaze(world: &mut World) {
    let center = world.kamikaze.center();
    world.spawn_explosion(center);
    world.kamikaze.detonate(world.now_ms);
    world.push_event(GameEvent::KamikazeDetonated);
}

/// Player and enemy slide back out of terrain; the kamikaze blows up
fn resolve_craft_vs_terrain(world: &mut World, scroll_dx: f32) {
    let player_active = player_in_play(world);
    let camera_x = world.camera_x;
    let terrain = &world.terrain;
    let cave = world.cave.as_ref();
    let blocked = |hb: &Aabb| terrain.solid_hit(hb) || cave.is_some_and(|c| c.collides(hb, camera_x));

    if player_active {
        let player_box = |p: Vec2| Aabb::new(p, Player::size()).inset(PLAYER_HURT_INSET);
        revert_on_overlap(&mut world.player.movement, player_box, blocked);
        carry_with_scroll(&mut world.player.movement.pos, scroll_dx, |p| blocked(&player_box(p)));
    }

    if let Some(enemy) = world.enemy.as_mut() {
        let enemy_box = |p: Vec2| Aabb::new(p, Enemy::size());
        revert_on_overlap(&mut enemy.movement, enemy_box, blocked);
        carry_with_scroll(&mut enemy.movement.pos, scroll_dx, |p| blocked(&enemy_box(p)));
    }

    let now = world.now_ms;
    if world.kamikaze.can_blast(now) && blocked(&world.kamikaze.hitbox()) {
        detonate_kamikaze(world);
    }
}

/// Terrain scrolls into a craft that did not move: push it along with the
/// rock instead of leaving it embedded
fn carry_with_scroll(pos: &mut Vec2, scroll_dx: f32, blocked: impl Fn(Vec2) -> bool) {
    if scroll_dx > 0.0 && blocked(*pos) {
        pos.x = (pos.x - scroll_dx).max(0.0);
    }
}

/// Floor/roof contact for a projectile: bounce (pinned to the boundary) or
/// report destruction
fn ricochet<R: Rng + ?Sized>(rng: &mut R, chance: f64, vel: &mut Vec2, boundary: Boundary) -> (Ricochet, f32) {
    let pin_y = match boundary {
        Boundary::Floor => FLOOR_BOTTOM,
        Boundary::Roof => ROOF_TOP,
    };
    let outcome = roll_ricochet(rng, chance);
    if outcome == Ricochet::Bounce {
        *vel = bounce_off(*vel, boundary);
    }
    (outcome, pin_y)
}

fn resolve_bullets(world: &mut World) {
    let now = world.now_ms;
    let camera_x = world.camera_x;
    let damage = world.tuning.projectile.bullet_damage;
    let chance = world.tuning.projectile.bullet_ricochet_chance;
    let player_active = player_in_play(world);

    for i in 0..world.bullets.len() {
        if world.bullets[i].destroyed {
            continue;
        }

        if let Some(boundary) = boundary_contact(&world.bullets[i].hitbox()) {
            let b = &mut world.bullets[i];
            match ricochet(&mut world.rng, chance, &mut b.vel, boundary) {
                (Ricochet::Bounce, y) => {
                    b.pin_y(y);
                    world.push_event(GameEvent::Ricochet);
                }
                (Ricochet::Destroy, _) => {
                    b.destroyed = true;
                    continue;
                }
            }
        }

        let hb = world.bullets[i].hitbox();
        let owner = world.bullets[i].owner;

        if let Some(o) = world.terrain.obstacle_hit(&hb) {
            world.bullets[i].destroyed = true;
            if world.terrain.obstacles[o].shot() {
                let id = world.terrain.obstacles[o].id;
                world.push_event(GameEvent::StalactiteTriggered { id });
            }
            continue;
        }

        // Fixed precedence; first match wins
        if player_active && owner != Owner::Player && collide(&world.player, &hb) {
            world.bullets[i].destroyed = true;
            if world.player.take_damage(damage, now) {
                let health = world.player.health();
                world.push_event(GameEvent::PlayerHit { health });
            }
        } else if world.kamikaze.can_blast(now) && collide(&world.kamikaze, &hb) {
            world.bullets[i].destroyed = true;
            detonate_kamikaze(world);
        } else if let Some(enemy) = world.enemy.as_mut().filter(|e| owner != Owner::Enemy && collide(&**e, &hb)) {
            world.bullets[i].destroyed = true;
            enemy.take_damage(damage, now);
            let health = enemy.health();
            world.push_event(GameEvent::EnemyHit { health });
        } else if world.cave.as_ref().is_some_and(|c| c.collides(&hb, camera_x)) {
            world.bullets[i].destroyed = true;
        } else if world.bullets[i].off_screen() {
            world.bullets[i].destroyed = true;
        }
    }
}

/// Blow up missile `i` and damage everything in range
fn detonate_missile(world: &mut World, i: usize) {
    let (center, radius, max_damage) = {
        let m = &mut world.missiles[i];
        m.destroyed = true;
        (m.center(), m.blast_radius, m.damage)
    };
    world.spawn_explosion(center);
    let now = world.now_ms;

    if player_in_play(world) && apply_blast(&mut world.player, center, radius, max_damage, now) {
        let health = world.player.health();
        world.push_event(GameEvent::PlayerHit { health });
    }
    if let Some(enemy) = world.enemy.as_mut() {
        if apply_blast(enemy, center, radius, max_damage, now) {
            let health = enemy.health();
            world.push_event(GameEvent::EnemyHit { health });
        }
    }
    if world.kamikaze.can_blast(now) && world.kamikaze.center().distance(center) < radius {
        detonate_kamikaze(world);
    }
}

/// Falloff damage by center distance. Returns whether a hit landed.
fn apply_blast<T: Damageable + HasHitbox + ?Sized>(
    target: &mut T,
    origin: Vec2,
    radius: f32,
    max_damage: f32,
    now_ms: u64,
) -> bool {
    let amount = blast_damage(target.center().distance(origin), radius, max_damage) as i32;
    amount > 0 && target.take_damage(amount, now_ms)
}

fn resolve_missiles(world: &mut World) {
    let now = world.now_ms;
    let camera_x = world.camera_x;
    let chance = world.tuning.projectile.missile_ricochet_chance;

    for i in 0..world.missiles.len() {
        if world.missiles[i].destroyed {
            continue;
        }

        if let Some(boundary) = boundary_contact(&world.missiles[i].hitbox()) {
            let m = &mut world.missiles[i];
            match ricochet(&mut world.rng, chance, &mut m.vel, boundary) {
                (Ricochet::Bounce, y) => {
                    m.pin_y(y);
                    world.push_event(GameEvent::Ricochet);
                }
                (Ricochet::Destroy, _) => {
                    detonate_missile(world, i);
                    continue;
                }
            }
        }

        let hb = world.missiles[i].hitbox();
        let in_terrain = world.terrain.obstacle_hit(&hb).is_some()
            || world.cave.as_ref().is_some_and(|c| c.collides(&hb, camera_x));
        if in_terrain {
            detonate_missile(world, i);
            continue;
        }

        // Missile vs missile: both burst without damage. Missile vs bullet
        // destroy each other quietly.
        if let Some(j) = (i + 1..world.missiles.len())
            .find(|&j| !world.missiles[j].destroyed && collide(&world.missiles[j], &hb))
        {
            for k in [i, j] {
                world.missiles[k].destroyed = true;
                let center = world.missiles[k].center();
                world.spawn_explosion(center);
            }
            continue;
        }
        if let Some(b) = world.bullets.iter_mut().find(|b| !b.destroyed && collide(&**b, &hb)) {
            b.destroyed = true;
            world.missiles[i].destroyed = true;
            continue;
        }

        let center = hb.center();
        let contact = contact_radius(world.missiles[i].blast_radius);
        let mut targets = Vec::new();
        if player_in_play(world) {
            targets.push(world.player.center());
        }
        targets.extend(world.enemy.as_ref().map(|e| e.center()));
        if world.kamikaze.can_blast(now) {
            targets.push(world.kamikaze.center());
        }
        if targets.iter().any(|t| t.distance(center) <= contact) {
            detonate_missile(world, i);
            continue;
        }

        if world.missiles[i].off_screen() {
            world.missiles[i].destroyed = true;
        }
    }
}

/// Craft-to-craft contact damage
fn resolve_craft_contacts(world: &mut World) {
    let now = world.now_ms;
    let contact = world.tuning.projectile.contact_damage;
    let player_active = player_in_play(world);

    // Both sides take the hit; each has its own rate limit
    if let Some(enemy) = world
        .enemy
        .as_mut()
        .filter(|e| player_active && collide(&world.player, &**e))
    {
        if enemy.take_contact(contact, now) {
            let health = enemy.health();
            world.push_event(GameEvent::EnemyHit { health });
        }
        if world.player.take_damage(contact, now) {
            let health = world.player.health();
            world.push_event(GameEvent::PlayerHit { health });
        }
    }

    if player_active && world.kamikaze.can_blast(now) && collide(&world.kamikaze, &world.player) {
        if world.player.take_damage(contact, now) {
            let health = world.player.health();
            world.push_event(GameEvent::PlayerHit { health });
        }
        detonate_kamikaze(world);
    }

    if world.kamikaze.can_blast(now) {
        if let Some(enemy) = world.enemy.as_mut().filter(|e| collide(&world.kamikaze, &**e)) {
            enemy.take_damage(contact, now);
            let health = enemy.health();
            world.push_event(GameEvent::EnemyHit { health });
            detonate_kamikaze(world);
        }
    }
}

/// Open a cave when the camera crosses a multiple of the cave frequency and
/// close it once it has scrolled past
fn update_cave(world: &mut World, prev_camera: f32) {
    let camera_x = world.camera_x;
    if world.cave.as_ref().is_some_and(|c| c.passed(camera_x)) {
        world.cave = None;
        world.kamikaze.release(world.now_ms);
        log::info!("Cave passed at camera x {:.0}", camera_x);
        world.push_event(GameEvent::CaveExited);
    }

    let crossed = (camera_x / CAVE_FREQ).floor() > (prev_camera / CAVE_FREQ).floor();
    if crossed && world.cave.is_none() {
        let start_x = camera_x + SCREEN_WIDTH;
        let gap = world.difficulty.cave_gap();
        let cave = CaveSystem::generate(start_x, gap, &mut world.rng);
        log::info!("Cave spawned at x {:.0} (gap {})", start_x, gap);
        world.cave = Some(cave);
        world.push_event(GameEvent::CaveSpawned { start_x });
    }
}

fn resolve_deaths(world: &mut World) {
    if !world.player.is_alive() && world.phase == WorldPhase::Playing {
        let center = world.player.center();
        world.spawn_explosion(center);
        world.phase = WorldPhase::PlayerDestroyed { at_ms: world.now_ms };
        log::info!("Player destroyed at {} ms", world.now_ms);
        world.push_event(GameEvent::PlayerDestroyed);
    }

    if let Some(center) = world.enemy.as_ref().filter(|e| !e.is_alive()).map(|e| e.center()) {
        world.enemy = None;
        world.spawn_explosion(center);
        log::info!("Enemy destroyed at {} ms", world.now_ms);
        world.push_event(GameEvent::EnemyDestroyed);
    }
}

/// Whether `hitbox` is inside any solid terrain right now
pub fn terrain_blocks(world: &World, hitbox: &Aabb) -> bool {
    world.terrain.solid_hit(hitbox)
        || world
            .cave
            .as_ref()
            .is_some_and(|c| c.collides(hitbox, world.camera_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;
    use crate::sim::input::Direction;
    use crate::sim::kamikaze::Kamikaze;
    use crate::sim::projectile::Bullet;
    use crate::sim::terrain::{FallState, Obstacle, ObstacleKind, Terrain};
    use crate::tuning::Tuning;

    /// A world with no procedural obstacles
    fn empty_world(difficulty: Difficulty) -> World {
        let mut w = World::new(99, difficulty, Tuning::default());
        w.terrain = Terrain::default();
        w
    }

    fn idle(w: &mut World, ticks: u32) {
        for _ in 0..ticks {
            tick(w, &TickInput::default(), 16);
        }
    }

    #[test]
    fn test_camera_scrolls_and_scores() {
        let mut w = empty_world(Difficulty::Medium);
        idle(&mut w, 100);
        assert_eq!(w.now_ms, 1600);
        assert!((w.camera_x - SCROLL_SPEED * 1.6).abs() < 0.5);
        assert_eq!(w.score(), 6);
    }

    #[test]
    fn test_request_game_over() {
        let mut w = empty_world(Difficulty::Medium);
        idle(&mut w, 10);
        tick(&mut w, &TickInput::new(vec![Intent::RequestGameOver]), 16);
        assert!(w.is_over());
        let events = w.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        let now = w.now_ms;
        tick(&mut w, &TickInput::default(), 16);
        assert_eq!(w.now_ms, now);
    }

    #[test]
    fn test_thrust_intent_moves_player() {
        let mut w = empty_world(Difficulty::Medium);
        let start = w.player.movement.pos;
        let press = Intent::Thrust {
            dir: Direction::Up,
            pressed: true,
        };
        tick(&mut w, &TickInput::new(vec![press]), 16);
        idle(&mut w, 20);
        assert!(w.player.movement.pos.y < start.y);
    }

    #[test]
    fn test_fire_spawns_bullet_and_heats_gun() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        tick(&mut w, &TickInput::new(vec![Intent::FireForward]), 16);
        assert_eq!(w.bullets.len(), 1);
        assert_eq!(w.player.front_gun.heat(), 20.0 - 0.02 * 16.0);
        // Same tick window: rate-limited
        tick(&mut w, &TickInput::new(vec![Intent::FireForward]), 16);
        assert_eq!(w.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_never_hits_owner() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        let center = w.player.center();
        let id = w.next_entity_id();
        let b = Bullet::new(id, center, Vec2::ZERO, Owner::Player, &w.tuning.projectile);
        w.bullets.push(b);
        idle(&mut w, 1);
        assert_eq!(w.player.health(), 100);
        assert_eq!(w.bullets.len(), 1);
    }

    #[test]
    fn test_enemy_bullet_hits_player_with_mitigation() {
        let mut w = empty_world(Difficulty::Easy);
        w.enemy = None;
        let center = w.player.center();
        let id = w.next_entity_id();
        let b = Bullet::new(id, center, Vec2::ZERO, Owner::Enemy, &w.tuning.projectile);
        w.bullets.push(b);
        idle(&mut w, 1);
        // 5 damage halved on easy, truncated
        assert_eq!(w.player.health(), 98);
        assert!(w.bullets.is_empty());
    }

    #[test]
    fn test_player_bullet_damages_enemy() {
        let mut w = empty_world(Difficulty::Medium);
        let enemy_center = w.enemy.as_ref().unwrap().center();
        let id = w.next_entity_id();
        let b = Bullet::new(id, enemy_center, Vec2::ZERO, Owner::Player, &w.tuning.projectile);
        w.bullets.push(b);
        idle(&mut w, 1);
        assert_eq!(w.enemy.as_ref().unwrap().health(), 95);
    }

    #[test]
    fn test_bullet_triggers_stalactite() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.terrain.obstacles.push(Obstacle {
            id: 500,
            kind: ObstacleKind::Stalactite(FallState::Dormant),
            abs: Vec2::new(1000.0, WALL_BLOCK_SIDE),
            rel: Vec2::ZERO,
            size: Vec2::new(80.0, 200.0),
            variant: 0,
        });
        let id = w.next_entity_id();
        // Aimed at the stalactite once it has scrolled a little
        let b = Bullet::new(id, Vec2::new(1000.0, 150.0), Vec2::ZERO, Owner::Player, &w.tuning.projectile);
        w.bullets.push(b);
        idle(&mut w, 1);
        assert!(w.bullets.is_empty());
        assert_eq!(w.terrain.obstacles[0].kind, ObstacleKind::Stalactite(FallState::Triggered));
        assert!(
            w.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::StalactiteTriggered { id: 500 }))
        );
    }

    #[test]
    fn test_missile_proximity_blast_damages_player() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        let target = w.player.center();
        let id = w.next_entity_id();
        let m = Missile::launch(id, target + Vec2::new(20.0, 0.0), target, false, &w.tuning.projectile);
        w.missiles.push(m);
        idle(&mut w, 1);
        assert!(w.missiles.is_empty());
        assert!(w.player.health() < 100);
        assert_eq!(w.explosions.len(), 1);
    }

    #[test]
    fn test_missiles_burst_each_other_without_damage() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        let t = w.tuning.projectile.clone();
        let spot = Vec2::new(900.0, 300.0);
        for _ in 0..2 {
            let id = w.next_entity_id();
            w.missiles.push(Missile::launch(id, spot, spot + Vec2::Y, false, &t));
        }
        idle(&mut w, 1);
        assert!(w.missiles.is_empty());
        assert_eq!(w.explosions.len(), 2);
        assert_eq!(w.player.health(), 100);
    }

    #[test]
    fn test_missile_and_bullet_cancel() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        let t = w.tuning.projectile.clone();
        let spot = Vec2::new(900.0, 300.0);
        let id = w.next_entity_id();
        w.missiles.push(Missile::launch(id, spot, spot + Vec2::X, false, &t));
        let id = w.next_entity_id();
        w.bullets.push(Bullet::new(id, spot, Vec2::ZERO, Owner::Player, &t));
        idle(&mut w, 1);
        assert!(w.missiles.is_empty());
        assert!(w.bullets.is_empty());
        assert!(w.explosions.is_empty());
    }

    #[test]
    fn test_enemy_contact_trades_damage() {
        let mut w = empty_world(Difficulty::Hard);
        let pos = w.player.movement.pos;
        w.enemy.as_mut().unwrap().movement.pos = pos;
        idle(&mut w, 1);
        assert_eq!(w.player.health(), 90);
        assert_eq!(w.enemy.as_ref().unwrap().health(), 90);
    }

    #[test]
    fn test_enemy_death_spawns_explosion() {
        let mut w = empty_world(Difficulty::Medium);
        let enemy = w.enemy.as_mut().unwrap();
        enemy.take_damage(enemy.max_health(), 0);
        idle(&mut w, 1);
        assert!(w.enemy.is_none());
        assert_eq!(w.explosions.len(), 1);
        assert!(w.drain_events().contains(&GameEvent::EnemyDestroyed));
    }

    #[test]
    fn test_player_death_then_game_over_after_grace() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        w.player.take_damage(1000, 0);
        idle(&mut w, 1);
        assert!(matches!(w.phase, WorldPhase::PlayerDestroyed { .. }));
        idle(&mut w, 30);
        assert!(!w.is_over());
        idle(&mut w, 40);
        assert!(w.is_over());
    }

    #[test]
    fn test_kamikaze_respawns_after_leaving_screen() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        // Keep the player out of the kamikaze's lane
        w.player.movement.pos.y = 600.0;
        w.kamikaze.movement.pos = Vec2::new(-CRAFT_WIDTH - 1.0, 100.0);
        w.kamikaze.arrival_ms = 0;
        idle(&mut w, 1);
        assert_eq!(w.kamikaze.movement.pos, Kamikaze::waiting_position());
        assert_eq!(w.kamikaze.arrival_ms, 16 + Difficulty::Hard.kamikaze_respawn_delay_ms());
    }

    #[test]
    fn test_kamikaze_shot_detonates() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.kamikaze.arrival_ms = 0;
        w.kamikaze.movement.pos = Vec2::new(800.0, 100.0);
        let c = w.kamikaze.center() + Vec2::new(-8.0, 0.0);
        let id = w.next_entity_id();
        w.bullets.push(Bullet::new(id, c, Vec2::ZERO, Owner::Player, &w.tuning.projectile));
        idle(&mut w, 1);
        assert!(w.bullets.is_empty());
        assert_eq!(w.kamikaze.movement.pos, Kamikaze::waiting_position());
        assert!(w.drain_events().contains(&GameEvent::KamikazeDetonated));
    }

    #[test]
    fn test_cave_cycle_parks_kamikaze() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.camera_x = CAVE_FREQ - 1.0;
        idle(&mut w, 1);
        let cave = w.cave.clone().unwrap();
        assert!((cave.start_x - (w.camera_x + SCREEN_WIDTH)).abs() < 1e-3);
        assert_eq!(cave.gap, Difficulty::Medium.cave_gap());
        // Entrance is at the right edge: parked from the next tick on
        idle(&mut w, 1);
        assert!(w.kamikaze.parked);

        // Fly until the corridor is behind us
        while w.cave.is_some() {
            idle(&mut w, 1);
            assert!(w.now_ms < 60_000);
        }
        assert!(!w.kamikaze.parked);
        assert!(w.drain_events().contains(&GameEvent::CaveExited));
    }

    #[test]
    fn test_autofire_fires_both_guns() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.grant_power_up(PowerUp::Autofire);
        idle(&mut w, 1);
        assert_eq!(w.bullets.len(), 2);
        assert!(w.bullets.iter().any(|b| b.vel.x > 0.0));
        assert!(w.bullets.iter().any(|b| b.vel.x < 0.0));
    }

    #[test]
    fn test_player_reverts_out_of_obstacle() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        let hb = w.player.hitbox();
        // Wall just ahead of the player's hurt box, tall enough to block the lane
        w.terrain.obstacles.push(Obstacle {
            id: 600,
            kind: ObstacleKind::Stalagmite,
            abs: Vec2::new(hb.max.x + 2.0, 200.0),
            rel: Vec2::ZERO,
            size: Vec2::new(80.0, 300.0),
            variant: 0,
        });
        let right = Intent::Thrust {
            dir: Direction::Right,
            pressed: true,
        };
        tick(&mut w, &TickInput::new(vec![right]), 16);
        idle(&mut w, 5);
        assert!(!terrain_blocks(&w, &w.player.hitbox()));
    }

    fn turret(id: u32, abs: Vec2) -> Obstacle {
        Obstacle {
            id,
            kind: ObstacleKind::Turret { last_fire_ms: None },
            abs,
            rel: abs,
            size: Vec2::splat(100.0),
            variant: 0,
        }
    }

    fn world_with(difficulty: Difficulty, tuning: Tuning) -> World {
        let mut w = World::new(99, difficulty, tuning);
        w.terrain = Terrain::default();
        w.enemy = None;
        w
    }

    #[test]
    fn test_turret_missile_clears_its_turret() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.terrain.obstacles.push(turret(700, Vec2::new(900.0, 300.0)));
        idle(&mut w, 1);
        assert_eq!(w.missiles.len(), 1);
        assert!(w.explosions.is_empty());
        let rock = w.terrain.obstacles[0].hitbox();
        assert!(w.missiles[0].hitbox().max.x < rock.min.x);

        // Flies off toward the player on the following frames
        let x = w.missiles[0].pos.x;
        idle(&mut w, 2);
        assert_eq!(w.missiles.len(), 1);
        assert!(w.missiles[0].pos.x < x);
        assert!(w.explosions.is_empty());
    }

    #[test]
    fn test_turret_behind_player_fires_from_its_far_side() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.player.movement.pos.x = 900.0;
        w.terrain.obstacles.push(turret(701, Vec2::new(300.0, 300.0)));
        idle(&mut w, 1);
        assert_eq!(w.missiles.len(), 1);
        let rock = w.terrain.obstacles[0].hitbox();
        assert!(w.missiles[0].hitbox().min.x > rock.max.x);
        assert!(w.missiles[0].vel.x > 0.0);
    }

    #[test]
    fn test_enemy_rammed_while_player_invincible() {
        let mut w = empty_world(Difficulty::Hard);
        w.grant_power_up(PowerUp::Invincible);
        let pos = w.player.movement.pos;
        w.enemy.as_mut().unwrap().movement.pos = pos;
        idle(&mut w, 1);
        assert_eq!(w.player.health(), 100);
        assert_eq!(w.enemy.as_ref().unwrap().health(), 90);
        // Still touching: the enemy's own cooldown holds
        w.enemy.as_mut().unwrap().movement.pos = w.player.movement.pos;
        idle(&mut w, 1);
        assert_eq!(w.enemy.as_ref().unwrap().health(), 90);
    }

    #[test]
    fn test_world_keeps_running_after_player_destroyed() {
        let mut w = empty_world(Difficulty::Hard);
        w.enemy = None;
        w.player.take_damage(1000, 0);
        idle(&mut w, 1);
        assert!(matches!(w.phase, WorldPhase::PlayerDestroyed { .. }));

        let camera = w.camera_x;
        let pos = w.player.movement.pos;
        let center = w.player.center();
        let id = w.next_entity_id();
        w.bullets.push(Bullet::new(id, center, Vec2::ZERO, Owner::Enemy, &w.tuning.projectile));
        let up = Intent::Thrust {
            dir: Direction::Up,
            pressed: true,
        };
        tick(&mut w, &TickInput::new(vec![up, Intent::FireForward]), 16);
        idle(&mut w, 30);

        assert!(w.camera_x > camera);
        assert_eq!(w.player.movement.pos, pos);
        // The wreck is not a target any more
        assert_eq!(w.bullets.len(), 1);
        assert_eq!(w.bullets[0].owner, Owner::Enemy);
        assert!(!w.is_over());
    }

    #[test]
    fn test_bullet_ricochets_off_floor() {
        let mut tuning = Tuning::default();
        tuning.projectile.bullet_ricochet_chance = 1.0;
        let mut w = world_with(Difficulty::Medium, tuning);
        let t = w.tuning.projectile.clone();
        let id = w.next_entity_id();
        let pos = Vec2::new(600.0, FLOOR_BOTTOM + 2.0 - t.bullet_height / 2.0);
        w.bullets.push(Bullet::new(id, pos, Vec2::new(450.0, 200.0), Owner::Player, &t));
        idle(&mut w, 1);
        assert_eq!(w.bullets.len(), 1);
        assert_eq!(w.bullets[0].vel, Vec2::new(450.0, -200.0));
        assert!((w.bullets[0].center().y - FLOOR_BOTTOM).abs() < 1e-3);
        assert!(w.drain_events().contains(&GameEvent::Ricochet));
    }

    #[test]
    fn test_bullet_breaks_on_roof() {
        let mut tuning = Tuning::default();
        tuning.projectile.bullet_ricochet_chance = 0.0;
        let mut w = world_with(Difficulty::Medium, tuning);
        let t = w.tuning.projectile.clone();
        let id = w.next_entity_id();
        let pos = Vec2::new(600.0, ROOF_TOP - 2.0 - t.bullet_height / 2.0);
        w.bullets.push(Bullet::new(id, pos, Vec2::new(450.0, -200.0), Owner::Player, &t));
        idle(&mut w, 1);
        assert!(w.bullets.is_empty());
        assert!(!w.drain_events().contains(&GameEvent::Ricochet));
    }

    #[test]
    fn test_missile_ricochets_off_floor() {
        let mut tuning = Tuning::default();
        tuning.projectile.missile_ricochet_chance = 1.0;
        let mut w = world_with(Difficulty::Medium, tuning);
        let t = w.tuning.projectile.clone();
        let id = w.next_entity_id();
        let muzzle = Vec2::new(700.0, FLOOR_BOTTOM + 2.0);
        w.missiles.push(Missile::launch(id, muzzle, muzzle + Vec2::new(100.0, 100.0), false, &t));
        idle(&mut w, 1);
        assert_eq!(w.missiles.len(), 1);
        assert!(w.missiles[0].vel.y < 0.0);
        assert!(w.missiles[0].vel.x > 0.0);
        assert!((w.missiles[0].center().y - FLOOR_BOTTOM).abs() < 1e-3);
        assert!(w.explosions.is_empty());
    }

    #[test]
    fn test_missile_detonates_on_floor() {
        let mut tuning = Tuning::default();
        tuning.projectile.missile_ricochet_chance = 0.0;
        let mut w = world_with(Difficulty::Medium, tuning);
        let t = w.tuning.projectile.clone();
        let id = w.next_entity_id();
        let muzzle = Vec2::new(700.0, FLOOR_BOTTOM + 2.0);
        w.missiles.push(Missile::launch(id, muzzle, muzzle + Vec2::new(100.0, 100.0), false, &t));
        idle(&mut w, 1);
        assert!(w.missiles.is_empty());
        assert_eq!(w.explosions.len(), 1);
        // Too far away to hurt the player
        assert_eq!(w.player.health(), 100);
    }

    #[test]
    fn test_kamikaze_rams_enemy() {
        let mut w = empty_world(Difficulty::Hard);
        w.player.movement.pos.y = 550.0;
        let enemy_pos = w.enemy.as_ref().unwrap().movement.pos;
        w.kamikaze.arrival_ms = 0;
        w.kamikaze.movement.pos = enemy_pos;
        idle(&mut w, 1);
        assert_eq!(w.enemy.as_ref().unwrap().health(), 90);
        assert_eq!(w.player.health(), 100);
        assert_eq!(w.kamikaze.movement.pos, Kamikaze::waiting_position());
        assert!(w.drain_events().contains(&GameEvent::KamikazeDetonated));
    }

    #[test]
    fn test_falling_stalactite_collides_where_it_is_drawn() {
        let mut w = empty_world(Difficulty::Medium);
        w.enemy = None;
        w.terrain.obstacles.push(Obstacle {
            id: 800,
            kind: ObstacleKind::Stalactite(FallState::Falling { vel: 300.0 }),
            abs: Vec2::new(900.0, WALL_BLOCK_SIDE),
            rel: Vec2::ZERO,
            size: Vec2::new(80.0, 200.0),
            variant: 0,
        });
        idle(&mut w, 1);
        let o = &w.terrain.obstacles[0];
        assert!(o.abs.y > WALL_BLOCK_SIDE);
        assert_eq!(o.rel.y, o.abs.y);
        assert_eq!(o.rel.x, o.abs.x - w.camera_x);
    }
}
