//! Pursuing enemy craft
//!
//! Steering is a weighted blend of three pulls, re-evaluated every tick:
//! toward a point behind the player, away from nearby hazards (inverse
//! distance), and toward the cave centerline when a corridor is near. The
//! resulting heading is thresholded into thrust flags for the shared motion
//! model, so the enemy flies with the same inertia as the player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, Damageable, HasHitbox, HasPosition, HasVelocity};
use super::motion::{MotionParams, MovementState, Thrust};
use super::projectile::{Bullet, Owner};
use super::weapon::WeaponHeat;
use crate::consts::*;
use crate::tuning::{EnemyTuning, ProjectileTuning};

/// What the enemy can see this tick
#[derive(Debug, Clone, Default)]
pub struct SteeringContext {
    pub player_center: Vec2,
    /// Points to keep clear of (projectile centers, nearest obstacle points)
    pub hazards: Vec<Vec2>,
    /// Corridor centerline y at the enemy's position, if a cave is near
    pub cave_center_y: Option<f32>,
}

/// Blend the steering pulls into a heading (not normalized)
pub fn steering_heading(center: Vec2, ctx: &SteeringContext, tuning: &EnemyTuning) -> Vec2 {
    let target = ctx.player_center - Vec2::new(tuning.standoff, 0.0);
    let mut heading = (target - center).normalize_or_zero() * tuning.player_weight;

    for &hazard in &ctx.hazards {
        let away = center - hazard;
        let d = away.length();
        if d > tuning.avoid_range || d <= f32::EPSILON {
            continue;
        }
        heading += away / d * (tuning.avoid_weight / d);
    }

    if let Some(cy) = ctx.cave_center_y {
        let dy = (cy - center.y) / CAVE_BLOCK_HEIGHT;
        heading.y += dy.clamp(-1.0, 1.0) * tuning.cave_weight;
    }
    heading
}

/// Threshold a heading into thrust flags
pub fn heading_to_thrust(heading: Vec2, dead_zone: f32) -> Thrust {
    Thrust {
        up: heading.y < -dead_zone,
        down: heading.y > dead_zone,
        left: heading.x < -dead_zone,
        right: heading.x > dead_zone,
    }
}

/// The enemy craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub movement: MovementState,
    pub thrust: Thrust,
    pub gun: WeaponHeat,
    health: i32,
    /// Last time touching the player hurt us
    last_contact_ms: Option<u64>,
    tuning: EnemyTuning,
}

impl Enemy {
    pub fn new(tuning: &EnemyTuning) -> Self {
        Self {
            movement: MovementState::at(Vec2::new(100.0, SCREEN_HEIGHT / 2.0)),
            thrust: Thrust::default(),
            gun: WeaponHeat::new(tuning.weapon),
            health: tuning.max_health,
            last_contact_ms: None,
            tuning: tuning.clone(),
        }
    }

    pub fn size() -> Vec2 {
        Vec2::new(CRAFT_WIDTH, CRAFT_HEIGHT)
    }

    /// Pick thrust from the steering blend and integrate motion
    pub fn steer(&mut self, ctx: &SteeringContext, dt_ms: u32) {
        let heading = steering_heading(self.center(), ctx, &self.tuning);
        self.thrust = heading_to_thrust(heading, self.tuning.steer_dead_zone);
        let params = MotionParams::with_limits(self.tuning.accel_rate, self.tuning.max_vel);
        let max_pos = Vec2::new(SCREEN_WIDTH - CRAFT_WIDTH, SCREEN_HEIGHT - CRAFT_HEIGHT);
        self.movement.advance(self.thrust, &params, 12.0, dt_ms as f32, max_pos);
    }

    /// Heat decay for the gun
    pub fn update(&mut self, now_ms: u64, dt_ms: u32) {
        self.gun.update(now_ms, dt_ms);
    }

    /// Damage from ramming the player, at most once per contact cooldown.
    /// Returns whether it landed.
    pub fn take_contact(&mut self, amount: i32, now_ms: u64) -> bool {
        if let Some(last) = self.last_contact_ms {
            if now_ms.saturating_sub(last) < self.tuning.contact_cooldown_ms {
                return false;
            }
        }
        self.last_contact_ms = Some(now_ms);
        self.take_damage(amount, now_ms)
    }

    /// Fire forward when lined up with a player ahead of us
    pub fn try_fire(
        &mut self,
        player_center: Vec2,
        now_ms: u64,
        id: u32,
        tuning: &ProjectileTuning,
    ) -> Option<Bullet> {
        let c = self.center();
        let aligned = (player_center.y - c.y).abs() < self.tuning.fire_alignment;
        if !aligned || player_center.x <= c.x || !self.gun.try_fire(now_ms, false) {
            return None;
        }
        let p = self.movement.pos;
        let pos = Vec2::new(
            p.x + CRAFT_WIDTH + 5.0,
            p.y + CRAFT_HEIGHT / 2.0 - tuning.bullet_height / 2.0,
        );
        Some(Bullet::new(id, pos, Vec2::new(tuning.bullet_speed, 0.0), Owner::Enemy, tuning))
    }
}

impl HasPosition for Enemy {
    fn position(&self) -> Vec2 {
        self.movement.pos
    }
}

impl HasVelocity for Enemy {
    fn velocity(&self) -> Vec2 {
        self.movement.velocity()
    }
}

impl HasHitbox for Enemy {
    fn hitbox(&self) -> Aabb {
        Aabb::new(self.movement.pos, Self::size())
    }
}

impl Damageable for Enemy {
    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.tuning.max_health
    }

    fn take_damage(&mut self, amount: i32, _now_ms: u64) -> bool {
        self.health = (self.health - amount).max(0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> EnemyTuning {
        EnemyTuning::default()
    }

    #[test]
    fn test_pulls_toward_standoff_point() {
        let t = tuning();
        let ctx = SteeringContext {
            player_center: Vec2::new(800.0, 200.0),
            ..Default::default()
        };
        let h = steering_heading(Vec2::new(100.0, 400.0), &ctx, &t);
        assert!(h.x > 0.0 && h.y < 0.0);
        let thrust = heading_to_thrust(h, t.steer_dead_zone);
        assert!(thrust.right && thrust.up && !thrust.left && !thrust.down);
    }

    #[test]
    fn test_holds_still_at_standoff() {
        let t = tuning();
        let center = Vec2::new(500.0, 300.0);
        let ctx = SteeringContext {
            player_center: center + Vec2::new(t.standoff, 0.0),
            ..Default::default()
        };
        let h = steering_heading(center, &ctx, &t);
        assert_eq!(heading_to_thrust(h, t.steer_dead_zone), Thrust::default());
    }

    #[test]
    fn test_avoidance_scales_with_inverse_distance() {
        let t = tuning();
        let center = Vec2::new(500.0, 300.0);
        let base = SteeringContext {
            player_center: center + Vec2::new(t.standoff, 0.0),
            ..Default::default()
        };
        let near = SteeringContext {
            hazards: vec![center + Vec2::new(0.0, 50.0)],
            ..base.clone()
        };
        let far = SteeringContext {
            hazards: vec![center + Vec2::new(0.0, 150.0)],
            ..base.clone()
        };
        let out_of_range = SteeringContext {
            hazards: vec![center + Vec2::new(0.0, 500.0)],
            ..base
        };
        let hn = steering_heading(center, &near, &t);
        let hf = steering_heading(center, &far, &t);
        // Hazard below pushes up, harder when closer
        assert!(hn.y < hf.y && hf.y < 0.0);
        assert_eq!(steering_heading(center, &out_of_range, &t).y, 0.0);
    }

    #[test]
    fn test_cave_centerline_pull() {
        let t = tuning();
        let center = Vec2::new(500.0, 300.0);
        let ctx = SteeringContext {
            player_center: center + Vec2::new(t.standoff, 0.0),
            cave_center_y: Some(500.0),
            ..Default::default()
        };
        let h = steering_heading(center, &ctx, &t);
        assert!(heading_to_thrust(h, t.steer_dead_zone).down);
    }

    #[test]
    fn test_fires_only_when_aligned_and_behind() {
        let pt = ProjectileTuning::default();
        let mut e = Enemy::new(&tuning());
        let c = e.center();
        assert!(e.try_fire(c + Vec2::new(400.0, 100.0), 0, 1, &pt).is_none());
        assert!(e.try_fire(c + Vec2::new(-50.0, 0.0), 0, 1, &pt).is_none());
        let b = e.try_fire(c + Vec2::new(400.0, 10.0), 0, 1, &pt).unwrap();
        assert_eq!(b.owner, Owner::Enemy);
        assert!(b.vel.x > 0.0);
        // Gun rate limit
        assert!(e.try_fire(c + Vec2::new(400.0, 10.0), 100, 2, &pt).is_none());
    }

    #[test]
    fn test_contact_damage_has_its_own_cooldown() {
        let mut e = Enemy::new(&tuning());
        assert!(e.take_contact(10, 1000));
        assert!(!e.take_contact(10, 1500));
        assert_eq!(e.health(), 90);
        assert!(e.take_contact(10, 2000));
        assert_eq!(e.health(), 80);
        // Bullets are not rate-limited
        assert!(e.take_damage(5, 2001));
        assert_eq!(e.health(), 75);
    }

    #[test]
    fn test_steer_moves_toward_player() {
        let mut e = Enemy::new(&tuning());
        let ctx = SteeringContext {
            player_center: Vec2::new(1000.0, e.center().y),
            ..Default::default()
        };
        let start = e.movement.pos.x;
        for _ in 0..60 {
            e.steer(&ctx, 16);
        }
        assert!(e.movement.pos.x > start);
        assert!(e.movement.x.vel <= tuning().max_vel);
    }
}
