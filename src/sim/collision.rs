//! Collision primitives and resolution policies
//!
//! Overlap tests are boundary-inclusive: boxes that merely share an edge
//! collide. The per-tick ordering of who is tested against what lives in
//! [`super::tick`]; this module holds the pieces it is built from.

use glam::Vec2;
use rand::Rng;

use super::aabb::{Aabb, HasHitbox};
use super::motion::MovementState;
use crate::consts::{FLOOR_BOTTOM, ROOF_TOP};

/// AABB overlap test. Touching edges count as overlapping.
#[inline]
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    if a.max.x < b.min.x || a.min.x > b.max.x {
        return false;
    }
    if a.max.y < b.min.y || a.min.y > b.max.y {
        return false;
    }
    true
}

/// Overlap test between any two collidable entities
#[inline]
pub fn collide<A: HasHitbox + ?Sized, B: HasHitbox + ?Sized>(a: &A, b: &B) -> bool {
    intersects(&a.hitbox(), &b.hitbox())
}

/// Horizontal band that bounds the playfield vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Roof,
    Floor,
}

/// Which boundary band (if any) a projectile's center has entered
pub fn boundary_contact(hitbox: &Aabb) -> Option<Boundary> {
    let y = hitbox.center().y;
    if y > FLOOR_BOTTOM {
        Some(Boundary::Floor)
    } else if y < ROOF_TOP {
        Some(Boundary::Roof)
    } else {
        None
    }
}

/// Outcome of a projectile striking the roof or floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ricochet {
    Bounce,
    Destroy,
}

/// Bounce with probability `chance`, otherwise destroy
pub fn roll_ricochet<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> Ricochet {
    if rng.random_bool(chance.clamp(0.0, 1.0)) {
        Ricochet::Bounce
    } else {
        Ricochet::Destroy
    }
}

/// Reflect a vertical velocity away from `boundary`
pub fn bounce_off(vel: Vec2, boundary: Boundary) -> Vec2 {
    match boundary {
        Boundary::Floor => Vec2::new(vel.x, -vel.y.abs()),
        Boundary::Roof => Vec2::new(vel.x, vel.y.abs()),
    }
}

/// Distance within which a missile counts as a direct hit
#[inline]
pub fn contact_radius(blast_radius: f32) -> f32 {
    blast_radius / 3.0
}

/// Blast damage at `distance` from the detonation. Full damage at the
/// center, falling linearly to exactly zero at `radius`.
pub fn blast_damage(distance: f32, radius: f32, max_damage: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    max_damage * (1.0 - distance.max(0.0) / radius)
}

/// Undo the mover's last displacement while `blocked` reports overlap.
///
/// Tries undoing only x, then only y, then both, so a craft sliding along a
/// wall keeps the unobstructed part of its move. Returns true if anything was
/// undone.
pub fn revert_on_overlap(
    movement: &mut MovementState,
    hitbox_at: impl Fn(Vec2) -> Aabb,
    blocked: impl Fn(&Aabb) -> bool,
) -> bool {
    if !blocked(&hitbox_at(movement.pos)) {
        return false;
    }

    movement.undo_x();
    if !blocked(&hitbox_at(movement.pos)) {
        movement.settle();
        return true;
    }

    movement.redo_x();
    movement.undo_y();
    if !blocked(&hitbox_at(movement.pos)) {
        movement.settle();
        return true;
    }

    movement.undo_x();
    movement.settle();
    true
}
