//! Cave corridors
//!
//! A cave is a run of fixed-width segments, each with a roof block and a floor
//! block leaving a gap around a per-segment centerline. The centerline row
//! wanders by at most one row per segment.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision::intersects;
use super::terrain::Span;
use crate::consts::*;

/// Row offsets of the corridor centerline, one per segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CavePathSequence {
    rows: Vec<i32>,
}

impl CavePathSequence {
    /// Random walk of `len` rows in `[min_row, max_row]`, moving -1, 0 or +1
    /// per step
    pub fn generate<R: Rng + ?Sized>(len: usize, min_row: i32, max_row: i32, rng: &mut R) -> Self {
        let (lo, hi) = if min_row <= max_row { (min_row, max_row) } else { (max_row, min_row) };
        let mut rows = Vec::with_capacity(len);
        if len == 0 {
            return Self { rows };
        }
        let mut row = rng.random_range(lo..=hi);
        rows.push(row);
        for _ in 1..len {
            row = (row + rng.random_range(-1..=1)).clamp(lo, hi);
            rows.push(row);
        }
        Self { rows }
    }

    pub fn from_rows(rows: Vec<i32>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[i32] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.rows.get(index).copied()
    }
}

/// World spans that a cave may occupy over a level of `level_width`.
/// Caves open when the camera crosses a multiple of `CAVE_FREQ` and start one
/// screen to the right; the spans carry a block of slack on either side.
pub fn cave_spans(level_width: f32) -> Vec<Span> {
    let last_camera = level_width - SCREEN_WIDTH;
    let mut spans = Vec::new();
    let mut k = 1.0;
    while k * CAVE_FREQ <= last_camera {
        let start = k * CAVE_FREQ + SCREEN_WIDTH;
        spans.push(Span::new(
            start - CAVE_BLOCK_WIDTH,
            start + CAVE_PIXEL_WIDTH + CAVE_BLOCK_WIDTH,
        ));
        k += 1.0;
    }
    spans
}

/// One active cave corridor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaveSystem {
    /// Absolute x of the first segment
    pub start_x: f32,
    pub path: CavePathSequence,
    /// Vertical opening around the centerline
    pub gap: f32,
}

impl CaveSystem {
    /// Centerline row range that keeps the whole gap between roof and floor
    pub fn row_bounds(gap: f32) -> (i32, i32) {
        let half = gap * 0.5;
        let min_row = ((ROOF_TOP + half) / CAVE_BLOCK_HEIGHT).ceil() as i32;
        let max_row = ((FLOOR_BOTTOM - half) / CAVE_BLOCK_HEIGHT).floor() as i32;
        (min_row, max_row.max(min_row))
    }

    pub fn generate<R: Rng + ?Sized>(start_x: f32, gap: f32, rng: &mut R) -> Self {
        let (min_row, max_row) = Self::row_bounds(gap);
        Self {
            start_x,
            path: CavePathSequence::generate(CAVE_SEGMENTS, min_row, max_row, rng),
            gap,
        }
    }

    /// Absolute x just past the last segment
    pub fn end_x(&self) -> f32 {
        self.start_x + self.path.len() as f32 * CAVE_BLOCK_WIDTH
    }

    /// Segment under absolute x
    pub fn segment_index(&self, abs_x: f32) -> Option<usize> {
        if abs_x < self.start_x || abs_x >= self.end_x() {
            return None;
        }
        Some(((abs_x - self.start_x) / CAVE_BLOCK_WIDTH) as usize)
    }

    fn row_center(row: i32) -> f32 {
        row as f32 * CAVE_BLOCK_HEIGHT
    }

    /// Centerline y the enemy should steer toward at absolute x. Inside the
    /// corridor this is the segment's centerline; within `lookahead` pixels
    /// before the entrance it is the first segment's.
    pub fn centerline_at(&self, abs_x: f32, lookahead: f32) -> Option<f32> {
        if let Some(i) = self.segment_index(abs_x) {
            return self.path.get(i).map(Self::row_center);
        }
        if abs_x < self.start_x && abs_x >= self.start_x - lookahead {
            return self.path.get(0).map(Self::row_center);
        }
        None
    }

    /// Roof and floor blocks of every segment, relative to the camera
    pub fn blocks(&self, camera_x: f32) -> impl Iterator<Item = Aabb> + '_ {
        let half = self.gap * 0.5;
        self.path.rows().iter().enumerate().flat_map(move |(i, &row)| {
            let x = self.start_x + i as f32 * CAVE_BLOCK_WIDTH - camera_x;
            let center = Self::row_center(row);
            let roof = Aabb::new(
                Vec2::new(x, ROOF_TOP),
                Vec2::new(CAVE_BLOCK_WIDTH, (center - half - ROOF_TOP).max(0.0)),
            );
            let floor_top = center + half;
            let floor = Aabb::new(
                Vec2::new(x, floor_top),
                Vec2::new(CAVE_BLOCK_WIDTH, (FLOOR_BOTTOM - floor_top).max(0.0)),
            );
            [roof, floor]
        })
    }

    /// Whether a camera-relative hitbox overlaps any cave block
    pub fn collides(&self, hitbox: &Aabb, camera_x: f32) -> bool {
        self.blocks(camera_x).any(|b| intersects(&b, hitbox))
    }

    /// Entrance has reached the playfield
    pub fn entered(&self, camera_x: f32) -> bool {
        self.start_x - camera_x <= SCREEN_WIDTH
    }

    /// Last segment has scrolled off the left edge
    pub fn passed(&self, camera_x: f32) -> bool {
        self.end_x() < camera_x
    }
}
