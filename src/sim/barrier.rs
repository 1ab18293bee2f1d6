//! Destructible barriers
//!
//! A barrier is a grid of 1x1 cells laid over a rectangle of the playfield.
//! Cells start alive according to the arch mask and are cleared by projectile
//! impacts (square neighbourhood) or by the swarm crushing through them. Cells
//! never come back; a barrier with no live cells is pruned by the tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;

/// A pixel-granular destructible barrier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    /// Stable identity, unaffected by pruning of other barriers
    pub id: usize,
    /// Top-left corner in playfield units
    pub origin: Vec2,
    width: usize,
    height: usize,
    /// Row-major cell states (true = still standing)
    pixels: Vec<bool>,
    /// Number of `true` entries in `pixels`
    alive: usize,
}

impl Barrier {
    /// Standard barrier with the classic arch shape
    pub fn new(origin: Vec2) -> Self {
        Self::from_mask(origin, BARRIER_WIDTH, BARRIER_HEIGHT, arch_mask)
    }

    /// Fully solid barrier (every cell alive)
    pub fn solid(origin: Vec2, width: usize, height: usize) -> Self {
        Self::from_mask(origin, width, height, |_, _, _, _| true)
    }

    /// Build a barrier whose initial cells are given by `mask(x, y, w, h)`
    pub fn from_mask(
        origin: Vec2,
        width: usize,
        height: usize,
        mask: impl Fn(usize, usize, usize, usize) -> bool,
    ) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(mask(x, y, width, height));
            }
        }
        let alive = pixels.iter().filter(|p| **p).count();
        Self {
            id: 0,
            origin,
            width,
            height,
            pixels,
            alive,
        }
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    /// The standard row of barriers, centered horizontally above the player
    pub fn standard_row() -> Vec<Barrier> {
        let w = BARRIER_WIDTH as f32;
        let total = BARRIER_COUNT as f32 * w + (BARRIER_COUNT as f32 - 1.0) * BARRIER_GAP;
        let start_x = (PLAYFIELD_WIDTH - total) / 2.0;
        (0..BARRIER_COUNT)
            .map(|i| {
                Barrier::new(Vec2::new(start_x + i as f32 * (w + BARRIER_GAP), BARRIER_Y))
                    .with_id(i)
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell states, for rendering
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.origin, self.width as f32, self.height as f32)
    }

    /// Number of cells still standing
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    pub fn is_destroyed(&self) -> bool {
        self.alive == 0
    }

    /// State of the local cell (x, y); anything outside the grid is dead
    pub fn cell(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Map a world point to its local cell, if that cell lies on the grid
    pub fn local_cell(&self, point: Vec2) -> Option<(i32, i32)> {
        if !self.bounds().contains(point) {
            return None;
        }
        let local = (point - self.origin).floor();
        let (x, y) = (local.x as i32, local.y as i32);
        self.index(x, y).map(|_| (x, y))
    }

    /// True iff the cell under `point` is on the grid and still standing
    pub fn check_pixel_collision(&self, point: Vec2) -> bool {
        self.local_cell(point).is_some_and(|(x, y)| self.cell(x, y))
    }

    /// Clear the impact neighbourhood around `point`. Returns the number of
    /// cells that were actually cleared; points off the grid are a no-op.
    pub fn take_damage(&mut self, point: Vec2) -> usize {
        match self.local_cell(point) {
            Some((x, y)) => self.damage_cell(x, y, BARRIER_DAMAGE_RADIUS),
            None => 0,
        }
    }

    /// Clear every cell within Chebyshev distance `radius` of (cx, cy),
    /// clipped to the grid
    pub fn damage_cell(&mut self, cx: i32, cy: i32, radius: i32) -> usize {
        let mut cleared = 0;
        for y in (cy - radius)..=(cy + radius) {
            for x in (cx - radius)..=(cx + radius) {
                if self.clear(x, y) {
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Clear every cell covered by `area` (no falloff)
    pub fn clear_rect(&mut self, area: &Rect) -> usize {
        if !self.bounds().intersects(area) {
            return 0;
        }
        let x0 = (area.x - self.origin.x).floor() as i32;
        let y0 = (area.y - self.origin.y).floor() as i32;
        let x1 = (area.right() - self.origin.x).ceil() as i32;
        let y1 = (area.bottom() - self.origin.y).ceil() as i32;

        let mut cleared = 0;
        for y in y0.max(0)..y1.min(self.height as i32) {
            for x in x0.max(0)..x1.min(self.width as i32) {
                if self.clear(x, y) {
                    cleared += 1;
                }
            }
        }
        cleared
    }

    fn clear(&mut self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) if self.pixels[i] => {
                self.pixels[i] = false;
                self.alive -= 1;
                true
            }
            _ => false,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }
}

/// Arch silhouette: clipped top corners and a notch cut into the bottom center
fn arch_mask(x: usize, y: usize, w: usize, h: usize) -> bool {
    let corner = 4usize;
    if y < corner {
        let clip = corner - y;
        if x < clip || x >= w - clip {
            return false;
        }
    }
    let notch_left = w * 7 / 24;
    let notch_right = w - notch_left;
    let notch_top = h * 2 / 3;
    if y > notch_top && (notch_left..notch_right).contains(&x) {
        return false;
    }
    // Rounded shoulder of the notch
    if y == notch_top && (notch_left + 1..notch_right - 1).contains(&x) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> Barrier {
        Barrier::solid(Vec2::new(100.0, 50.0), 12, 10)
    }

    #[test]
    fn test_point_mapping_floors() {
        let b = grid();
        assert_eq!(b.local_cell(Vec2::new(100.0, 50.0)), Some((0, 0)));
        assert_eq!(b.local_cell(Vec2::new(105.9, 52.2)), Some((5, 2)));
        assert_eq!(b.local_cell(Vec2::new(99.9, 50.0)), None);
        assert_eq!(b.local_cell(Vec2::new(112.0, 50.0)), None);
    }

    #[test]
    fn test_out_of_range_is_dead_and_damage_is_noop() {
        let mut b = grid();
        let outside = Vec2::new(90.0, 40.0);
        assert!(!b.check_pixel_collision(outside));
        assert_eq!(b.take_damage(outside), 0);
        assert_eq!(b.alive_count(), 120);
    }

    #[test]
    fn test_damage_clears_chebyshev_neighbourhood() {
        let mut b = grid();
        let cleared = b.damage_cell(5, 5, 2);
        assert_eq!(cleared, 25);
        for y in 0..10 {
            for x in 0..12 {
                let near = (x - 5i32).abs() <= 2 && (y - 5i32).abs() <= 2;
                assert_eq!(b.cell(x, y), !near, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_damage_is_clipped_at_corner() {
        let mut b = grid();
        assert_eq!(b.damage_cell(0, 0, 2), 9);
        assert!(!b.cell(2, 2));
        assert!(b.cell(3, 0));
    }

    #[test]
    fn test_take_damage_uses_world_point() {
        let mut b = grid();
        b.take_damage(Vec2::new(105.5, 55.5));
        assert!(!b.cell(5, 5));
        assert!(!b.cell(7, 7));
        assert!(b.cell(8, 5));
    }

    #[test]
    fn test_clear_rect_covers_partial_cells() {
        let mut b = grid();
        let cleared = b.clear_rect(&Rect::new(99.5, 49.5, 2.0, 2.0));
        // Covers local cells x in 0..2, y in 0..2 after clipping
        assert_eq!(cleared, 4);
        assert!(!b.cell(1, 1));
        assert!(b.cell(2, 0));
    }

    #[test]
    fn test_destroyed_when_all_cleared() {
        let mut b = Barrier::solid(Vec2::ZERO, 3, 3);
        assert!(!b.is_destroyed());
        b.damage_cell(1, 1, 1);
        assert!(b.is_destroyed());
    }

    #[test]
    fn test_arch_shape() {
        let b = Barrier::new(Vec2::ZERO);
        assert_eq!(b.width(), BARRIER_WIDTH);
        assert_eq!(b.height(), BARRIER_HEIGHT);
        assert!(!b.cell(0, 0));
        assert!(!b.cell(23, 0));
        assert!(b.cell(12, 0));
        assert!(b.cell(0, 17));
        assert!(!b.cell(12, 17));
        assert!(b.alive_count() < BARRIER_WIDTH * BARRIER_HEIGHT);
    }

    #[test]
    fn test_standard_row_is_centered() {
        let row = Barrier::standard_row();
        assert_eq!(row.len(), BARRIER_COUNT);
        let left = row[0].bounds().x;
        let right = PLAYFIELD_WIDTH - row[BARRIER_COUNT - 1].bounds().right();
        assert!((left - right).abs() < 0.001);
        assert!(row.iter().all(|b| b.origin.y == BARRIER_Y));
        let ids: Vec<usize> = row.iter().map(|b| b.id).collect();
        assert_eq!(ids, (0..BARRIER_COUNT).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn prop_destroyed_iff_no_cell_alive(hits in prop::collection::vec((0i32..12, 0i32..10, 0i32..4), 0..40)) {
            let mut b = grid();
            for (x, y, r) in hits {
                b.damage_cell(x, y, r);
            }
            let any_alive = (0..10).any(|y| (0..12).any(|x| b.cell(x, y)));
            prop_assert_eq!(b.is_destroyed(), !any_alive);
            prop_assert_eq!(b.alive_count(), b.pixels().iter().filter(|p| **p).count());
        }

        #[test]
        fn prop_point_maps_to_cell_iff_inside(x in 95.0f32..117.0, y in 45.0f32..65.0) {
            let b = grid();
            let p = Vec2::new(x, y);
            prop_assert_eq!(b.local_cell(p).is_some(), b.bounds().contains(p));
        }

        #[test]
        fn prop_damage_is_idempotent(x in -3i32..15, y in -3i32..13, r in 0i32..4) {
            let mut b = grid();
            b.damage_cell(x, y, r);
            let after_first = b.pixels().to_vec();
            prop_assert_eq!(b.damage_cell(x, y, r), 0);
            prop_assert_eq!(b.pixels(), &after_first[..]);
        }
    }
}
