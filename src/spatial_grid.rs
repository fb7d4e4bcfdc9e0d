/*
 * Spatial Grid Module
 *
 * Uniform bucket grid over the world rectangle used for neighbor lookups.
 * The grid is rebuilt from a position snapshot once per tick; queries then
 * visit only the buckets overlapping the query circle and filter by exact
 * distance, so results match the brute-force scan exactly.
 *
 * Radius semantics: a neighbor is any other agent with distance < radius.
 */

use nannou::prelude::*;

// Upper bound on buckets per axis; larger worlds get coarser buckets
const MAX_CELLS_PER_AXIS: f32 = 1024.0;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub cols: usize,
    pub rows: usize,
    origin: Vec2,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    // Create a grid covering a world of `width` x `height` centered on the origin
    pub fn new(cell_size: f32, width: f32, height: f32) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() { cell_size } else { 1.0 };
        let cell_size = cell_size.max(width.max(height) / MAX_CELLS_PER_AXIS);
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);

        Self {
            cell_size,
            cols,
            rows,
            origin: Vec2::new(-width / 2.0, -height / 2.0),
            cells: vec![Vec::new(); cols * rows],
        }
    }

    // Bucket coordinates for a position, clamped onto the grid
    #[inline]
    fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let gx = ((pos.x - self.origin.x) / self.cell_size).floor();
        let gy = ((pos.y - self.origin.y) / self.cell_size).floor();
        let gx = if gx.is_finite() { gx.clamp(0.0, (self.cols - 1) as f32) } else { 0.0 };
        let gy = if gy.is_finite() { gy.clamp(0.0, (self.rows - 1) as f32) } else { 0.0 };
        (gx as usize, gy as usize)
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec2) {
        let (gx, gy) = self.cell_coords(position);
        self.cells[gy * self.cols + gx].push(index);
    }

    // Replace the grid contents with the given position snapshot
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.clear();
        for (i, &pos) in positions.iter().enumerate() {
            self.insert(i, pos);
        }
    }

    // Visit every other index within `radius` of `positions[index]`
    pub fn for_each_neighbor<F>(&self, positions: &[Vec2], index: usize, radius: f32, mut visit: F)
    where
        F: FnMut(usize, f32),
    {
        if radius <= 0.0 {
            return;
        }
        let center = positions[index];
        let radius_sq = radius * radius;
        // Clamped before the cast: a huge radius just covers the whole grid
        let span = (radius / self.cell_size).ceil().min(self.cols.max(self.rows) as f32) as isize;
        let (cx, cy) = self.cell_coords(center);
        let (cx, cy) = (cx as isize, cy as isize);

        // Positions off the grid are clamped into edge buckets, so edge rows
        // and columns must always be reachable from a clamped center.
        let x_min = (cx - span).max(0);
        let x_max = (cx + span).min(self.cols as isize - 1);
        let y_min = (cy - span).max(0);
        let y_max = (cy + span).min(self.rows as isize - 1);

        for gy in y_min..=y_max {
            let row = gy as usize * self.cols;
            for gx in x_min..=x_max {
                for &other in &self.cells[row + gx as usize] {
                    if other == index {
                        continue;
                    }
                    let d_sq = center.distance_squared(positions[other]);
                    if d_sq < radius_sq {
                        visit(other, d_sq);
                    }
                }
            }
        }
    }

    // Indices of all other agents strictly within `radius`
    pub fn neighbors(&self, positions: &[Vec2], index: usize, radius: f32) -> Vec<usize> {
        let mut result = Vec::new();
        self.for_each_neighbor(positions, index, radius, |other, _| result.push(other));
        result
    }
}

// O(n) reference query with the same radius semantics as the grid
pub fn neighbors_brute_force(positions: &[Vec2], index: usize, radius: f32) -> Vec<usize> {
    let center = positions[index];
    let radius_sq = radius * radius;
    positions
        .iter()
        .enumerate()
        .filter(|&(i, &p)| i != index && center.distance_squared(p) < radius_sq)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn never_returns_self() {
        let positions = vec![Vec2::ZERO, Vec2::new(1.0, 0.0)];
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0);
        grid.rebuild(&positions);
        assert_eq!(grid.neighbors(&positions, 0, 50.0), vec![1]);
        assert_eq!(grid.neighbors(&positions, 1, 50.0), vec![0]);
    }

    #[test]
    fn radius_is_exclusive() {
        let positions = vec![Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(4.999, 0.0)];
        let mut grid = SpatialGrid::new(2.0, 100.0, 100.0);
        grid.rebuild(&positions);
        assert_eq!(grid.neighbors(&positions, 0, 5.0), vec![2]);
        assert_eq!(neighbors_brute_force(&positions, 0, 5.0), vec![2]);
    }

    #[test]
    fn empty_neighborhood() {
        let positions = vec![Vec2::ZERO, Vec2::new(40.0, 40.0)];
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0);
        grid.rebuild(&positions);
        assert!(grid.neighbors(&positions, 0, 10.0).is_empty());
        assert!(grid.neighbors(&positions, 0, 0.0).is_empty());
    }

    #[test]
    fn matches_brute_force_on_random_points() {
        let mut rng = SmallRng::seed_from_u64(7);
        let positions: Vec<Vec2> = (0..300)
            .map(|_| Vec2::new(rng.gen_range(-400.0..400.0), rng.gen_range(-300.0..300.0)))
            .collect();
        let mut grid = SpatialGrid::new(25.0, 800.0, 600.0);
        grid.rebuild(&positions);

        for index in (0..positions.len()).step_by(17) {
            for radius in [10.0, 30.0, 75.0] {
                assert_eq!(
                    sorted(grid.neighbors(&positions, index, radius)),
                    sorted(neighbors_brute_force(&positions, index, radius))
                );
            }
        }
    }

    #[test]
    fn huge_radius_covers_the_whole_grid() {
        let mut rng = SmallRng::seed_from_u64(3);
        let positions: Vec<Vec2> = (0..50)
            .map(|_| Vec2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)))
            .collect();
        let mut grid = SpatialGrid::new(10.0, 200.0, 200.0);
        grid.rebuild(&positions);

        for radius in [1.0e30, f32::INFINITY] {
            let found = sorted(grid.neighbors(&positions, 0, radius));
            assert_eq!(found, sorted(neighbors_brute_force(&positions, 0, radius)));
            assert_eq!(found.len(), positions.len() - 1);
        }
        assert!(grid.neighbors(&positions, 0, f32::NAN).is_empty());
    }

    #[test]
    fn bucket_count_stays_bounded() {
        let grid = SpatialGrid::new(1.0e-6, 1.0e9, 800.0);
        assert!(grid.cols <= 1025 && grid.rows <= 1025);
        let grid = SpatialGrid::new(10.0, f32::INFINITY, f32::NAN);
        assert_eq!((grid.cols, grid.rows), (1, 1));
    }

    #[test]
    fn positions_outside_world_are_still_found() {
        let positions = vec![Vec2::new(60.0, 0.0), Vec2::new(58.0, 0.0)];
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0);
        grid.rebuild(&positions);
        assert_eq!(grid.neighbors(&positions, 0, 5.0), vec![1]);
    }
}
