/*
 * Field Grid Module
 *
 * Discretized scalar field laid over the world rectangle. Each cell stores
 * one value per pheromone channel. Agents deposit additively during a tick
 * and the whole grid decays multiplicatively once per tick afterwards.
 *
 * Positions off the grid are ignored on deposit and read as 0; a zero-area
 * grid has no cells and turns every call into a no-op.
 */

use nannou::prelude::*;

// Cells never get smaller than this, in world units
pub const MIN_CELL_SIZE: f32 = 1.0;
// Upper bound on cells per axis; larger worlds get coarser cells
const MAX_CELLS_PER_AXIS: f32 = 2048.0;

// Named pheromone channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    ToFood,
    ToNest,
}

impl Channel {
    pub const COUNT: usize = 2;
    pub const ALL: [Channel; Channel::COUNT] = [Channel::ToFood, Channel::ToNest];

    #[inline]
    fn index(self) -> usize {
        match self {
            Channel::ToFood => 0,
            Channel::ToNest => 1,
        }
    }
}

pub type Cell = [f32; Channel::COUNT];

pub struct FieldGrid {
    // Cell size as configured, and the one actually in use for this world
    requested_cell_size: f32,
    cell_size: f32,
    width: f32,
    height: f32,
    cols: usize,
    rows: usize,
    origin: Vec2,
    cells: Vec<Cell>,
}

impl FieldGrid {
    // Grid covering a `width` x `height` world centered on the origin
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = sanitize_cell_size(cell_size).unwrap_or(MIN_CELL_SIZE);
        let mut grid = Self {
            requested_cell_size: cell_size,
            cell_size,
            width: 0.0,
            height: 0.0,
            cols: 0,
            rows: 0,
            origin: Vec2::ZERO,
            cells: Vec::new(),
        };
        grid.resize(width, height);
        grid
    }

    // Reallocate for a new world size; prior contents are discarded
    pub fn resize(&mut self, width: f32, height: f32) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.width = width;
        self.height = height;
        self.cell_size = self.requested_cell_size.max(width.max(height) / MAX_CELLS_PER_AXIS);
        self.cols = (width / self.cell_size).ceil() as usize;
        self.rows = (height / self.cell_size).ceil() as usize;
        self.origin = Vec2::new(-width / 2.0, -height / 2.0);
        self.cells = vec![[0.0; Channel::COUNT]; self.cols * self.rows];
    }

    // Change the cell size; reallocates and clears like a resize.
    // Invalid sizes are ignored, tiny ones are raised to MIN_CELL_SIZE.
    pub fn set_cell_size(&mut self, cell_size: f32) {
        if let Some(cell_size) = sanitize_cell_size(cell_size) {
            if cell_size != self.requested_cell_size {
                self.requested_cell_size = cell_size;
                self.resize(self.width, self.height);
            }
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn cell_index(&self, position: Vec2) -> Option<usize> {
        let gx = ((position.x - self.origin.x) / self.cell_size).floor();
        let gy = ((position.y - self.origin.y) / self.cell_size).floor();
        if !(gx >= 0.0 && gy >= 0.0) || gx >= self.cols as f32 || gy >= self.rows as f32 {
            return None;
        }
        Some(gy as usize * self.cols + gx as usize)
    }

    pub fn deposit(&mut self, position: Vec2, channel: Channel, amount: f32) {
        if let Some(i) = self.cell_index(position) {
            let value = &mut self.cells[i][channel.index()];
            *value = (*value + amount).max(0.0);
        }
    }

    pub fn sample(&self, position: Vec2, channel: Channel) -> f32 {
        self.cell_index(position)
            .map(|i| self.cells[i][channel.index()])
            .unwrap_or(0.0)
    }

    // Sample capped at `saturation`, so a hot spot cannot dominate a sensor sweep
    pub fn sample_saturated(&self, position: Vec2, channel: Channel, saturation: f32) -> f32 {
        self.sample(position, channel).min(saturation.max(0.0))
    }

    // Multiply every channel of every cell by (1 - rate)
    pub fn decay(&mut self, rate: f32) {
        let factor = (1.0 - rate).clamp(0.0, 1.0);
        for cell in &mut self.cells {
            for value in cell.iter_mut() {
                *value *= factor;
            }
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = [0.0; Channel::COUNT];
        }
    }

    // World-space lower-left corner of a cell
    pub fn cell_origin(&self, col: usize, row: usize) -> Vec2 {
        self.origin + Vec2::new(col as f32 * self.cell_size, row as f32 * self.cell_size)
    }

    // (col, row, values) for every cell, row-major
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| (i % cols, i / cols, cell))
    }

    pub fn value(cell: &Cell, channel: Channel) -> f32 {
        cell[channel.index()]
    }

    // Number of cells with any channel above `threshold`
    pub fn active_cells(&self, threshold: f32) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.iter().any(|&v| v > threshold))
            .count()
    }
}

fn sanitize_cell_size(cell_size: f32) -> Option<f32> {
    (cell_size > 0.0 && cell_size.is_finite()).then(|| cell_size.max(MIN_CELL_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_then_sample() {
        let mut field = FieldGrid::new(100.0, 100.0, 5.0);
        let p = Vec2::new(12.0, -7.0);
        field.deposit(p, Channel::ToFood, 3.5);
        assert!(field.sample(p, Channel::ToFood) >= 3.5);
        assert_eq!(field.sample(p, Channel::ToNest), 0.0);
    }

    #[test]
    fn deposits_accumulate_without_cap() {
        let mut field = FieldGrid::new(100.0, 100.0, 5.0);
        for _ in 0..100 {
            field.deposit(Vec2::ZERO, Channel::ToNest, 10.0);
        }
        assert!((field.sample(Vec2::ZERO, Channel::ToNest) - 1000.0).abs() < 1e-3);
        assert_eq!(field.sample_saturated(Vec2::ZERO, Channel::ToNest, 50.0), 50.0);
    }

    #[test]
    fn decay_is_exact_factor() {
        let mut field = FieldGrid::new(20.0, 20.0, 5.0);
        field.deposit(Vec2::new(-8.0, -8.0), Channel::ToFood, 4.0);
        field.deposit(Vec2::new(8.0, 8.0), Channel::ToNest, 2.0);
        field.decay(0.25);
        assert!((field.sample(Vec2::new(-8.0, -8.0), Channel::ToFood) - 3.0).abs() < 1e-6);
        assert!((field.sample(Vec2::new(8.0, 8.0), Channel::ToNest) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn repeated_decay_never_goes_negative() {
        let mut field = FieldGrid::new(20.0, 20.0, 5.0);
        field.deposit(Vec2::ZERO, Channel::ToFood, 1.0);
        let mut last = field.sample(Vec2::ZERO, Channel::ToFood);
        for _ in 0..500 {
            field.decay(0.1);
            let now = field.sample(Vec2::ZERO, Channel::ToFood);
            assert!(now >= 0.0 && now <= last);
            last = now;
        }
        field.decay(3.0);
        assert_eq!(field.sample(Vec2::ZERO, Channel::ToFood), 0.0);
    }

    #[test]
    fn out_of_bounds_is_neutral() {
        let mut field = FieldGrid::new(20.0, 20.0, 5.0);
        field.deposit(Vec2::new(500.0, 0.0), Channel::ToFood, 1.0);
        assert_eq!(field.sample(Vec2::new(500.0, 0.0), Channel::ToFood), 0.0);
        assert_eq!(field.sample(Vec2::new(f32::NAN, 0.0), Channel::ToFood), 0.0);
        assert_eq!(field.active_cells(0.0), 0);
    }

    #[test]
    fn zero_area_grid_is_inert() {
        let mut field = FieldGrid::new(0.0, 0.0, 5.0);
        assert!(field.is_empty());
        field.deposit(Vec2::ZERO, Channel::ToFood, 1.0);
        field.decay(0.5);
        assert_eq!(field.sample(Vec2::ZERO, Channel::ToFood), 0.0);
        assert_eq!(field.cells().count(), 0);
    }

    #[test]
    fn resize_discards_contents() {
        let mut field = FieldGrid::new(20.0, 20.0, 5.0);
        field.deposit(Vec2::ZERO, Channel::ToFood, 1.0);
        field.resize(40.0, 10.0);
        assert_eq!((field.cols(), field.rows()), (8, 2));
        assert_eq!(field.sample(Vec2::ZERO, Channel::ToFood), 0.0);
    }

    #[test]
    fn tiny_cell_size_is_floored() {
        let mut field = FieldGrid::new(1200.0, 800.0, 5.0);
        field.set_cell_size(1.0e-4);
        assert_eq!(field.cell_size(), MIN_CELL_SIZE);
        assert_eq!((field.cols(), field.rows()), (1200, 800));

        // Ignored outright
        field.set_cell_size(-3.0);
        field.set_cell_size(f32::NAN);
        assert_eq!(field.cell_size(), MIN_CELL_SIZE);
    }

    #[test]
    fn huge_world_gets_coarser_cells() {
        let field = FieldGrid::new(1.0e9, 1.0e9, 5.0);
        assert!(field.cols() <= 2049 && field.rows() <= 2049);
        assert!(field.cell_size() > 5.0);

        let mut field = FieldGrid::new(1.0e9, 1.0e9, 5.0);
        field.resize(100.0, 100.0);
        assert_eq!(field.cell_size(), 5.0);
    }
}
