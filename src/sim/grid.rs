//! Uniform-grid broad phase
//!
//! Each body is bucketed into every cell its bounding square covers (at most
//! four when the cell size is at least the largest diameter). Two overlapping
//! bodies always share a bucket, so testing pairs within each bucket finds
//! every overlap.

use std::collections::HashMap;

use glam::{IVec2, Vec2};

use super::state::Body;

/// Bucket map from cell coordinate to the body indices occupying it
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    inv_cell_size: f32,
    /// Buckets are kept (emptied) across frames so their storage is reused
    cells: HashMap<IVec2, Vec<usize>>,
    /// Non-empty cells in first-occupied order
    occupied: Vec<IVec2>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            occupied: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a point (positions outside the world map to outer cells)
    #[inline]
    pub fn cell_of(&self, point: Vec2) -> IVec2 {
        (point * self.inv_cell_size).floor().as_ivec2()
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        for key in self.occupied.drain(..) {
            if let Some(bucket) = self.cells.get_mut(&key) {
                bucket.clear();
            }
        }
    }

    /// Sizing hint for `n` bodies
    pub fn reserve(&mut self, n: usize) {
        self.occupied.reserve(n);
        self.cells.reserve(n.saturating_sub(self.cells.len()));
    }

    /// Append `index` to every cell covered by the body's bounding square
    pub fn insert(&mut self, index: usize, body: &Body) {
        let (min, max) = body.circle().bounds();
        let lo = self.cell_of(min);
        let hi = self.cell_of(max);

        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                let key = IVec2::new(x, y);
                let bucket = self.cells.entry(key).or_default();
                if bucket.is_empty() {
                    self.occupied.push(key);
                }
                bucket.push(index);
            }
        }
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.occupied.len()
    }

    /// Report every overlapping pair that shares a bucket
    ///
    /// A pair sharing several buckets is reported once per shared bucket.
    /// Returns the number of candidate pairs examined.
    pub fn query<F>(&self, bodies: &[Body], mut on_pair: F) -> usize
    where
        F: FnMut(usize, usize),
    {
        let mut examined = 0;

        for key in &self.occupied {
            let Some(bucket) = self.cells.get(key) else {
                continue;
            };
            for (n, &i) in bucket.iter().enumerate() {
                let a = bodies[i].circle();
                for &j in &bucket[n + 1..] {
                    examined += 1;
                    if a.overlaps(&bodies[j].circle()) {
                        on_pair(i, j);
                    }
                }
            }
        }

        examined
    }
}
