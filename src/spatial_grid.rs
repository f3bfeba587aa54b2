// spatial_grid.rs
// Uniform-cell index over wire circles, rebuilt every inner iteration

use crate::circle::{max_radius, Circle};
use crate::config;
use smallvec::SmallVec;
use std::collections::HashMap;

type Bucket = SmallVec<[usize; 4]>;

/// Candidate neighbor list returned by [`SpatialGrid::neighbors`].
pub type Neighbors = SmallVec<[usize; 16]>;

/// Cell size is twice the largest wire radius, so any two touching wires
/// sit in the same or adjacent cells.
pub struct SpatialGrid {
    pub cell_size: f64,
    cells: HashMap<u64, Bucket>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self {
            cell_size: config::MIN_CELL_SIZE,
            cells: HashMap::new(),
        }
    }

    pub fn build(wires: &[Circle]) -> Self {
        let mut grid = Self::new();
        grid.rebuild(wires);
        grid
    }

    /// Re-bucket all wires. Keeps the allocated buckets for reuse.
    pub fn rebuild(&mut self, wires: &[Circle]) {
        crate::profile_scope!("grid_rebuild");
        self.cell_size = (2.0 * max_radius(wires)).max(config::MIN_CELL_SIZE);
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for (i, w) in wires.iter().enumerate() {
            let (cx, cy) = self.coord(w.pos.x, w.pos.y);
            self.cells.entry(cell_key(cx, cy)).or_default().push(i);
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    fn coord(&self, x: f64, y: f64) -> (i32, i32) {
        // `as` saturates, so far-away or non-finite positions land in edge cells
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Wires in the 3x3 block around wire `i` with index greater than `i`,
    /// ascending. Each unordered pair is therefore visited once.
    pub fn neighbors(&self, wires: &[Circle], i: usize) -> Neighbors {
        let (cx, cy) = self.coord(wires[i].pos.x, wires[i].pos.y);
        let mut out = Neighbors::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                let key = cell_key(cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(bucket) = self.cells.get(&key) {
                    out.extend(bucket.iter().copied().filter(|&j| j > i));
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    #[cfg(test)]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Pack two signed cell coordinates into one key.
pub fn cell_key(ix: i32, iy: i32) -> u64 {
    ((ix as u32 as u64) << 32) | (iy as u32 as u64)
}

#[cfg(test)]
fn unpack_key(key: u64) -> (i32, i32) {
    ((key >> 32) as u32 as i32, key as u32 as i32)
}
