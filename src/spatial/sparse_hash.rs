//! Sparse hash grid for neighbor queries
//!
//! Stores indices into a caller-owned position slice, so building a grid for
//! one tick's agent snapshot costs no clones.

use ahash::AHashMap;

use crate::core::types::Vec2;

pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: AHashMap::new(),
        }
    }

    /// Grid over `positions`, each stored under its slice index
    pub fn from_positions(cell_size: f32, positions: &[Vec2]) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, &pos) in positions.iter().enumerate() {
            grid.insert(idx, pos);
        }
        grid
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, idx: usize, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(idx);
    }

    /// All indices in the 3x3 cell neighborhood of `pos`
    pub fn query_neighbors(&self, pos: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        // Cells past the i32 edge do not exist
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                cx.checked_add(dx)
                    .zip(cy.checked_add(dy))
                    .and_then(|cell| self.cells.get(&cell))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Indices within `radius` of `center`
    ///
    /// Exact only while `radius <= cell_size`.
    pub fn query_radius(&self, center: Vec2, radius: f32, positions: &[Vec2]) -> Vec<usize> {
        self.query_neighbors(center)
            .filter(|&idx| {
                positions
                    .get(idx)
                    .map(|pos| center.distance(pos) <= radius)
                    .unwrap_or(false)
            })
            .collect()
    }
}
