//! Moore-neighbourhood population counting on a torus.
//!
//! The hot path resolves the wrapped row and column once per cell with four
//! edge branches and then does eight direct loads. Computing a modulo per
//! neighbour is kept as [`NeighborCounter::count_modular`] for verification
//! and benchmarking only; it is several times slower.

use super::{Cell, Direction, IndexMapper};

/// Counts live cells among the eight toroidal neighbours of a coordinate.
#[derive(Debug, Clone, Copy)]
pub struct NeighborCounter {
    mapper: IndexMapper,
}

impl NeighborCounter {
    pub fn new(mapper: IndexMapper) -> Self {
        Self { mapper }
    }

    /// Number of live neighbours of `(x, y)` in `current`, in `0..=8`.
    #[inline]
    pub fn count(&self, current: &[Cell], x: usize, y: usize) -> u8 {
        let width = self.mapper.width();
        let height = self.mapper.height();
        debug_assert_eq!(current.len(), width * height);
        debug_assert!(x < width && y < height);

        let west = if x == 0 { width - 1 } else { x - 1 };
        let east = if x == width - 1 { 0 } else { x + 1 };
        let north = (if y == 0 { height - 1 } else { y - 1 }) * width;
        let south = (if y == height - 1 { 0 } else { y + 1 }) * width;
        let row = y * width;

        current[north + west] as u8
            + current[north + x] as u8
            + current[north + east] as u8
            + current[row + west] as u8
            + current[row + east] as u8
            + current[south + west] as u8
            + current[south + x] as u8
            + current[south + east] as u8
    }

    /// Reference count that wraps every neighbour through
    /// [`IndexMapper::wrapped_index`].
    pub fn count_modular(&self, current: &[Cell], x: usize, y: usize) -> u8 {
        Direction::ALL
            .iter()
            .map(|direction| {
                let (dx, dy) = direction.offset();
                let offset = self.mapper.wrapped_index(x as isize + dx, y as isize + dy);
                current[offset] as u8
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid_with(width: usize, height: usize, alive: &[(usize, usize)]) -> Vec<Cell> {
        let mut cells = vec![Cell::Dead; width * height];
        for &(x, y) in alive {
            cells[y * width + x] = Cell::Alive;
        }
        cells
    }

    #[test]
    fn test_count_excludes_self() {
        let mapper = IndexMapper::new(5, 5);
        let counter = NeighborCounter::new(mapper);
        let cells = grid_with(5, 5, &[(2, 2)]);
        assert_eq!(counter.count(&cells, 2, 2), 0);
        assert_eq!(counter.count(&cells, 1, 1), 1);
        assert_eq!(counter.count(&cells, 3, 2), 1);
    }

    #[test]
    fn test_full_neighbourhood() {
        let mapper = IndexMapper::new(3, 3);
        let counter = NeighborCounter::new(mapper);
        let cells = vec![Cell::Alive; 9];
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(counter.count(&cells, x, y), 8);
            }
        }
    }

    #[test]
    fn test_corner_sees_opposite_corners() {
        let (w, h) = (6, 4);
        let mapper = IndexMapper::new(w, h);
        let counter = NeighborCounter::new(mapper);
        let cells = grid_with(w, h, &[(w - 1, h - 1), (w - 1, 0), (0, h - 1)]);
        assert_eq!(counter.count(&cells, 0, 0), 3);
        assert_eq!(counter.count_modular(&cells, 0, 0), 3);
    }

    #[test]
    fn test_degenerate_single_row() {
        // On a 4x1 torus north and south wrap back onto the same row.
        let mapper = IndexMapper::new(4, 1);
        let counter = NeighborCounter::new(mapper);
        let cells = grid_with(4, 1, &[(1, 0)]);
        assert_eq!(counter.count(&cells, 0, 0), 3);
        assert_eq!(counter.count(&cells, 1, 0), 2);
        assert_eq!(counter.count_modular(&cells, 1, 0), 2);
    }

    proptest! {
        #[test]
        fn prop_branch_count_matches_modular(
            w in 1usize..24,
            h in 1usize..24,
            bits in proptest::collection::vec(any::<bool>(), 24 * 24),
        ) {
            let mapper = IndexMapper::new(w, h);
            let counter = NeighborCounter::new(mapper);
            let cells: Vec<Cell> = bits[..w * h].iter().map(|&b| Cell::from(b)).collect();
            for y in 0..h {
                for x in 0..w {
                    let fast = counter.count(&cells, x, y);
                    prop_assert!(fast <= 8);
                    prop_assert_eq!(fast, counter.count_modular(&cells, x, y));
                }
            }
        }
    }
}
