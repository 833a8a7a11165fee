//! Coordinate <-> flat offset mapping on a toroidal grid.
//!
//! Buffers are row-major: `offset = y * width + x`.

use super::GridError;

/// One of the eight compass directions around a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    /// All eight directions, row by row from the north-west corner.
    pub const ALL: [Direction; 8] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::West,
        Direction::East,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
    ];

    /// `(dx, dy)` step for this direction. North is `-y`.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::South => (0, 1),
            Direction::SouthEast => (1, 1),
        }
    }
}

/// Maps between `(x, y)` grid coordinates and buffer offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexMapper {
    width: usize,
    height: usize,
}

impl IndexMapper {
    /// Mapper for a `width x height` grid. Both sides must be non-zero and
    /// the cell count must fit in `usize`.
    pub fn try_new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        if width.checked_mul(height).is_none() {
            return Err(GridError::GridTooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    #[cfg(test)]
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self::try_new(width, height).expect("valid test dimensions")
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false; dimensions are non-zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Flat offset of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside grid");
        y * self.width + x
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coordinate(&self, offset: usize) -> (usize, usize) {
        debug_assert!(offset < self.len(), "offset {offset} outside grid");
        (offset % self.width, offset / self.width)
    }

    /// Flat offset of `(x, y)` after wrapping both axes onto the torus.
    ///
    /// Uses Euclidean remainder, so `-1` wraps to the last column/row.
    #[inline]
    pub fn wrapped_index(&self, x: isize, y: isize) -> usize {
        let (x, y) = self.wrap(x, y);
        y * self.width + x
    }

    /// Flat offset of a non-negative `(x, y)` of any magnitude, wrapped onto
    /// the torus.
    #[inline]
    pub fn wrapped_offset(&self, x: usize, y: usize) -> usize {
        (y % self.height) * self.width + x % self.width
    }

    /// Toroidal neighbour of `(x, y)` in `direction`.
    #[inline]
    pub fn neighbor(&self, x: usize, y: usize, direction: Direction) -> (usize, usize) {
        let (dx, dy) = direction.offset();
        self.wrap(x as isize + dx, y as isize + dy)
    }

    #[inline]
    fn wrap(&self, x: isize, y: isize) -> (usize, usize) {
        (
            x.rem_euclid(self.width as isize) as usize,
            y.rem_euclid(self.height as isize) as usize,
        )
    }
}
