//! Seed types for initializing simulations.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::compute::{Cell, IndexMapper};

/// Initial pattern for a new grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::Random {
                density: 0.25,
                seed: 1,
            },
        }
    }
}

impl From<Pattern> for Seed {
    fn from(pattern: Pattern) -> Self {
        Self { pattern }
    }
}

/// Initial cell assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Every cell dead.
    Empty,
    /// Each cell alive independently with probability `density`.
    Random {
        /// Fraction of live cells, clamped to [0, 1]. NaN seeds nothing.
        density: f64,
        /// Random seed.
        seed: u64,
    },
    /// Explicit live cells. Coordinates wrap onto the torus.
    Cells { cells: Vec<(usize, usize)> },
    /// A named shape with its top-left corner at `origin`.
    Shape { shape: Shape, origin: (usize, usize) },
    /// Union of several patterns.
    Composite { patterns: Vec<Pattern> },
}

/// Well-known life patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// 2x2 still life.
    Block,
    /// 4x3 still life.
    Beehive,
    /// Horizontal period-2 oscillator.
    Blinker,
    /// Period-2 oscillator.
    Toad,
    /// Diagonal spaceship moving (+1, +1) every 4 generations.
    Glider,
    /// Orthogonal spaceship moving (+2, 0) every 4 generations.
    LightweightSpaceship,
    /// Emits a glider every 30 generations.
    GosperGliderGun,
}

impl Shape {
    /// Live cell offsets relative to the top-left of the bounding box.
    pub fn cells(self) -> &'static [(usize, usize)] {
        match self {
            Shape::Block => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Shape::Beehive => &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
            Shape::Blinker => &[(0, 0), (1, 0), (2, 0)],
            Shape::Toad => &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
            Shape::Glider => &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
            Shape::LightweightSpaceship => &[
                (0, 0),
                (3, 0),
                (4, 1),
                (0, 2),
                (4, 2),
                (1, 3),
                (2, 3),
                (3, 3),
                (4, 3),
            ],
            Shape::GosperGliderGun => &[
                (24, 0),
                (22, 1),
                (24, 1),
                (12, 2),
                (13, 2),
                (20, 2),
                (21, 2),
                (34, 2),
                (35, 2),
                (11, 3),
                (15, 3),
                (20, 3),
                (21, 3),
                (34, 3),
                (35, 3),
                (0, 4),
                (1, 4),
                (10, 4),
                (16, 4),
                (20, 4),
                (21, 4),
                (0, 5),
                (1, 5),
                (10, 5),
                (14, 5),
                (16, 5),
                (17, 5),
                (22, 5),
                (24, 5),
                (10, 6),
                (16, 6),
                (24, 6),
                (11, 7),
                (15, 7),
                (12, 8),
                (13, 8),
            ],
        }
    }

    /// Bounding box `(width, height)`.
    pub fn extent(self) -> (usize, usize) {
        self.cells()
            .iter()
            .fold((0, 0), |(w, h), &(x, y)| (w.max(x + 1), h.max(y + 1)))
    }
}

impl Seed {
    /// Generate the initial generation for a grid described by `mapper`.
    pub fn generate(&self, mapper: &IndexMapper) -> Vec<Cell> {
        let mut cells = vec![Cell::Dead; mapper.len()];
        self.pattern.apply(mapper, &mut cells);
        cells
    }
}

impl Pattern {
    /// Set this pattern's live cells in `cells`. Never clears a cell.
    fn apply(&self, mapper: &IndexMapper, cells: &mut [Cell]) {
        match self {
            Pattern::Empty => {}
            Pattern::Random { density, seed } => {
                let density = if density.is_nan() {
                    0.0
                } else {
                    density.clamp(0.0, 1.0)
                };
                let mut rng = StdRng::seed_from_u64(*seed);
                for cell in cells.iter_mut() {
                    if rng.gen_bool(density) {
                        *cell = Cell::Alive;
                    }
                }
            }
            Pattern::Cells { cells: alive } => {
                for &(x, y) in alive {
                    cells[mapper.wrapped_offset(x, y)] = Cell::Alive;
                }
            }
            Pattern::Shape { shape, origin } => {
                // Reduce first so adding the shape offset cannot overflow.
                let ox = origin.0 % mapper.width();
                let oy = origin.1 % mapper.height();
                for &(dx, dy) in shape.cells() {
                    cells[mapper.wrapped_offset(ox + dx, oy + dy)] = Cell::Alive;
                }
            }
            Pattern::Composite { patterns } => {
                for pattern in patterns {
                    pattern.apply(mapper, cells);
                }
            }
        }
    }
}
