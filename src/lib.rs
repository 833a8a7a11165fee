//! Torus Life - Data-parallel life-like cellular automata.
//!
//! A fixed-size toroidal grid of binary cells is advanced one generation at
//! a time. Each generation reads one buffer and writes the other; the two
//! swap roles once every cell has been written, so readers only ever see
//! complete generations.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types and seeding for simulations
//! - `compute`: Index mapping, neighbour counting, rules, double-buffered
//!   storage and the tiled dispatcher
//!
//! # Example
//!
//! ```rust,no_run
//! use torus_life::{
//!     compute::Grid,
//!     schema::{Pattern, Seed, Shape, SimulationConfig},
//! };
//!
//! // Create configuration
//! let config = SimulationConfig::default();
//!
//! // Seed a glider gun in the top-left corner
//! let seed = Seed {
//!     pattern: Pattern::Shape {
//!         shape: Shape::GosperGliderGun,
//!         origin: (2, 2),
//!     },
//! };
//!
//! // Create grid and run simulation
//! let mut grid = Grid::from_config(&config, &seed)?;
//! grid.run(120);
//!
//! println!("Population after 120 steps: {}", grid.population());
//! # Ok::<(), torus_life::compute::GridError>(())
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Cell, Dispatcher, EvolutionRule, Grid, GridError, GridStats, LifeLikeRule};
pub use schema::{Pattern, Seed, Shape, SimulationConfig};
