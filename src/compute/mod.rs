//! Compute module - Double-buffered evolution of the cell grid.

mod cell;
mod dispatch;
mod error;
mod grid;
mod index;
mod neighbors;
mod rule;
mod store;

pub use cell::*;
pub use dispatch::*;
pub use error::*;
pub use grid::*;
pub use index::*;
pub use neighbors::*;
pub use rule::*;
pub use store::*;
