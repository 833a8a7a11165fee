//! Construction errors for grids and dispatchers.

use crate::schema::ConfigError;

/// Errors raised while building a grid, its buffers or its dispatcher.
///
/// Nothing inside a step can fail; these are all construction-time.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Grid of {width}x{height} cells does not fit in memory")]
    GridTooLarge { width: usize, height: usize },

    #[error("Cell buffer has length {actual}, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Byte {value} at offset {offset} is not a valid cell (expected 0 or 1)")]
    InvalidCellByte { offset: usize, value: u8 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
