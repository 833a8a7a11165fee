//! Configuration types for simulation parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compute::LifeLikeRule;

fn default_tile_size() -> usize {
    8
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Transition rule in `B…/S…` notation.
    #[serde(default)]
    pub rule: LifeLikeRule,
    /// How each generation is scheduled.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            rule: LifeLikeRule::conway(),
            dispatch: DispatchConfig::default(),
        }
    }
}

/// How a generation is fanned out across workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// All tiles on the calling thread.
    Sequential,
    /// Tile rows spread across a rayon pool.
    #[default]
    Parallel,
}

/// Tiling and threading parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Tile width in cells. Values wider than the grid act as the grid width.
    #[serde(default = "default_tile_size")]
    pub tile_width: usize,
    /// Tile height in cells.
    #[serde(default = "default_tile_size")]
    pub tile_height: usize,
    #[serde(default)]
    pub schedule: Schedule,
    /// Dedicated worker count. `None` uses the global rayon pool.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tile_width: default_tile_size(),
            tile_height: default_tile_size(),
            schedule: Schedule::default(),
            threads: None,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ConfigError::InvalidTileSize);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreadCount);
        }
        Ok(())
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        self.dispatch.validate()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Tile dimensions must be non-zero")]
    InvalidTileSize,
    #[error("Thread count must be non-zero when set")]
    InvalidThreadCount,
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
