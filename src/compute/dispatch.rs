//! Tile-based dispatch of one generation.
//!
//! The grid is covered by fixed-size tiles, mirroring compute workgroups.
//! Every invocation `(tile, local)` maps to at most one cell; invocations
//! that fall past the right or bottom edge (when the tile size does not
//! divide the grid) resolve to `None` and write nothing.
//!
//! Tiles sharing a tile row form a band, which is a contiguous run of whole
//! rows in the row-major buffer. Bands are handed out as disjoint `&mut`
//! chunks of `next`, so parallel execution needs no locking: each task reads
//! the shared `current` slice and writes only inside its own chunk.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::{Cell, EvolutionRule, GridError, GridStateStore, IndexMapper, NeighborCounter};
use crate::schema::{DispatchConfig, Schedule};

/// One scheduled invocation: a tile and a lane inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkUnit {
    pub tile_x: usize,
    pub tile_y: usize,
    pub local_x: usize,
    pub local_y: usize,
}

/// Tiling of a `width x height` grid into `tile_width x tile_height` tiles.
///
/// A tile side larger than the grid is clamped to the grid, so one tile
/// then spans that whole axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
    tiles_x: usize,
    tiles_y: usize,
}

impl TileLayout {
    pub fn new(mapper: &IndexMapper, tile_width: usize, tile_height: usize) -> Self {
        assert!(tile_width > 0 && tile_height > 0, "tile size must be non-zero");
        let width = mapper.width();
        let height = mapper.height();
        let tile_width = tile_width.min(width);
        let tile_height = tile_height.min(height);
        Self {
            width,
            height,
            tile_width,
            tile_height,
            tiles_x: width.div_ceil(tile_width),
            tiles_y: height.div_ceil(tile_height),
        }
    }

    #[inline]
    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    #[inline]
    pub fn tiles_x(&self) -> usize {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> usize {
        self.tiles_y
    }

    /// Total invocations scheduled. At least `width * height`; larger when
    /// the tile size does not divide the grid.
    pub fn invocation_count(&self) -> usize {
        (self.tiles_x * self.tile_width).saturating_mul(self.tiles_y * self.tile_height)
    }

    /// Grid coordinate handled by `unit`, or `None` if it was overdispatched.
    #[inline]
    pub fn resolve(&self, unit: WorkUnit) -> Option<(usize, usize)> {
        if unit.local_x >= self.tile_width || unit.local_y >= self.tile_height {
            return None;
        }
        let x = unit.tile_x.checked_mul(self.tile_width)?.checked_add(unit.local_x)?;
        let y = unit.tile_y.checked_mul(self.tile_height)?.checked_add(unit.local_y)?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Every scheduled invocation, tile by tile.
    pub fn work_units(&self) -> impl Iterator<Item = WorkUnit> + '_ {
        (0..self.tiles_y).flat_map(move |tile_y| self.band_units(tile_y))
    }

    fn band_units(&self, tile_y: usize) -> impl Iterator<Item = WorkUnit> + '_ {
        (0..self.tiles_x).flat_map(move |tile_x| {
            (0..self.tile_height).flat_map(move |local_y| {
                (0..self.tile_width).map(move |local_x| WorkUnit {
                    tile_x,
                    tile_y,
                    local_x,
                    local_y,
                })
            })
        })
    }

    /// Cells in one full band of tiles. Never exceeds the grid size.
    fn band_len(&self) -> usize {
        self.width * self.tile_height
    }
}

/// Cooperative cancellation flag shared between a host and a running step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a cancellable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The new generation was published.
    Committed,
    /// Cancelled before completion; the previous generation is unchanged.
    Discarded,
}

impl StepOutcome {
    #[inline]
    pub fn is_committed(self) -> bool {
        self == StepOutcome::Committed
    }
}

/// Runs the transition function over every cell and commits the result.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tile_width: usize,
    tile_height: usize,
    schedule: Schedule,
    #[cfg(not(target_arch = "wasm32"))]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        let config = DispatchConfig::default();
        Self {
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            schedule: config.schedule,
            #[cfg(not(target_arch = "wasm32"))]
            pool: None,
        }
    }
}

impl Dispatcher {
    /// Build a dispatcher, creating a dedicated worker pool when
    /// `config.threads` is set.
    pub fn new(config: &DispatchConfig) -> Result<Self, GridError> {
        config.validate()?;

        #[cfg(not(target_arch = "wasm32"))]
        let pool = match config.threads {
            Some(threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("torus-life-{i}"))
                    .build()?,
            )),
            None => None,
        };

        debug!(
            "Dispatcher: {}x{} tiles, {:?} schedule, threads={:?}",
            config.tile_width, config.tile_height, config.schedule, config.threads
        );

        Ok(Self {
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            schedule: config.schedule,
            #[cfg(not(target_arch = "wasm32"))]
            pool,
        })
    }

    /// Single-task dispatcher with default tiles.
    pub fn sequential() -> Self {
        Self {
            schedule: Schedule::Sequential,
            ..Self::default()
        }
    }

    /// Fan-out dispatcher on the global rayon pool with default tiles.
    pub fn parallel() -> Self {
        Self {
            schedule: Schedule::Parallel,
            ..Self::default()
        }
    }

    /// Replace the tile size. Panics if either side is zero.
    pub fn with_tile_size(mut self, tile_width: usize, tile_height: usize) -> Self {
        assert!(tile_width > 0 && tile_height > 0, "tile size must be non-zero");
        self.tile_width = tile_width;
        self.tile_height = tile_height;
        self
    }

    #[inline]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Tiling this dispatcher would use for `mapper`.
    pub fn layout(&self, mapper: &IndexMapper) -> TileLayout {
        TileLayout::new(mapper, self.tile_width, self.tile_height)
    }

    /// Advance `store` by one generation under `rule`.
    pub fn step<R>(&self, store: &mut GridStateStore, rule: &R)
    where
        R: EvolutionRule + ?Sized,
    {
        let outcome = self.step_cancellable(store, rule, &CancelToken::new());
        debug_assert!(outcome.is_committed());
    }

    /// Advance `store` by one generation unless `cancel` fires first.
    ///
    /// Cancellation is polled before each band starts. If any band is
    /// skipped the partially written `next` buffer is left unpublished and
    /// the store keeps its current generation.
    pub fn step_cancellable<R>(
        &self,
        store: &mut GridStateStore,
        rule: &R,
        cancel: &CancelToken,
    ) -> StepOutcome
    where
        R: EvolutionRule + ?Sized,
    {
        let mapper = *store.mapper();
        let layout = self.layout(&mapper);
        let counter = NeighborCounter::new(mapper);
        let band_len = layout.band_len();

        let buffers = store.buffers_mut();
        let current = buffers.current;
        let next = buffers.next;

        let kernel = |(tile_y, band): (usize, &mut [Cell])| {
            evolve_band(&layout, &counter, &mapper, current, rule, tile_y, band, cancel)
        };

        let completed = match self.schedule {
            #[cfg(not(target_arch = "wasm32"))]
            Schedule::Parallel => {
                let mut fan_out = || next.par_chunks_mut(band_len).enumerate().all(kernel);
                match &self.pool {
                    Some(pool) => pool.install(fan_out),
                    None => fan_out(),
                }
            }
            _ => next.chunks_mut(band_len).enumerate().all(kernel),
        };

        if completed {
            store.commit();
            trace!("Committed generation {}", store.generation());
            StepOutcome::Committed
        } else {
            debug!(
                "Step cancelled; generation {} kept as current",
                store.generation()
            );
            StepOutcome::Discarded
        }
    }
}

/// Evaluate every invocation of tile row `tile_y`, writing into `band`
/// (the rows of `next` that tile row covers). Returns false if cancelled
/// before starting.
#[allow(clippy::too_many_arguments)]
fn evolve_band<R>(
    layout: &TileLayout,
    counter: &NeighborCounter,
    mapper: &IndexMapper,
    current: &[Cell],
    rule: &R,
    tile_y: usize,
    band: &mut [Cell],
    cancel: &CancelToken,
) -> bool
where
    R: EvolutionRule + ?Sized,
{
    if cancel.is_cancelled() {
        return false;
    }

    let width = mapper.width();
    let row_base = tile_y * layout.tile_height();

    for unit in layout.band_units(tile_y) {
        let Some((x, y)) = layout.resolve(unit) else {
            continue;
        };
        let state = current[mapper.index(x, y)];
        let neighbors = counter.count(current, x, y);
        band[(y - row_base) * width + x] = rule.next_state(state, neighbors);
    }

    true
}
