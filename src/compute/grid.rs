//! Host-facing simulation handle.
//!
//! [`Grid`] ties a [`GridStateStore`], a rule and a [`Dispatcher`] together.
//! `step` takes `&mut self` while `current_view` and `toggle` borrow the
//! grid, so a host cannot read or edit cells while a step is running and
//! cannot hold a view across a step.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{Seed, SimulationConfig};

use super::{
    CancelToken, Cell, Dispatcher, EvolutionRule, GridError, GridStateStore, IndexMapper,
    LifeLikeRule, StepOutcome,
};

/// A toroidal life-like automaton.
#[derive(Debug, Clone)]
pub struct Grid<R = LifeLikeRule> {
    store: GridStateStore,
    rule: R,
    dispatcher: Dispatcher,
}

impl Grid<LifeLikeRule> {
    /// Conway's rule with the default dispatcher.
    pub fn new(width: usize, height: usize, seed: &Seed) -> Result<Self, GridError> {
        Self::with_rule(
            width,
            height,
            seed,
            LifeLikeRule::conway(),
            Dispatcher::default(),
        )
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &SimulationConfig, seed: &Seed) -> Result<Self, GridError> {
        config.validate()?;
        let dispatcher = Dispatcher::new(&config.dispatch)?;
        Self::with_rule(config.width, config.height, seed, config.rule, dispatcher)
    }
}

impl<R: EvolutionRule> Grid<R> {
    pub fn with_rule(
        width: usize,
        height: usize,
        seed: &Seed,
        rule: R,
        dispatcher: Dispatcher,
    ) -> Result<Self, GridError> {
        let mapper = IndexMapper::try_new(width, height)?;
        let store = GridStateStore::new(width, height, seed.generate(&mapper))?;
        debug!("Created {width}x{height} grid ({:?} dispatch)", dispatcher.schedule());
        Ok(Self {
            store,
            rule,
            dispatcher,
        })
    }

    /// Wrap an existing store, e.g. one restored with
    /// [`GridStateStore::from_bytes`].
    pub fn from_store(store: GridStateStore, rule: R, dispatcher: Dispatcher) -> Self {
        Self {
            store,
            rule,
            dispatcher,
        }
    }

    /// Advance exactly one generation.
    pub fn step(&mut self) {
        self.dispatcher.step(&mut self.store, &self.rule);
    }

    /// Advance one generation unless `cancel` fires first.
    pub fn step_cancellable(&mut self, cancel: &CancelToken) -> StepOutcome {
        self.dispatcher
            .step_cancellable(&mut self.store, &self.rule, cancel)
    }

    /// Advance `steps` generations.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Advance up to `steps` generations, stopping at the first cancelled
    /// step. Returns the number of committed steps.
    pub fn run_cancellable(&mut self, steps: u64, cancel: &CancelToken) -> u64 {
        let mut committed = 0;
        while committed < steps && self.step_cancellable(cancel).is_committed() {
            committed += 1;
        }
        committed
    }

    /// The current generation, row-major.
    #[inline]
    pub fn current_view(&self) -> &[Cell] {
        self.store.current()
    }

    /// The current generation as bytes (`0` dead, `1` alive), for upload
    /// to a renderer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.store.current())
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        let mapper = self.store.mapper();
        mapper
            .contains(x, y)
            .then(|| self.store.current()[mapper.index(x, y)])
    }

    /// Flip one cell of the current generation.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid.
    pub fn toggle(&mut self, x: usize, y: usize) {
        let mapper = *self.store.mapper();
        assert!(
            mapper.contains(x, y),
            "toggle({x}, {y}) outside {}x{} grid",
            mapper.width(),
            mapper.height()
        );
        let cell = &mut self.store.current_mut()[mapper.index(x, y)];
        *cell = cell.toggled();
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.store.mapper().width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.store.mapper().height()
    }

    #[inline]
    pub fn mapper(&self) -> &IndexMapper {
        self.store.mapper()
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.store.current().iter().filter(|c| c.is_alive()).count()
    }

    pub fn stats(&self) -> GridStats {
        GridStats::from_grid(self)
    }
}

/// Simulation statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub generation: u64,
    pub population: usize,
    /// Live fraction of all cells.
    pub density: f64,
}

impl GridStats {
    pub fn from_grid<R: EvolutionRule>(grid: &Grid<R>) -> Self {
        let population = grid.population();
        Self {
            generation: grid.generation(),
            population,
            density: population as f64 / grid.mapper().len() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ConwayRule;
    use crate::schema::{DispatchConfig, Pattern, Schedule, Shape};

    fn shape_grid(width: usize, height: usize, shape: Shape, origin: (usize, usize)) -> Grid {
        Grid::new(width, height, &Seed::from(Pattern::Shape { shape, origin })).unwrap()
    }

    fn alive_cells<R: EvolutionRule>(grid: &Grid<R>) -> Vec<(usize, usize)> {
        let mapper = grid.mapper();
        grid.current_view()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(offset, _)| mapper.coordinate(offset))
            .collect()
    }

    fn translated(
        cells: &[(usize, usize)],
        dx: usize,
        dy: usize,
        w: usize,
        h: usize,
    ) -> Vec<(usize, usize)> {
        let mut moved: Vec<_> = cells
            .iter()
            .map(|&(x, y)| ((x + dx) % w, (y + dy) % h))
            .collect();
        moved.sort_by_key(|&(x, y)| (y, x));
        moved
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            Grid::new(0, 10, &Seed::default()),
            Err(GridError::InvalidDimensions { .. })
        ));
        let config = SimulationConfig {
            height: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            Grid::from_config(&config, &Seed::default()),
            Err(GridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_block_is_still_life() {
        let mut grid = shape_grid(12, 12, Shape::Block, (5, 5));
        let initial = grid.current_view().to_vec();
        for generation in 1..=10 {
            grid.step();
            assert_eq!(grid.generation(), generation);
            assert_eq!(grid.current_view(), initial.as_slice());
        }
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut grid = shape_grid(11, 11, Shape::Blinker, (4, 5));
        assert_eq!(alive_cells(&grid), vec![(4, 5), (5, 5), (6, 5)]);

        grid.step();
        assert_eq!(alive_cells(&grid), vec![(5, 4), (5, 5), (5, 6)]);

        grid.step();
        assert_eq!(alive_cells(&grid), vec![(4, 5), (5, 5), (6, 5)]);
    }

    #[test]
    fn test_glider_translates_diagonally() {
        let (w, h) = (20, 20);
        let mut grid = shape_grid(w, h, Shape::Glider, (6, 6));
        let start = alive_cells(&grid);

        grid.run(4);
        assert_eq!(alive_cells(&grid), translated(&start, 1, 1, w, h));

        grid.run(8);
        assert_eq!(alive_cells(&grid), translated(&start, 3, 3, w, h));
    }

    #[test]
    fn test_glider_circumnavigates_torus() {
        // 4 generations per cell of travel: after 4 * 8 steps it is home.
        let mut grid = shape_grid(8, 8, Shape::Glider, (6, 6));
        let start = grid.current_view().to_vec();
        grid.run(32);
        assert_eq!(grid.current_view(), start.as_slice());
    }

    #[test]
    fn test_spaceship_moves_east() {
        let (w, h) = (30, 12);
        let mut grid = shape_grid(w, h, Shape::LightweightSpaceship, (26, 4));
        let start = alive_cells(&grid);
        grid.run(4);
        assert_eq!(alive_cells(&grid), translated(&start, 2, 0, w, h));
    }

    #[test]
    fn test_glider_gun_emits() {
        let mut grid = shape_grid(80, 60, Shape::GosperGliderGun, (2, 2));
        assert_eq!(grid.population(), 36);
        grid.run(30);
        assert_eq!(grid.population(), 41);
        grid.run(30);
        assert_eq!(grid.population(), 46);
    }

    #[test]
    fn test_toggle_edits_current_generation() {
        let mut grid = Grid::new(6, 6, &Seed::from(Pattern::Empty)).unwrap();
        grid.toggle(0, 0);
        assert_eq!(grid.get(0, 0), Some(Cell::Alive));
        assert_eq!(grid.population(), 1);
        grid.toggle(0, 0);
        assert_eq!(grid.get(0, 0), Some(Cell::Dead));
        assert_eq!(grid.get(6, 0), None);
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    #[should_panic(expected = "outside 6x6 grid")]
    fn test_toggle_out_of_range_panics() {
        let mut grid = Grid::new(6, 6, &Seed::from(Pattern::Empty)).unwrap();
        grid.toggle(3, 6);
    }

    #[test]
    fn test_toggled_blinker_edit_feeds_next_step() {
        // Build a blinker by hand between steps.
        let mut grid = Grid::new(9, 9, &Seed::from(Pattern::Empty)).unwrap();
        for x in 3..6 {
            grid.toggle(x, 4);
        }
        grid.step();
        assert_eq!(alive_cells(&grid), vec![(4, 3), (4, 4), (4, 5)]);
    }

    #[test]
    fn test_cancelled_run_keeps_last_committed_generation() {
        let mut grid = Grid::new(16, 16, &Seed::default()).unwrap();
        let token = CancelToken::new();
        assert_eq!(grid.run_cancellable(3, &token), 3);
        let snapshot = grid.current_view().to_vec();

        token.cancel();
        assert_eq!(grid.run_cancellable(5, &token), 0);
        assert_eq!(grid.generation(), 3);
        assert_eq!(grid.current_view(), snapshot.as_slice());
    }

    #[test]
    fn test_custom_rule_and_schedules_agree() {
        let seed = Seed::from(Pattern::Random {
            density: 0.4,
            seed: 11,
        });
        let config = SimulationConfig {
            width: 48,
            height: 40,
            rule: LifeLikeRule::high_life(),
            dispatch: DispatchConfig {
                schedule: Schedule::Sequential,
                ..DispatchConfig::default()
            },
        };
        let mut sequential = Grid::from_config(&config, &seed).unwrap();

        let mut closure = Grid::with_rule(
            48,
            40,
            &seed,
            |state: Cell, n: u8| LifeLikeRule::high_life().next_state(state, n),
            Dispatcher::parallel().with_tile_size(7, 5),
        )
        .unwrap();

        sequential.run(10);
        closure.run(10);
        assert_eq!(sequential.as_bytes(), closure.as_bytes());
    }

    #[test]
    fn test_from_store() {
        let store = GridStateStore::from_bytes(3, 3, &[0, 0, 0, 1, 1, 1, 0, 0, 0]).unwrap();
        let mut grid = Grid::from_store(store, ConwayRule, Dispatcher::sequential());
        grid.step();
        assert_eq!(grid.as_bytes(), &[1, 1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_stats() {
        let grid = shape_grid(10, 10, Shape::Block, (0, 0));
        let stats = grid.stats();
        assert_eq!(stats.generation, 0);
        assert_eq!(stats.population, 4);
        assert!((stats.density - 0.04).abs() < 1e-12);
    }
}
