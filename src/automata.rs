//! Cellular automaton for binary cave/land masks
//!
//! Cells start filled at random, then a birth/survival rule over the Moore
//! neighborhood smooths them into organic shapes. `true` means filled (wall).

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{Grid, MOORE_OFFSETS};

/// Out-of-bounds neighbors count as filled: map edges abut solid rock, which
/// pulls cells near the border toward becoming walls.
pub const EDGE_COUNTS_AS_FILLED: bool = true;

/// Automaton parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomataParams {
    /// Chance that an interior cell starts filled (0.0-1.0)
    pub fill_probability: f64,
    /// An empty cell becomes filled with at least this many filled neighbors
    pub birth_threshold: u8,
    /// A filled cell stays filled with at least this many filled neighbors
    pub death_threshold: u8,
    /// Number of smoothing steps after randomizing
    pub iterations: usize,
}

impl Default for AutomataParams {
    fn default() -> Self {
        Self {
            fill_probability: 0.45,
            birth_threshold: 5,
            death_threshold: 4,
            iterations: 5,
        }
    }
}

/// A binary mask evolving under a birth/survival rule.
///
/// The border ring is filled after every operation.
#[derive(Clone, Debug)]
pub struct CellularAutomata {
    grid: Grid<bool>,
}

impl CellularAutomata {
    /// A fully filled mask of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new_with(width, height, true),
        }
    }

    pub fn grid(&self) -> &Grid<bool> {
        &self.grid
    }

    pub fn into_grid(self) -> Grid<bool> {
        self.grid
    }

    /// Fill each interior cell independently with probability
    /// `fill_probability`; border cells are always filled.
    ///
    /// The probability is clamped into [0, 1]; NaN counts as 0.
    pub fn randomize<R: Rng>(&mut self, fill_probability: f64, rng: &mut R) {
        let p = if fill_probability.is_nan() { 0.0 } else { fill_probability.clamp(0.0, 1.0) };
        let (width, height) = (self.grid.width(), self.grid.height());
        let rolls = Grid::from_fn(width, height, |_, _| rng.gen_bool(p));
        self.grid = Grid::from_fn(width, height, |x, y| rolls.is_border(x, y) || *rolls.get(x, y));
    }

    /// Apply one birth/survival step, reading only the previous generation.
    pub fn step(&mut self, birth_threshold: u8, death_threshold: u8) {
        let prev = &self.grid;
        let next = Grid::from_fn_par(prev.width(), prev.height(), |x, y| {
            if prev.is_border(x, y) {
                return true;
            }
            let n = filled_neighbors(prev, x, y);
            if *prev.get(x, y) {
                n >= death_threshold
            } else {
                n >= birth_threshold
            }
        });
        self.grid = next;
    }

    /// Randomize once, then step `params.iterations` times.
    pub fn generate<R: Rng>(&mut self, params: &AutomataParams, rng: &mut R) -> &Grid<bool> {
        self.randomize(params.fill_probability, rng);
        for i in 0..params.iterations {
            self.step(params.birth_threshold, params.death_threshold);
            debug!(iteration = i, filled = self.filled_count(), "automata step");
        }
        &self.grid
    }

    pub fn filled_count(&self) -> usize {
        self.grid.as_slice().iter().filter(|&&c| c).count()
    }
}

/// Filled cells among the 8 Moore neighbors, edges per [`EDGE_COUNTS_AS_FILLED`].
pub fn filled_neighbors(grid: &Grid<bool>, x: usize, y: usize) -> u8 {
    MOORE_OFFSETS
        .iter()
        .filter(|&&(dx, dy)| {
            grid.get_signed(x as i64 + dx, y as i64 + dy)
                .copied()
                .unwrap_or(EDGE_COUNTS_AS_FILLED)
        })
        .count() as u8
}
