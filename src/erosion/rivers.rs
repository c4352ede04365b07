//! Greedy river carving by steepest descent
//!
//! Each river starts at a random cell and repeatedly steps to its lowest
//! 8-neighbor, lowering every visited cell. This is not a flow-accumulation
//! model: a river can end in a pit far from any coast.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use super::params::{RiverWalk, RIVER_CARVE_DEPTH, RIVER_MAX_STEPS, RIVER_OCEAN_LEVEL};

/// Why a river stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiverEnd {
    /// Elevation fell below the ocean level
    ReachedOcean,
    /// No neighbor was strictly lower
    LocalMinimum,
    /// Only cells already visited were lower ([`RiverWalk::NoBacktrack`])
    Blocked,
    /// Ran out of steps
    StepLimit,
}

/// Cells visited by one river, source first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiverPath {
    pub cells: Vec<(usize, usize)>,
    pub end: RiverEnd,
}

impl RiverPath {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn source(&self) -> Option<(usize, usize)> {
        self.cells.first().copied()
    }

    pub fn mouth(&self) -> Option<(usize, usize)> {
        self.cells.last().copied()
    }
}

/// Carve `count` rivers into a copy of `grid`.
///
/// Rivers run one after another, so later rivers see the channels carved by
/// earlier ones.
pub fn carve_rivers<R: Rng>(
    grid: &Grid<f32>,
    count: usize,
    walk: RiverWalk,
    rng: &mut R,
) -> (Grid<f32>, Vec<RiverPath>) {
    let mut carved = grid.clone();
    let mut rivers = Vec::with_capacity(count);

    if carved.is_empty() {
        return (carved, rivers);
    }

    for _ in 0..count {
        let x = rng.gen_range(0..carved.width());
        let y = rng.gen_range(0..carved.height());
        rivers.push(carve_river(&mut carved, x, y, walk));
    }

    (carved, rivers)
}

/// Walk downhill from `(x, y)`, carving as it goes.
///
/// Neighbors are compared against the cell's height before it was carved.
/// Under [`RiverWalk::SteepestDescent`] a carved cell can become the lowest
/// neighbor again, so a river on a slope gentler than the carve depth swings
/// back and forth and digs itself down.
pub fn carve_river(grid: &mut Grid<f32>, mut x: usize, mut y: usize, walk: RiverWalk) -> RiverPath {
    let mut cells = Vec::new();

    for _ in 0..RIVER_MAX_STEPS {
        let h = *grid.get(x, y);
        cells.push((x, y));
        grid.set(x, y, h - RIVER_CARVE_DEPTH);

        if h < RIVER_OCEAN_LEVEL {
            return RiverPath { cells, end: RiverEnd::ReachedOcean };
        }

        let next = match walk {
            RiverWalk::SteepestDescent => lowest_neighbor(grid, x, y, h, |_| true),
            RiverWalk::NoBacktrack => {
                match lowest_neighbor(grid, x, y, h, |cell| !cells.contains(&cell)) {
                    Some(cell) => Some(cell),
                    None if lowest_neighbor(grid, x, y, h, |_| true).is_some() => {
                        return RiverPath { cells, end: RiverEnd::Blocked };
                    }
                    None => None,
                }
            }
        };

        match next {
            Some((nx, ny)) => {
                x = nx;
                y = ny;
            }
            None => return RiverPath { cells, end: RiverEnd::LocalMinimum },
        }
    }

    RiverPath { cells, end: RiverEnd::StepLimit }
}

/// The lowest 8-neighbor strictly below `h` among those `allowed` accepts.
/// Ties keep the first in scan order.
fn lowest_neighbor(
    grid: &Grid<f32>,
    x: usize,
    y: usize,
    h: f32,
    allowed: impl Fn((usize, usize)) -> bool,
) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f32)> = None;
    for (nx, ny) in grid.neighbors_8(x, y) {
        if !allowed((nx, ny)) {
            continue;
        }
        let nh = *grid.get(nx, ny);
        if nh < h && best.map_or(true, |(_, bh)| nh < bh) {
            best = Some(((nx, ny), nh));
        }
    }
    best.map(|(cell, _)| cell)
}
