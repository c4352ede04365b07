//! Erosion simulation module
//!
//! Implements two complementary techniques on a normalized elevation grid:
//! - **Thermal erosion**: material slides from steep cells to lower neighbors,
//!   optionally followed by box-filter smoothing
//! - **River carving**: greedy steepest-descent walks that lower their path
//!
//! Erosion can push values outside [0, 1]; callers clamp before classifying.

pub mod params;
pub mod rivers;
pub mod thermal;

pub use params::{ErosionParams, ErosionPreset, RiverWalk};
pub use rivers::{carve_river, carve_rivers, RiverEnd, RiverPath};
pub use thermal::{smooth, thermal_erosion};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::grid::Grid;

/// Statistics from erosion simulation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErosionStats {
    /// Material moved by thermal passes (in height units)
    pub thermal_moved: f64,
    /// Number of thermal passes run
    pub thermal_iterations: usize,
    /// Number of smoothing passes run
    pub smooth_iterations: usize,
    /// Length of every carved river, in cells
    pub river_lengths: Vec<usize>,
    /// Rivers that reached the ocean level
    pub rivers_reaching_ocean: usize,
    /// Total elevation removed by river carving
    pub total_carved: f64,
}

/// Run the complete erosion pipeline: thermal passes, smoothing, then rivers.
///
/// Returns the eroded grid, the traced rivers, and statistics.
pub fn simulate_erosion<R: Rng>(
    heightmap: &Grid<f32>,
    params: &ErosionParams,
    rng: &mut R,
) -> (Grid<f32>, Vec<RiverPath>, ErosionStats) {
    let mut stats = ErosionStats {
        thermal_iterations: params.thermal_iterations,
        smooth_iterations: params.smooth_iterations,
        ..Default::default()
    };

    let (eroded, moved) = thermal_erosion(heightmap, params.thermal_iterations, params.talus);
    stats.thermal_moved = moved;

    let smoothed = smooth(&eroded, params.smooth_iterations);

    let before_rivers = smoothed.sum();
    let (carved, rivers) = carve_rivers(&smoothed, params.river_count, params.river_walk, rng);
    stats.total_carved = before_rivers - carved.sum();
    stats.river_lengths = rivers.iter().map(RiverPath::len).collect();
    stats.rivers_reaching_ocean = rivers
        .iter()
        .filter(|r| r.end == RiverEnd::ReachedOcean)
        .count();

    info!(
        thermal_moved = stats.thermal_moved,
        rivers = rivers.len(),
        reached_ocean = stats.rivers_reaching_ocean,
        total_carved = stats.total_carved,
        "erosion complete"
    );

    (carved, rivers, stats)
}
