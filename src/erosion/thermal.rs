//! Thermal erosion and box-filter smoothing
//!
//! Both operations read a frozen snapshot of the previous pass and write a
//! fresh grid, so results do not depend on scan order and each pass runs in
//! parallel.

use rayon::prelude::*;
use tracing::debug;

use crate::grid::{Grid, MOORE_OFFSETS};
use super::params::THERMAL_TRANSFER_RATE;

/// Run `iterations` thermal passes.
///
/// Wherever a cell stands more than `talus` above one of its 8 neighbors,
/// 10% of the difference slides down to that neighbor. Returns the eroded
/// grid and the total material moved.
pub fn thermal_erosion(grid: &Grid<f32>, iterations: usize, talus: f32) -> (Grid<f32>, f64) {
    let mut current = grid.clone();
    let mut total_moved = 0.0;

    for i in 0..iterations {
        let (next, moved) = thermal_pass(&current, talus);
        debug!(iteration = i, moved, "thermal erosion pass");
        total_moved += moved;
        current = next;
    }

    (current, total_moved)
}

/// One thermal pass in gather form: each cell adds what its higher neighbors
/// shed onto it and subtracts what it sheds onto lower neighbors. Every
/// pairwise transfer appears once on each side, so the grid's sum is kept.
fn thermal_pass(snapshot: &Grid<f32>, talus: f32) -> (Grid<f32>, f64) {
    let width = snapshot.width();
    let height = snapshot.height();

    let (heights, outflows): (Vec<f32>, Vec<f32>) = (0..width * height)
        .into_par_iter()
        .map(|idx| {
            let x = idx % width;
            let y = idx / width;
            let h = *snapshot.get(x, y);
            let mut inflow = 0.0f32;
            let mut outflow = 0.0f32;

            for &(dx, dy) in &MOORE_OFFSETS {
                let Some(&nh) = snapshot.get_signed(x as i64 + dx, y as i64 + dy) else {
                    continue;
                };
                let diff = h - nh;
                if diff > talus {
                    outflow += diff * THERMAL_TRANSFER_RATE;
                } else if -diff > talus {
                    inflow += -diff * THERMAL_TRANSFER_RATE;
                }
            }

            (h - outflow + inflow, outflow)
        })
        .unzip();

    let moved = outflows.iter().map(|&v| v as f64).sum();
    (Grid::from_raw(width, height, heights), moved)
}

/// Replace every interior cell with the mean of its 3x3 block, `iterations`
/// times. The outer ring is copied through unchanged.
pub fn smooth(grid: &Grid<f32>, iterations: usize) -> Grid<f32> {
    let mut current = grid.clone();

    for _ in 0..iterations {
        let prev = &current;
        let next = Grid::from_fn_par(prev.width(), prev.height(), |x, y| {
            if prev.is_border(x, y) {
                return *prev.get(x, y);
            }
            let mut sum = 0.0f32;
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    sum += *prev.get(nx, ny);
                }
            }
            sum / 9.0
        });
        current = next;
    }

    current
}
