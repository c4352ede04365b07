//! Debug tool for comparing erosion stages visually
//! Renders one seed's elevation raw, after thermal erosion, after smoothing,
//! and after river carving, as a 2x2 sheet of shaded heightmaps

use tracing::info;
use worldgen::erosion::{self, ErosionParams};
use worldgen::noise_field::{fill_grid, NoiseField};
use worldgen::preview::{compose_sheet, draw_rivers, render_elevation, save_png};
use worldgen::seeds::{WorldSeed, WorldSeeds};
use worldgen::WorldConfig;

const WIDTH: usize = 256;
const HEIGHT: usize = 256;
const SEED: u64 = 42;
const OUTPUT: &str = "erosion_comparison.png";

fn main() -> worldgen::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = WorldConfig::new(WIDTH, HEIGHT);
    let seeds = WorldSeeds::from_master(WorldSeed::new(SEED));
    let field = NoiseField::new(WorldSeed::new(seeds.elevation));
    let raw = fill_grid(WIDTH, HEIGHT, &field.fractal_source(config.noise.fractal_params()?));

    let params = ErosionParams {
        thermal_iterations: 10,
        talus: 0.005,
        smooth_iterations: 2,
        river_count: 60,
        ..Default::default()
    };

    let (thermal, moved) = erosion::thermal_erosion(&raw, params.thermal_iterations, params.talus);
    info!(moved, "1. thermal");
    let smoothed = erosion::smooth(&thermal, params.smooth_iterations);
    info!("2. smoothed");
    let (carved, rivers) = erosion::carve_rivers(
        &smoothed,
        params.river_count,
        params.river_walk,
        &mut seeds.erosion_rng(),
    );
    let reached = rivers.iter().filter(|r| r.end == erosion::RiverEnd::ReachedOcean).count();
    info!(rivers = rivers.len(), reached_ocean = reached, "3. rivers");

    let mut rivers_img = render_elevation(&carved.clamp_values(0.0, 1.0));
    draw_rivers(&mut rivers_img, &rivers);

    let sheet = compose_sheet(
        &[
            render_elevation(&raw),
            render_elevation(&thermal),
            render_elevation(&smoothed),
            rivers_img,
        ],
        2,
    );
    save_png(&sheet, OUTPUT)?;
    info!(path = OUTPUT, "saved erosion comparison (raw | thermal / smoothed | rivers)");
    Ok(())
}
