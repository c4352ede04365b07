//! World generation pipeline
//!
//! Runs the terrain branch (noise, erosion, biomes, structures) and the mask
//! branch (automaton, tiles) concurrently and bundles every output into a
//! single [`WorldData`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::automata::CellularAutomata;
use crate::biomes::{self, Biome};
use crate::config::WorldConfig;
use crate::erosion::{self, ErosionStats, RiverPath};
use crate::error::{Result, WorldGenError};
use crate::grid::Grid;
use crate::noise_field::{fill_grid, FractalParams, NoiseField};
use crate::seeds::{WorldSeed, WorldSeeds};
use crate::structures::{self, PlacedStructures};
use crate::tiles::{self, TileClass};

/// Mask value the tile classes are computed against (walls)
pub const TILE_TARGET: bool = true;

/// All generated world data bundled together
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldData {
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    pub width: usize,
    pub height: usize,
    /// Eroded elevation, clamped into [0, 1]; the grid biomes were classified from
    pub elevation: Grid<f32>,
    /// Moisture (0.0-1.0)
    pub moisture: Grid<f32>,
    pub biomes: Grid<Biome>,
    pub rivers: Vec<RiverPath>,
    pub erosion: ErosionStats,
    pub structures: PlacedStructures,
    /// Automaton output, `true` = wall
    pub mask: Grid<bool>,
    /// Auto-tile class of every mask cell
    pub tiles: Grid<TileClass>,
}

impl WorldData {
    /// Convenience accessor for master seed
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer(file, self)?;
        Ok(())
    }
}

struct Terrain {
    elevation: Grid<f32>,
    moisture: Grid<f32>,
    biomes: Grid<Biome>,
    rivers: Vec<RiverPath>,
    erosion: ErosionStats,
    structures: PlacedStructures,
}

/// Generate a complete world.
pub fn generate_world(config: &WorldConfig) -> Result<WorldData> {
    let never = AtomicBool::new(false);
    generate_world_with_cancel(config, &never)
}

/// Generate a complete world, giving up with [`WorldGenError::Cancelled`] if
/// `cancel` is set. The flag is checked between stages, never inside a pass.
pub fn generate_world_with_cancel(config: &WorldConfig, cancel: &AtomicBool) -> Result<WorldData> {
    config.validate()?;
    let fractal = config.noise.fractal_params()?;
    let seeds = WorldSeeds::from_master(config.resolve_seed()?);

    info!(
        width = config.width,
        height = config.height,
        seed = seeds.master,
        "generating world"
    );
    let start = Instant::now();

    let (terrain, mask) = rayon::join(
        || generate_terrain(config, &seeds, fractal, cancel),
        || generate_mask(config, &seeds, cancel),
    );
    let terrain = terrain?;
    let (mask, tiles) = mask?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "world generated");

    Ok(WorldData {
        seeds,
        width: config.width,
        height: config.height,
        elevation: terrain.elevation,
        moisture: terrain.moisture,
        biomes: terrain.biomes,
        rivers: terrain.rivers,
        erosion: terrain.erosion,
        structures: terrain.structures,
        mask,
        tiles,
    })
}

fn check_cancel(cancel: &AtomicBool, stage: &'static str) -> Result<()> {
    if cancel.load(Ordering::Relaxed) {
        info!(stage, "generation cancelled");
        return Err(WorldGenError::Cancelled { stage });
    }
    Ok(())
}

fn generate_terrain(
    config: &WorldConfig,
    seeds: &WorldSeeds,
    fractal: FractalParams,
    cancel: &AtomicBool,
) -> Result<Terrain> {
    let (width, height) = (config.width, config.height);

    check_cancel(cancel, "noise")?;
    let elevation_field = NoiseField::new(WorldSeed::new(seeds.elevation));
    let moisture_field = NoiseField::new(WorldSeed::new(seeds.moisture));
    let (raw_elevation, moisture) = rayon::join(
        || fill_grid(width, height, &elevation_field.fractal_source(fractal)),
        || fill_grid(width, height, &moisture_field.fractal_source(fractal)),
    );
    let (lo, hi) = raw_elevation.min_max();
    info!(min = lo, max = hi, "elevation and moisture sampled");

    check_cancel(cancel, "erosion")?;
    let (eroded, rivers, erosion_stats) =
        erosion::simulate_erosion(&raw_elevation, &config.erosion, &mut seeds.erosion_rng());
    let elevation = eroded.clamp_values(0.0, 1.0);

    check_cancel(cancel, "biome classification")?;
    let biome_grid = biomes::classify_grid(&elevation, &moisture)?;
    for (biome, count) in biomes::biome_histogram(&biome_grid) {
        tracing::debug!(biome = biome.name(), count, "biome coverage");
    }

    check_cancel(cancel, "structures")?;
    let placed = structures::generate_structures(
        &elevation,
        &biome_grid,
        &config.structures,
        &mut seeds.structures_rng(),
    )?;

    Ok(Terrain {
        elevation,
        moisture,
        biomes: biome_grid,
        rivers,
        erosion: erosion_stats,
        structures: placed,
    })
}

fn generate_mask(
    config: &WorldConfig,
    seeds: &WorldSeeds,
    cancel: &AtomicBool,
) -> Result<(Grid<bool>, Grid<TileClass>)> {
    check_cancel(cancel, "automata")?;
    let mut automata = CellularAutomata::new(config.width, config.height);
    automata.generate(&config.automata, &mut seeds.automata_rng());
    info!(
        filled = automata.filled_count(),
        cells = automata.grid().len(),
        "automata mask generated"
    );
    let mask = automata.into_grid();

    check_cancel(cancel, "tiles")?;
    let tile_grid = tiles::classify_tiles(&mask, &TILE_TARGET);

    Ok((mask, tile_grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erosion::ErosionParams;

    fn demo_config() -> WorldConfig {
        let mut config = WorldConfig::new(64, 64).with_seed("demo");
        config.noise.octaves = 4;
        config.erosion = ErosionParams {
            thermal_iterations: 3,
            talus: 0.01,
            smooth_iterations: 0,
            river_count: 0,
            ..Default::default()
        };
        config
    }

    #[test]
    fn test_demo_world_coastline_consistent() {
        let world = generate_world(&demo_config()).unwrap();
        assert_eq!(world.biomes.len(), 64 * 64);
        assert!(world.elevation.same_shape(&world.biomes));

        for (x, y, &biome) in world.biomes.iter() {
            let e = *world.elevation.get(x, y);
            assert!((0.0..=1.0).contains(&e));
            if e < 0.3 {
                assert!(biome.is_water(), "({x}, {y}) at {e} classified {biome}");
            } else {
                assert!(!biome.is_water(), "({x}, {y}) at {e} classified {biome}");
            }
            if (0.3..0.35).contains(&e) {
                assert_eq!(biome, Biome::Beach);
            }
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = demo_config();
        let a = generate_world(&config).unwrap();
        let b = generate_world(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed(), WorldSeed::parse("demo").unwrap().value());
    }

    #[test]
    fn test_different_seed_different_world() {
        let a = generate_world(&demo_config()).unwrap();
        let b = generate_world(&demo_config().with_seed("other")).unwrap();
        assert_ne!(a.elevation, b.elevation);
        assert_ne!(a.mask, b.mask);
    }

    #[test]
    fn test_mask_border_filled_and_tiles_match() {
        let world = generate_world(&demo_config()).unwrap();
        for (x, y, &filled) in world.mask.iter() {
            if world.mask.is_border(x, y) {
                assert!(filled);
            }
            let mask = tiles::tile_mask(&world.mask, x, y, &TILE_TARGET);
            assert_eq!(world.tiles.get(x, y).mask(), mask);
        }
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let mut config = demo_config();
        config.noise.octaves = 0;
        assert!(matches!(generate_world(&config), Err(WorldGenError::InvalidConfig(_))));
        assert!(matches!(
            generate_world(&WorldConfig::new(0, 0)),
            Err(WorldGenError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_cancelled_before_first_stage() {
        let cancel = AtomicBool::new(true);
        match generate_world_with_cancel(&demo_config(), &cancel) {
            Err(WorldGenError::Cancelled { stage }) => assert_eq!(stage, "noise"),
            other => panic!("expected cancellation, got {:?}", other.map(|w| w.seed())),
        }
    }

    #[test]
    fn test_structures_on_valid_terrain() {
        let mut config = demo_config();
        config.structures.cities = 8;
        config.structures.pois = 40;
        let world = generate_world(&config).unwrap();
        for city in &world.structures.cities {
            assert!(!world.biomes.get(city.x, city.y).is_water());
        }
        for poi in &world.structures.pois {
            assert!(structures::poi_kind(*world.elevation.get(poi.x, poi.y)).is_some());
        }
    }

    #[test]
    fn test_json_export() {
        let world = generate_world(&WorldConfig::new(8, 6).with_seed("42")).unwrap();
        let json = world.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["width"], 8);
        assert_eq!(value["seeds"]["master"], 42);
        assert_eq!(value["biomes"]["data"].as_array().unwrap().len(), 48);
    }
}
