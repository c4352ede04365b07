//! Structure placement by rejection sampling
//!
//! Both passes return partial results when valid terrain is scarce. Running out
//! of candidates is never an error.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::biomes::Biome;
use crate::error::Result;
use crate::grid::Grid;
use super::types::{PoiStrictness, Structure, StructureAttributes, StructureKind};

/// Cities only settle in this open elevation band
pub const CITY_ELEVATION: (f32, f32) = (0.35, 0.6);

/// Peaks above this elevation host mountain keeps
pub const KEEP_MIN_ELEVATION: f32 = 0.8;

/// Lighthouses sit in this open elevation band around the coastline
pub const LIGHTHOUSE_ELEVATION: (f32, f32) = (0.28, 0.32);

/// Place up to `count` cities.
///
/// Draws a random interior cell up to `attempts` times in total. A draw is kept
/// when its elevation lies strictly inside [`CITY_ELEVATION`], its biome is not
/// water, and it is at least `spacing` away from every city already placed.
pub fn generate_cities<R: Rng>(
    elevation: &Grid<f32>,
    biomes: &Grid<Biome>,
    count: usize,
    spacing: f32,
    attempts: usize,
    rng: &mut R,
) -> Result<Vec<Structure>> {
    elevation.ensure_same_shape(biomes)?;

    let mut cities: Vec<Structure> = Vec::with_capacity(count);
    let (width, height) = (elevation.width(), elevation.height());
    if width < 3 || height < 3 {
        return Ok(cities);
    }

    for _ in 0..attempts {
        if cities.len() >= count {
            break;
        }

        let x = rng.gen_range(1..width - 1);
        let y = rng.gen_range(1..height - 1);
        let e = *elevation.get(x, y);
        let biome = *biomes.get(x, y);

        if e <= CITY_ELEVATION.0 || e >= CITY_ELEVATION.1 || biome.is_water() {
            continue;
        }
        if cities.iter().any(|c| c.distance_to(x, y) < spacing) {
            continue;
        }

        cities.push(Structure {
            kind: StructureKind::City,
            x,
            y,
            attributes: StructureAttributes { elevation: e, biome },
        });
    }

    Ok(cities)
}

/// The POI kind a cell of this elevation supports, if any.
pub fn poi_kind(elevation: f32) -> Option<StructureKind> {
    if elevation > KEEP_MIN_ELEVATION {
        Some(StructureKind::MountainKeep)
    } else if elevation > LIGHTHOUSE_ELEVATION.0 && elevation < LIGHTHOUSE_ELEVATION.1 {
        Some(StructureKind::Lighthouse)
    } else {
        None
    }
}

/// Make `count` independent POI draws over the whole grid.
///
/// Draws run in parallel. Each one owns a ChaCha8 stream seeded from a single
/// base value taken from `rng` plus the draw index, so the result does not
/// depend on thread scheduling. POIs do not check spacing against each other
/// or against cities.
pub fn generate_pois<R: Rng>(
    elevation: &Grid<f32>,
    biomes: &Grid<Biome>,
    count: usize,
    strictness: PoiStrictness,
    rng: &mut R,
) -> Result<Vec<Structure>> {
    elevation.ensure_same_shape(biomes)?;

    let base_seed: u64 = rng.gen();
    if elevation.is_empty() {
        return Ok(Vec::new());
    }
    let (width, height) = (elevation.width(), elevation.height());
    let attempts = strictness.attempts_per_draw();

    let pois = (0..count)
        .into_par_iter()
        .filter_map(|i| {
            let mut draw_rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(i as u64));
            for _ in 0..attempts {
                let x = draw_rng.gen_range(0..width);
                let y = draw_rng.gen_range(0..height);
                let e = *elevation.get(x, y);
                if let Some(kind) = poi_kind(e) {
                    return Some(Structure {
                        kind,
                        x,
                        y,
                        attributes: StructureAttributes { elevation: e, biome: *biomes.get(x, y) },
                    });
                }
            }
            None
        })
        .collect();

    Ok(pois)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::classify_grid;

    fn uniform(width: usize, height: usize, e: f32) -> (Grid<f32>, Grid<Biome>) {
        let elevation = Grid::new_with(width, height, e);
        let moisture = Grid::new_with(width, height, 0.4f32);
        let biomes = classify_grid(&elevation, &moisture).unwrap();
        (elevation, biomes)
    }

    #[test]
    fn test_city_spacing() {
        let (elevation, biomes) = uniform(64, 64, 0.5);
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let cities = generate_cities(&elevation, &biomes, 50, 10.0, 100, &mut rng).unwrap();
            assert!(!cities.is_empty());
            assert!(cities.len() <= 50);
            for (i, a) in cities.iter().enumerate() {
                for b in &cities[i + 1..] {
                    assert!(a.distance_to(b.x, b.y) >= 10.0, "{:?} too close to {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_cities_respect_terrain() {
        // Left half ocean, right half lowland
        let elevation = Grid::from_fn(40, 40, |x, _| if x < 20 { 0.1 } else { 0.5 });
        let moisture = Grid::new_with(40, 40, 0.4f32);
        let biomes = classify_grid(&elevation, &moisture).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let cities = generate_cities(&elevation, &biomes, 10, 5.0, 100, &mut rng).unwrap();
        assert!(!cities.is_empty());
        for city in &cities {
            assert!(city.x >= 20);
            assert!(!city.attributes.biome.is_water());
            assert!(!elevation.is_border(city.x, city.y));
        }
    }

    #[test]
    fn test_cities_partial_on_unsuitable_terrain() {
        let (elevation, biomes) = uniform(32, 32, 0.9);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cities = generate_cities(&elevation, &biomes, 5, 10.0, 100, &mut rng).unwrap();
        assert!(cities.is_empty());
    }

    #[test]
    fn test_city_band_is_open() {
        let (elevation, biomes) = uniform(16, 16, 0.35);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(generate_cities(&elevation, &biomes, 5, 1.0, 100, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_tiny_grid_has_no_interior() {
        let (elevation, biomes) = uniform(2, 8, 0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(generate_cities(&elevation, &biomes, 3, 1.0, 100, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_poi_kinds() {
        assert_eq!(poi_kind(0.9), Some(StructureKind::MountainKeep));
        assert_eq!(poi_kind(0.3), Some(StructureKind::Lighthouse));
        assert_eq!(poi_kind(0.28), None);
        assert_eq!(poi_kind(0.8), None);
        assert_eq!(poi_kind(0.5), None);
    }

    #[test]
    fn test_pois_dropped_on_unmatched_terrain() {
        let (elevation, biomes) = uniform(16, 16, 0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let pois =
            generate_pois(&elevation, &biomes, 20, PoiStrictness::DropUnmatched, &mut rng).unwrap();
        assert!(pois.is_empty());
    }

    #[test]
    fn test_pois_all_matched_on_peaks() {
        let (elevation, biomes) = uniform(16, 16, 0.9);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let pois =
            generate_pois(&elevation, &biomes, 20, PoiStrictness::DropUnmatched, &mut rng).unwrap();
        assert_eq!(pois.len(), 20);
        assert!(pois.iter().all(|p| p.kind == StructureKind::MountainKeep));
    }

    #[test]
    fn test_retry_strictness_fills_count() {
        // Top half peaks, bottom half lowland
        let elevation = Grid::from_fn(32, 32, |_, y| if y < 16 { 0.9 } else { 0.5 });
        let moisture = Grid::new_with(32, 32, 0.4f32);
        let biomes = classify_grid(&elevation, &moisture).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let dropped =
            generate_pois(&elevation, &biomes, 200, PoiStrictness::DropUnmatched, &mut rng).unwrap();
        assert!(dropped.len() < 200);

        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let retried = generate_pois(
            &elevation,
            &biomes,
            200,
            PoiStrictness::Retry { max_attempts: 64 },
            &mut rng,
        )
        .unwrap();
        assert_eq!(retried.len(), 200);
    }

    #[test]
    fn test_pois_reproducible() {
        let elevation = Grid::from_fn(32, 32, |x, y| ((x * 3 + y * 5) % 11) as f32 / 10.0);
        let moisture = Grid::new_with(32, 32, 0.5f32);
        let biomes = classify_grid(&elevation, &moisture).unwrap();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            generate_pois(&elevation, &biomes, 50, PoiStrictness::DropUnmatched, &mut rng).unwrap()
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let elevation = Grid::new_with(8, 8, 0.5f32);
        let biomes = Grid::new_with(8, 9, Biome::Grassland);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(generate_cities(&elevation, &biomes, 1, 1.0, 10, &mut rng).is_err());
        assert!(generate_pois(&elevation, &biomes, 1, PoiStrictness::DropUnmatched, &mut rng).is_err());
    }
}
