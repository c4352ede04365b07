//! Point-feature placement
//!
//! Places cities by spaced rejection sampling, then scatters points of
//! interest (mountain keeps and lighthouses) by independent draws.

pub mod placement;
pub mod types;

pub use placement::{generate_cities, generate_pois, poi_kind};
pub use types::{PoiStrictness, Structure, StructureAttributes, StructureKind, StructureParams};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::biomes::Biome;
use crate::error::Result;
use crate::grid::Grid;

/// Everything placed in one structure pass
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacedStructures {
    pub cities: Vec<Structure>,
    pub pois: Vec<Structure>,
}

impl PlacedStructures {
    pub fn len(&self) -> usize {
        self.cities.len() + self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty() && self.pois.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.cities.iter().chain(self.pois.iter())
    }
}

/// Main entry point for structure generation: cities first, then POIs.
pub fn generate_structures<R: Rng>(
    elevation: &Grid<f32>,
    biomes: &Grid<Biome>,
    params: &StructureParams,
    rng: &mut R,
) -> Result<PlacedStructures> {
    let cities = generate_cities(
        elevation,
        biomes,
        params.cities,
        params.city_spacing,
        params.city_attempts,
        rng,
    )?;
    if cities.len() < params.cities {
        info!(requested = params.cities, placed = cities.len(), "city placement ran out of attempts");
    }

    let pois = generate_pois(elevation, biomes, params.pois, params.poi_strictness, rng)?;
    let keeps = pois.iter().filter(|p| p.kind == StructureKind::MountainKeep).count();
    info!(
        cities = cities.len(),
        pois = pois.len(),
        keeps,
        lighthouses = pois.len() - keeps,
        "placed structures"
    );

    Ok(PlacedStructures { cities, pois })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_structures_bounds() {
        let elevation = Grid::from_fn(48, 48, |x, y| (x + y) as f32 / 94.0);
        let biomes = elevation.map(|&e| crate::biomes::classify(e, 0.4));
        let params = StructureParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let placed = generate_structures(&elevation, &biomes, &params, &mut rng).unwrap();
        assert!(placed.cities.len() <= params.cities);
        assert!(placed.pois.len() <= params.pois);
        assert_eq!(placed.iter().count(), placed.len());
        for city in &placed.cities {
            assert_eq!(city.kind, StructureKind::City);
        }
    }
}
