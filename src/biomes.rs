//! Biome classification from elevation and moisture
//!
//! A pure per-cell decision tree: elevation band first, then moisture sub-band.
//! The first matching branch wins and the branches do not overlap.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WorldGenError};
use crate::grid::Grid;

/// Terrain classification of a single cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    DeepOcean,
    Ocean,
    Beach,
    Scorched,
    Bare,
    Tundra,
    Snow,
    TemperateDesert,
    Shrubland,
    Grassland,
    Forest,
    Rainforest,
}

/// Static description of a biome.
///
/// The ranges are the envelope of every branch that yields the biome, with
/// both ends inclusive; `Bare` and `TemperateDesert` come from two bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeInfo {
    pub name: &'static str,
    /// Representative RGB color for renderers
    pub color: [u8; 3],
    pub elevation_range: (f32, f32),
    pub moisture_range: (f32, f32),
}

// Elevation bands
pub const DEEP_OCEAN_MAX: f32 = 0.2;
pub const OCEAN_MAX: f32 = 0.3;
pub const BEACH_MAX: f32 = 0.35;
pub const LOWLAND_MAX: f32 = 0.6;
pub const HIGHLAND_MAX: f32 = 0.8;

impl Biome {
    pub const ALL: [Biome; 12] = [
        Biome::DeepOcean,
        Biome::Ocean,
        Biome::Beach,
        Biome::Scorched,
        Biome::Bare,
        Biome::Tundra,
        Biome::Snow,
        Biome::TemperateDesert,
        Biome::Shrubland,
        Biome::Grassland,
        Biome::Forest,
        Biome::Rainforest,
    ];

    pub fn info(&self) -> &'static BiomeInfo {
        match self {
            Biome::DeepOcean => &BiomeInfo {
                name: "deep_ocean",
                color: [0x36, 0x36, 0x61],
                elevation_range: (0.0, DEEP_OCEAN_MAX),
                moisture_range: (0.0, 1.0),
            },
            Biome::Ocean => &BiomeInfo {
                name: "ocean",
                color: [0x44, 0x44, 0x7a],
                elevation_range: (DEEP_OCEAN_MAX, OCEAN_MAX),
                moisture_range: (0.0, 1.0),
            },
            Biome::Beach => &BiomeInfo {
                name: "beach",
                color: [0xa0, 0x90, 0x77],
                elevation_range: (OCEAN_MAX, BEACH_MAX),
                moisture_range: (0.0, 1.0),
            },
            Biome::Scorched => &BiomeInfo {
                name: "scorched",
                color: [0x55, 0x55, 0x55],
                elevation_range: (HIGHLAND_MAX, 1.0),
                moisture_range: (0.0, 0.1),
            },
            Biome::Bare => &BiomeInfo {
                name: "bare",
                color: [0x88, 0x88, 0x88],
                elevation_range: (LOWLAND_MAX, 1.0),
                moisture_range: (0.1, 1.0),
            },
            Biome::Tundra => &BiomeInfo {
                name: "tundra",
                color: [0xbb, 0xbb, 0xaa],
                elevation_range: (HIGHLAND_MAX, 1.0),
                moisture_range: (0.2, 0.5),
            },
            Biome::Snow => &BiomeInfo {
                name: "snow",
                color: [0xdd, 0xdd, 0xe4],
                elevation_range: (HIGHLAND_MAX, 1.0),
                moisture_range: (0.5, 1.0),
            },
            Biome::TemperateDesert => &BiomeInfo {
                name: "temperate_desert",
                color: [0xc9, 0xd2, 0x9b],
                elevation_range: (BEACH_MAX, HIGHLAND_MAX),
                moisture_range: (0.0, 0.33),
            },
            Biome::Shrubland => &BiomeInfo {
                name: "shrubland",
                color: [0x88, 0x99, 0x77],
                elevation_range: (LOWLAND_MAX, HIGHLAND_MAX),
                moisture_range: (0.33, 0.66),
            },
            Biome::Grassland => &BiomeInfo {
                name: "grassland",
                color: [0x88, 0xaa, 0x55],
                elevation_range: (BEACH_MAX, LOWLAND_MAX),
                moisture_range: (0.16, 0.33),
            },
            Biome::Forest => &BiomeInfo {
                name: "forest",
                color: [0x67, 0x94, 0x59],
                elevation_range: (BEACH_MAX, LOWLAND_MAX),
                moisture_range: (0.33, 0.66),
            },
            Biome::Rainforest => &BiomeInfo {
                name: "rainforest",
                color: [0x44, 0x88, 0x55],
                elevation_range: (BEACH_MAX, LOWLAND_MAX),
                moisture_range: (0.66, 1.0),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    pub fn color(&self) -> [u8; 3] {
        self.info().color
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Biome::DeepOcean | Biome::Ocean)
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classify one cell.
///
/// Inputs outside [0, 1] fall into the nearest band. NaN matches no branch and
/// falls through to `Ocean`; use [`classify_grid`] to reject it instead.
pub fn classify(elevation: f32, moisture: f32) -> Biome {
    let (e, m) = (elevation, moisture);
    if e.is_nan() || m.is_nan() {
        return Biome::Ocean;
    }

    if e < DEEP_OCEAN_MAX {
        Biome::DeepOcean
    } else if e < OCEAN_MAX {
        Biome::Ocean
    } else if e < BEACH_MAX {
        Biome::Beach
    } else if e > HIGHLAND_MAX {
        if m < 0.1 {
            Biome::Scorched
        } else if m < 0.2 {
            Biome::Bare
        } else if m < 0.5 {
            Biome::Tundra
        } else {
            Biome::Snow
        }
    } else if e > LOWLAND_MAX {
        if m < 0.33 {
            Biome::TemperateDesert
        } else if m < 0.66 {
            Biome::Shrubland
        } else {
            Biome::Bare
        }
    } else if m < 0.16 {
        Biome::TemperateDesert
    } else if m < 0.33 {
        Biome::Grassland
    } else if m < 0.66 {
        Biome::Forest
    } else {
        Biome::Rainforest
    }
}

/// Classify every cell of matching elevation and moisture grids.
///
/// Finite inputs are clamped into [0, 1] first, so erosion overshoot lands in
/// the extreme bands rather than relying on fallthrough. NaN is an error.
pub fn classify_grid(elevation: &Grid<f32>, moisture: &Grid<f32>) -> Result<Grid<Biome>> {
    elevation.ensure_same_shape(moisture)?;

    for grid in [elevation, moisture] {
        if let Some((x, y, _)) = grid.iter().find(|(_, _, v)| v.is_nan()) {
            return Err(WorldGenError::NonFiniteInput { stage: "biome classification", x, y });
        }
    }

    let biomes = Grid::from_fn_par(elevation.width(), elevation.height(), |x, y| {
        let e = elevation.get(x, y).clamp(0.0, 1.0);
        let m = moisture.get(x, y).clamp(0.0, 1.0);
        classify(e, m)
    });

    info!(cells = biomes.len(), "classified biomes");
    Ok(biomes)
}

/// Count of cells per biome, in [`Biome::ALL`] order, skipping absent biomes.
pub fn biome_histogram(biomes: &Grid<Biome>) -> Vec<(Biome, usize)> {
    let mut counts = [0usize; Biome::ALL.len()];
    for &b in biomes.as_slice() {
        counts[b as usize] += 1;
    }
    Biome::ALL
        .iter()
        .zip(counts)
        .filter(|&(_, c)| c > 0)
        .map(|(&b, c)| (b, c))
        .collect()
}
