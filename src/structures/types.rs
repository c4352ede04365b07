//! Structure types and placement parameters

use serde::{Deserialize, Serialize};

use crate::biomes::Biome;
use crate::error::{Result, WorldGenError};

/// Type of structure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Settlement on mid-elevation dry land
    City,
    /// Fortress on a peak (elevation above 0.8)
    MountainKeep,
    /// Beacon on the shoreline (elevation around 0.3)
    Lighthouse,
}

impl StructureKind {
    pub fn id(&self) -> &'static str {
        match self {
            StructureKind::City => "city",
            StructureKind::MountainKeep => "mountain_keep",
            StructureKind::Lighthouse => "lighthouse",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StructureKind::City => "City",
            StructureKind::MountainKeep => "Mountain Keep",
            StructureKind::Lighthouse => "Lighthouse",
        }
    }
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Terrain recorded at the placement cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureAttributes {
    pub elevation: f32,
    pub biome: Biome,
}

/// A placed point feature. Immutable once returned.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    pub x: usize,
    pub y: usize,
    pub attributes: StructureAttributes,
}

impl Structure {
    /// Euclidean distance to a cell
    pub fn distance_to(&self, x: usize, y: usize) -> f32 {
        let dx = self.x as f32 - x as f32;
        let dy = self.y as f32 - y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// What a POI draw does when its cell matches no POI kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PoiStrictness {
    /// Discard the draw; the result may hold fewer than `count` POIs
    #[default]
    DropUnmatched,
    /// Redraw up to `max_attempts` cells before giving up on this draw
    Retry { max_attempts: usize },
}

impl PoiStrictness {
    pub(crate) fn attempts_per_draw(&self) -> usize {
        match *self {
            PoiStrictness::DropUnmatched => 1,
            PoiStrictness::Retry { max_attempts } => max_attempts,
        }
    }
}

/// Structure stage parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureParams {
    /// Cities requested (an upper bound, not a guarantee)
    pub cities: usize,

    /// POI draws
    pub pois: usize,

    /// Minimum Euclidean distance between two cities
    pub city_spacing: f32,

    /// Total rejection-sampling attempts for the city pass
    pub city_attempts: usize,

    pub poi_strictness: PoiStrictness,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            cities: 5,
            pois: 10,
            city_spacing: 10.0,
            city_attempts: 100,
            poi_strictness: PoiStrictness::DropUnmatched,
        }
    }
}

impl StructureParams {
    pub fn validate(&self) -> Result<()> {
        if !self.city_spacing.is_finite() || self.city_spacing < 0.0 {
            return Err(WorldGenError::InvalidConfig(format!(
                "city spacing must be finite and non-negative, got {}",
                self.city_spacing
            )));
        }
        if let PoiStrictness::Retry { max_attempts: 0 } = self.poi_strictness {
            return Err(WorldGenError::InvalidConfig(
                "POI retry strictness needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}
