//! Erosion simulation parameters and configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldGenError};

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// No erosion - raw terrain
    None,
    /// Light erosion - subtle smoothing
    Light,
    /// Normal erosion - balanced
    #[default]
    Normal,
    /// Heavy erosion - worn slopes and many rivers
    Heavy,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Light, Self::Normal, Self::Heavy]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No erosion (raw terrain)",
            Self::Light => "Subtle smoothing",
            Self::Normal => "Balanced erosion",
            Self::Heavy => "Worn slopes and many rivers",
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Light => write!(f, "light"),
            Self::Normal => write!(f, "normal"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

impl std::str::FromStr for ErosionPreset {
    type Err = WorldGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WorldGenError::InvalidConfig(format!("unknown erosion preset {s:?}")))
    }
}

/// How a river chooses its next cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiverWalk {
    /// Lowest of all 8 neighbors, including cells the river already carved
    #[default]
    SteepestDescent,
    /// Lowest neighbor the river has not visited yet
    NoBacktrack,
}

/// Erosion stage parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Number of thermal erosion passes
    pub thermal_iterations: usize,

    /// Height difference above which material slides to a neighbor
    pub talus: f32,

    /// Number of 3x3 box-filter passes applied after thermal erosion
    pub smooth_iterations: usize,

    /// Number of rivers traced by steepest descent
    pub river_count: usize,

    /// Neighbor rule for each river step
    pub river_walk: RiverWalk,
}

/// Fraction of a height difference moved per thermal transfer
pub const THERMAL_TRANSFER_RATE: f32 = 0.1;

/// Maximum descent steps for a single river
pub const RIVER_MAX_STEPS: usize = 200;

/// Elevation removed from every cell a river visits
pub const RIVER_CARVE_DEPTH: f32 = 0.05;

/// Rivers stop once they drop below this elevation (the sea)
pub const RIVER_OCEAN_LEVEL: f32 = 0.3;

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            thermal_iterations: 3,
            talus: 0.01,
            smooth_iterations: 0,
            river_count: 12,
            river_walk: RiverWalk::SteepestDescent,
        }
    }
}

impl ErosionParams {
    /// Create parameters from a preset
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::None => Self {
                thermal_iterations: 0,
                smooth_iterations: 0,
                river_count: 0,
                ..Default::default()
            },
            ErosionPreset::Light => Self {
                thermal_iterations: 1,
                smooth_iterations: 1,
                river_count: 4,
                ..Default::default()
            },
            ErosionPreset::Normal => Self::default(),
            ErosionPreset::Heavy => Self {
                thermal_iterations: 10,
                talus: 0.005,
                smooth_iterations: 1,
                river_count: 40,
                ..Default::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.talus.is_finite() || self.talus < 0.0 {
            return Err(WorldGenError::InvalidConfig(format!(
                "talus must be finite and non-negative, got {}",
                self.talus
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_round_trip_names() {
        for &preset in ErosionPreset::all() {
            let parsed: ErosionPreset = preset.to_string().parse().unwrap();
            assert_eq!(parsed, preset);
        }
        assert!("glacial".parse::<ErosionPreset>().is_err());
    }

    #[test]
    fn test_none_preset_disables_everything() {
        let params = ErosionParams::from_preset(ErosionPreset::None);
        assert_eq!(params.thermal_iterations, 0);
        assert_eq!(params.smooth_iterations, 0);
        assert_eq!(params.river_count, 0);
    }

    #[test]
    fn test_river_walk_defaults_to_steepest_descent() {
        for &preset in ErosionPreset::all() {
            assert_eq!(ErosionParams::from_preset(preset).river_walk, RiverWalk::SteepestDescent);
        }
        let params: ErosionParams = serde_json::from_str(r#"{"river_walk":"no_backtrack"}"#).unwrap();
        assert_eq!(params.river_walk, RiverWalk::NoBacktrack);
        assert_eq!(params.river_count, 12);
    }

    #[test]
    fn test_validate_talus() {
        let mut params = ErosionParams::default();
        assert!(params.validate().is_ok());
        params.talus = -0.1;
        assert!(params.validate().is_err());
        params.talus = f32::INFINITY;
        assert!(params.validate().is_err());
    }
}
