//! World generation configuration
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs the fields it
//! changes. Validation runs before any grid is allocated.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::automata::AutomataParams;
use crate::erosion::{ErosionParams, ErosionPreset};
use crate::error::{Result, WorldGenError};
use crate::noise_field::FractalParams;
use crate::seeds::WorldSeed;
use crate::structures::StructureParams;

/// Fractal noise settings shared by the elevation and moisture fields
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub octaves: u32,
    /// Amplitude falloff per octave
    pub persistence: f64,
    /// Base frequency in noise units per cell
    pub scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            scale: 0.05,
        }
    }
}

impl NoiseParams {
    pub fn fractal_params(&self) -> Result<FractalParams> {
        FractalParams::new(self.octaves, self.persistence, self.scale)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,

    /// Integer or text seed; a random seed is drawn when absent
    pub seed: Option<String>,

    pub noise: NoiseParams,
    pub automata: AutomataParams,
    pub erosion: ErosionParams,
    pub structures: StructureParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            seed: None,
            noise: NoiseParams::default(),
            automata: AutomataParams::default(),
            erosion: ErosionParams::default(),
            structures: StructureParams::default(),
        }
    }
}

impl WorldConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_erosion_preset(mut self, preset: ErosionPreset) -> Self {
        self.erosion = ErosionParams::from_preset(preset);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> Result<WorldSeed> {
        match &self.seed {
            Some(text) => WorldSeed::parse(text),
            None => Ok(WorldSeed::random()),
        }
    }

    /// Check every parameter. Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldGenError::EmptyGrid { width: self.width, height: self.height });
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(WorldGenError::InvalidConfig(format!(
                "grid {}x{} is too large",
                self.width, self.height
            )));
        }

        self.noise.fractal_params()?;

        let automata = &self.automata;
        if !(0.0..=1.0).contains(&automata.fill_probability) {
            return Err(WorldGenError::InvalidConfig(format!(
                "fill probability must be within [0, 1], got {}",
                automata.fill_probability
            )));
        }
        for (name, value) in [
            ("birth", automata.birth_threshold),
            ("death", automata.death_threshold),
        ] {
            if value > 8 {
                return Err(WorldGenError::InvalidConfig(format!(
                    "{name} threshold counts 8 neighbors at most, got {value}"
                )));
            }
        }

        self.erosion.validate()?;
        self.structures.validate()?;

        if let Some(seed) = &self.seed {
            WorldSeed::parse(seed)?;
        }
        Ok(())
    }
}
