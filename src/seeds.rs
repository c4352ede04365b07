//! Seed management for world generation
//!
//! A world is generated from a single master seed. Each stage that needs
//! randomness gets its own sub-seed derived from the master, and builds a
//! `ChaCha8Rng` from it, so the same master seed always yields the same world.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, WorldGenError};

/// A master seed, parsed from user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Parse a seed given as text.
    ///
    /// Integers are used directly (negative integers by their two's complement
    /// bits). Non-finite numerics such as `NaN` or `inf` are rejected. Anything
    /// else is reduced with [`hash_text`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if let Ok(v) = trimmed.parse::<u64>() {
            return Ok(Self(v));
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Self(v as u64));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if !f.is_finite() {
                return Err(WorldGenError::InvalidSeed(input.to_string()));
            }
        }
        Ok(Self(hash_text(trimmed)))
    }

    /// A fresh random seed, for runs where the user gave none.
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl std::fmt::Display for WorldSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rolling polynomial hash (`h = h * 31 + c`, 32-bit wrapping), returned as
/// its absolute value.
pub fn hash_text(text: &str) -> u64 {
    let mut hash: i32 = 0;
    for c in text.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(c as i32);
    }
    hash.unsigned_abs() as u64
}

/// Seeds for every randomized stage of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Elevation noise permutation table
    pub elevation: u64,
    /// Moisture noise permutation table
    pub moisture: u64,
    /// River start points
    pub erosion: u64,
    /// City and point-of-interest sampling
    pub structures: u64,
    /// Cave/land mask automaton
    pub automata: u64,
}

impl WorldSeeds {
    /// Derive all sub-seeds from a master seed.
    ///
    /// Elevation noise uses the master seed itself, so a `NoiseField` built
    /// from the master seed reproduces the elevation field.
    pub fn from_master(master: WorldSeed) -> Self {
        let master = master.value();
        Self {
            master,
            elevation: master,
            moisture: derive_seed(master, "moisture"),
            erosion: derive_seed(master, "erosion"),
            structures: derive_seed(master, "structures"),
            automata: derive_seed(master, "automata"),
        }
    }

    pub fn erosion_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.erosion)
    }

    pub fn structures_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.structures)
    }

    pub fn automata_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.automata)
    }
}

/// Derive a sub-seed from a master seed and a stage name.
///
/// FNV-1a over the name, folded into the master and finished with a
/// splitmix64 round. Stable across processes and toolchains.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in stage.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    splitmix64(master ^ hash)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, elevation: {}, moisture: {}, erosion: {}, \
             structures: {}, automata: {} }}",
            self.master, self.elevation, self.moisture, self.erosion, self.structures, self.automata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_integer_seed_passthrough() {
        assert_eq!(WorldSeed::parse("42").unwrap().value(), 42);
        assert_eq!(WorldSeed::parse(" 7 ").unwrap().value(), 7);
        assert_eq!(WorldSeed::parse("-1").unwrap().value(), u64::MAX);
    }

    #[test]
    fn test_text_seed_is_hashed() {
        // "demo": ((100*31 + 101)*31 + 109)*31 + 111
        assert_eq!(WorldSeed::parse("demo").unwrap().value(), 3_079_651);
        assert_eq!(WorldSeed::parse("demo").unwrap(), WorldSeed::parse("demo").unwrap());
        assert_ne!(WorldSeed::parse("demo").unwrap(), WorldSeed::parse("Demo").unwrap());
    }

    #[test]
    fn test_non_finite_seed_rejected() {
        assert!(WorldSeed::parse("NaN").is_err());
        assert!(WorldSeed::parse("inf").is_err());
        assert!(WorldSeed::parse("-infinity").is_err());
        // Finite fractional numbers are coerced, not rejected
        assert!(WorldSeed::parse("3.5").is_ok());
    }

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = WorldSeeds::from_master(WorldSeed::new(12345));
        let seeds2 = WorldSeeds::from_master(WorldSeed::new(12345));
        assert_eq!(seeds1, seeds2);

        let mut a = seeds1.automata_rng();
        let mut b = seeds2.automata_rng();
        for _ in 0..16 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }

    #[test]
    fn test_different_stages_get_different_seeds() {
        let seeds = WorldSeeds::from_master(WorldSeed::new(12345));
        let all = [seeds.moisture, seeds.erosion, seeds.structures, seeds.automata];
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
        assert_eq!(seeds.elevation, 12345);
    }

    #[test]
    fn test_derived_seed_golden_values() {
        assert_eq!(splitmix64(0), 0xe220_a839_7b1d_cdaf);
        let seeds = WorldSeeds::from_master(WorldSeed::new(12345));
        assert_eq!(seeds.moisture, 0x72fa_259d_efcf_ff9f);
        assert_eq!(seeds.erosion, 0xb815_c989_7e45_db25);
        assert_eq!(seeds.structures, 0x4195_f14c_489c_91a8);
        assert_eq!(seeds.automata, 0x0243_74bb_57f9_7bf9);
    }
}
