//! Seeded 2D simplex noise with fractal (multi-octave) composition
//!
//! The permutation table is a Fisher-Yates shuffle of `0..=255` driven by a
//! xorshift generator, so identical seeds give bit-identical fields on every
//! run and every platform.

use noise::NoiseFn;

use crate::error::{Result, WorldGenError};
use crate::grid::Grid;
use crate::seeds::WorldSeed;

/// Gradient directions for 2D simplex corners, indexed through `perm_mod12`.
const GRAD3: [[f64; 2]; 12] = [
    [1.0, 1.0], [-1.0, 1.0], [1.0, -1.0], [-1.0, -1.0],
    [1.0, 0.0], [-1.0, 0.0], [1.0, 0.0], [-1.0, 0.0],
    [0.0, 1.0], [0.0, -1.0], [0.0, 1.0], [0.0, -1.0],
];

/// Skewing factor for 2D simplex grid: (sqrt(3) - 1) / 2
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskewing factor for 2D simplex grid: (3 - sqrt(3)) / 6
const G2: f64 = 0.211_324_865_405_187_13;
/// Brings the summed corner contributions to roughly [-1, 1]
const OUTPUT_SCALE: f64 = 70.0;

/// Deterministic 2D simplex noise keyed by a seed. Immutable once built.
#[derive(Clone)]
pub struct NoiseField {
    seed: WorldSeed,
    /// 256-entry permutation, doubled so lookups never wrap
    perm: [u8; 512],
    /// `perm[i] % 12`, precomputed for gradient selection
    perm_mod12: [u8; 512],
}

impl NoiseField {
    pub fn new(seed: WorldSeed) -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // xorshift64 has an all-zero fixed point
        let mut state = seed.value();
        if state == 0 {
            state = 0x9e37_79b9_7f4a_7c15;
        }
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        let mut perm_mod12 = [0u8; 512];
        for i in 0..512 {
            perm[i] = table[i & 255];
            perm_mod12[i] = perm[i] % 12;
        }

        Self { seed, perm, perm_mod12 }
    }

    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Single-octave simplex noise, nominally in [-1, 1].
    ///
    /// The bound is not exact; clamp the result if a strict range matters.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Skew into simplex space to find the containing cell
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();

        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        // Lower or upper triangle of the unit square
        let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;

        let gi0 = self.perm_mod12[ii + self.perm[jj] as usize];
        let gi1 = self.perm_mod12[ii + i1 + self.perm[jj + j1] as usize];
        let gi2 = self.perm_mod12[ii + 1 + self.perm[jj + 1] as usize];

        let n0 = corner(gi0, x0, y0);
        let n1 = corner(gi1, x1, y1);
        let n2 = corner(gi2, x2, y2);

        OUTPUT_SCALE * (n0 + n1 + n2)
    }

    /// Sum of `octaves` samples at doubling frequency and `persistence`-decaying
    /// amplitude, divided by the total amplitude.
    pub fn fractal(&self, x: f64, y: f64, params: &FractalParams) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = params.scale;
        let mut max_amplitude = 0.0;

        for _ in 0..params.octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= params.persistence;
            frequency *= 2.0;
        }

        total / max_amplitude
    }

    /// Pair this field with fractal parameters as a `NoiseFn`.
    pub fn fractal_source(&self, params: FractalParams) -> FractalNoise<'_> {
        FractalNoise { field: self, params }
    }
}

/// Radially-decaying contribution of one simplex corner.
#[inline]
fn corner(gradient: u8, x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let t2 = t * t;
        let g = GRAD3[gradient as usize];
        t2 * t2 * (g[0] * x + g[1] * y)
    }
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// Octave parameters for [`NoiseField::fractal`], validated on construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    octaves: u32,
    persistence: f64,
    scale: f64,
}

impl FractalParams {
    pub fn new(octaves: u32, persistence: f64, scale: f64) -> Result<Self> {
        if octaves == 0 {
            return Err(WorldGenError::InvalidConfig(
                "fractal noise needs at least one octave".to_string(),
            ));
        }
        if !persistence.is_finite() || persistence <= 0.0 {
            return Err(WorldGenError::InvalidConfig(format!(
                "persistence must be finite and positive, got {persistence}"
            )));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(WorldGenError::InvalidConfig(format!(
                "noise scale must be finite and positive, got {scale}"
            )));
        }
        Ok(Self { octaves, persistence, scale })
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn persistence(&self) -> f64 {
        self.persistence
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// A noise field sampled fractally, usable wherever the `noise` crate expects
/// a `NoiseFn`.
#[derive(Clone, Copy)]
pub struct FractalNoise<'a> {
    field: &'a NoiseField,
    params: FractalParams,
}

impl NoiseFn<f64, 2> for FractalNoise<'_> {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.field.fractal(point[0], point[1], &self.params)
    }
}

/// Evaluate a noise source at every integer cell of a `width x height` grid in
/// parallel, mapping [-1, 1] onto [0, 1] and clamping the result.
pub fn fill_grid<N>(width: usize, height: usize, source: &N) -> Grid<f32>
where
    N: NoiseFn<f64, 2> + Sync,
{
    Grid::from_fn_par(width, height, |x, y| {
        let v = source.get([x as f64, y as f64]);
        (((v + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_same_seed_is_bit_stable() {
        let a = NoiseField::new(WorldSeed::new(1337));
        let b = NoiseField::new(WorldSeed::new(1337));
        for k in 0..200 {
            let x = k as f64 * 0.173 - 11.0;
            let y = k as f64 * 0.291 + 3.0;
            assert_eq!(a.sample(x, y).to_bits(), b.sample(x, y).to_bits());
            assert_eq!(a.sample(x, y).to_bits(), a.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_permutation_golden_values() {
        // Pins the xorshift shuffle; any change here reshapes every world
        let field = NoiseField::new(WorldSeed::new(3_079_651));
        assert_eq!(
            field.perm[..16],
            [240, 88, 185, 192, 173, 196, 94, 252, 134, 194, 21, 151, 186, 162, 113, 219]
        );
        let zero = NoiseField::new(WorldSeed::new(0));
        assert_eq!(zero.perm[..8], [196, 8, 174, 52, 116, 136, 198, 245]);
    }

    #[test]
    fn test_sample_golden_bits() {
        let field = NoiseField::new(WorldSeed::new(3_079_651));
        assert_eq!(field.sample(0.5, 0.25).to_bits(), 0xbfda_829e_5b05_f826);
        assert_eq!(field.sample(12.3, -4.7).to_bits(), 0x3fd9_8395_5179_b891);
        assert_eq!(field.sample(-100.75, 33.125).to_bits(), 0x3fd3_fda9_ef64_49ba);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(WorldSeed::new(1));
        let b = NoiseField::new(WorldSeed::new(2));
        let differs = (0..100).any(|k| {
            let p = k as f64 * 0.37 + 0.1;
            a.sample(p, p * 0.5) != b.sample(p, p * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn test_permutation_is_a_permutation() {
        let field = NoiseField::new(WorldSeed::parse("demo").unwrap());
        let mut seen = [false; 256];
        for &p in &field.perm[..256] {
            seen[p as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        for i in 0..256 {
            assert_eq!(field.perm[i], field.perm[i + 256]);
            assert_eq!(field.perm_mod12[i], field.perm[i] % 12);
        }
    }

    #[test]
    fn test_zero_at_lattice_origin() {
        // All three corner offsets cancel at the origin of the first corner
        let field = NoiseField::new(WorldSeed::new(99));
        assert_eq!(field.sample(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_sample_is_continuous() {
        let field = NoiseField::new(WorldSeed::new(7));
        for k in 0..500 {
            let x = k as f64 * 0.05;
            let y = 4.2 + k as f64 * 0.031;
            let d = (field.sample(x, y) - field.sample(x + 1e-4, y)).abs();
            assert!(d < 0.01, "jump of {} at ({}, {})", d, x, y);
        }
    }

    #[test]
    fn test_fractal_normalized() {
        let field = NoiseField::new(WorldSeed::new(2024));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for &(octaves, persistence) in &[(1, 0.5), (4, 0.5), (8, 0.9), (3, 0.1)] {
            let params = FractalParams::new(octaves, persistence, 0.05).unwrap();
            for _ in 0..2000 {
                let x = rng.gen_range(-1000.0..1000.0);
                let y = rng.gen_range(-1000.0..1000.0);
                let v = field.fractal(x, y, &params);
                assert!((-1.05..=1.05).contains(&v), "fractal out of range: {}", v);
            }
        }
    }

    #[test]
    fn test_single_octave_fractal_equals_scaled_sample() {
        let field = NoiseField::new(WorldSeed::new(3));
        let params = FractalParams::new(1, 0.5, 0.25).unwrap();
        assert_eq!(field.fractal(10.0, 6.0, &params), field.sample(2.5, 1.5));
    }

    #[test]
    fn test_fractal_params_validation() {
        assert!(FractalParams::new(0, 0.5, 0.01).is_err());
        assert!(FractalParams::new(4, f64::NAN, 0.01).is_err());
        assert!(FractalParams::new(4, 0.5, 0.0).is_err());
        assert!(FractalParams::new(4, 0.5, 0.01).is_ok());
    }

    #[test]
    fn test_noise_fn_matches_sample() {
        let field = NoiseField::new(WorldSeed::new(11));
        assert_eq!(field.get([1.25, -3.5]), field.sample(1.25, -3.5));
    }

    #[test]
    fn test_fill_grid_range_and_determinism() {
        let field = NoiseField::new(WorldSeed::new(77));
        let params = FractalParams::new(4, 0.5, 0.05).unwrap();
        let a = fill_grid(32, 24, &field.fractal_source(params));
        let b = fill_grid(32, 24, &field.fractal_source(params));
        assert_eq!(a, b);
        for (_, _, &v) in a.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
