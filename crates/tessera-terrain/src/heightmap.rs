//! Seeded multi-octave fractal noise for terrain height samples.
//!
//! Each octave samples 2D Perlin noise at a seed-derived offset, doubling in
//! frequency and halving in amplitude by default, so the same world point
//! always yields the same value regardless of which chunk asks for it.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_config::{NoiseConfig, NormalizeMode};

/// Global normalisation headroom: raw sums rarely approach the theoretical
/// maximum, so it is scaled down before dividing.
const GLOBAL_HEADROOM: f64 = 0.9;

/// Configuration for multi-octave fBm noise.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Horizontal scale of the first octave in terrain units. Must be positive.
    pub scale: f64,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Constant offset added to every sample coordinate.
    pub offset: (f64, f64),
    /// How raw sums are mapped into `[0, 1]`.
    pub normalize_mode: NormalizeMode,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 60.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl From<&NoiseConfig> for HeightmapParams {
    fn from(config: &NoiseConfig) -> Self {
        Self {
            seed: config.seed,
            scale: config.scale,
            octaves: config.octaves,
            persistence: config.persistence,
            lacunarity: config.lacunarity,
            offset: config.offset,
            normalize_mode: config.normalize_mode,
        }
    }
}

/// Generates raw fractal noise values at 2D sample coordinates.
pub struct HeightmapSampler {
    noise: Perlin,
    octave_offsets: Vec<(f64, f64)>,
    params: HeightmapParams,
}

impl HeightmapSampler {
    /// Create a new sampler with the given parameters.
    pub fn new(mut params: HeightmapParams) -> Self {
        if params.scale <= 0.0 {
            params.scale = 1e-4;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let octave_offsets = (0..params.octaves)
            .map(|_| {
                (
                    rng.random_range(-100_000.0..100_000.0) + params.offset.0,
                    rng.random_range(-100_000.0..100_000.0) + params.offset.1,
                )
            })
            .collect();
        Self {
            noise: Perlin::new(params.seed as u32),
            octave_offsets,
            params,
        }
    }

    /// Raw fBm sum at sample coordinate `(x, y)`, roughly within
    /// `[-max_amplitude, +max_amplitude]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for &(ox, oy) in &self.octave_offsets {
            let nx = (x + ox) / self.params.scale * frequency;
            let ny = (y + oy) / self.params.scale * frequency;
            total += self.noise.get([nx, ny]).clamp(-1.0, 1.0) * amplitude;

            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Map a raw sum into `[0, 1]` using the theoretical amplitude.
    ///
    /// Only meaningful for [`NormalizeMode::Global`]; local normalisation needs
    /// the whole grid and is applied by the height source.
    pub fn normalize_global(&self, raw: f64) -> f64 {
        let max = self.max_amplitude();
        if max == 0.0 {
            return 0.0;
        }
        ((raw / (max * GLOBAL_HEADROOM) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Geometric sum of all octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}
