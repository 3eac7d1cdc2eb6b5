use glam::Vec3;
use strata_noise::{FadeMode, InterpolationMode, NoiseMode};

use crate::Rank;

/// Smallest scale a field is sampled at. Non-positive scales are raised to it.
pub const MIN_SCALE: f32 = 0.0001;

/// Configuration for one fractal field tile.
#[derive(Clone, Debug, PartialEq)]
pub struct FractalParams {
    /// Seed for the per-octave offsets (and the Simplex kernel).
    pub seed: u64,
    /// Divisor applied to cell coordinates before sampling. Larger values
    /// stretch features over more cells. Default: 20.0.
    pub scale: f32,
    /// Cells per axis. Default: 241.
    pub dimensions: usize,
    /// World-space shift of the tile origin, folded into every octave offset.
    pub offset: Vec3,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f32,
    /// Amplitude multiplier between successive octaves, in `[0, 1]`. Default: 0.5.
    pub persistence: f32,
    /// Number of noise layers summed per cell. Default: 4.
    pub octaves: u32,
    pub rank: Rank,
    pub noise_mode: NoiseMode,
    pub interpolation: InterpolationMode,
    pub fade: FadeMode,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 20.0,
            dimensions: 241,
            offset: Vec3::ZERO,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 4,
            rank: Rank::Two,
            noise_mode: NoiseMode::Perlin,
            interpolation: InterpolationMode::Linear,
            fade: FadeMode::Quintic,
        }
    }
}

impl FractalParams {
    /// Copy with every out-of-range field clamped to the nearest usable value.
    pub fn sanitized(&self) -> Self {
        Self {
            scale: if self.scale > 0.0 { self.scale } else { MIN_SCALE },
            dimensions: self.dimensions.max(2),
            lacunarity: self.lacunarity.max(1.0),
            persistence: if self.persistence.is_nan() {
                0.0
            } else {
                self.persistence.clamp(0.0, 1.0)
            },
            octaves: self.octaves.max(1),
            ..self.clone()
        }
    }

    /// Upper bound on `|cell|` for fractal modes: the sum of every octave's
    /// amplitude.
    pub fn max_amplitude(&self) -> f32 {
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }
}
