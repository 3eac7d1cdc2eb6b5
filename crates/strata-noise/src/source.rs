use glam::Vec3;
use noise::{NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

use crate::{GradientNoise, Worley};

/// Which kernel a fractal field samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseMode {
    #[default]
    Perlin,
    Simplex,
    /// Single-layer distance field around seed points.
    Worley,
}

/// One sampling interface over the available kernels.
#[derive(Clone, Debug)]
pub enum NoiseSource<'a> {
    Perlin(GradientNoise<'a>),
    Simplex(Simplex),
    Worley(&'a Worley),
}

impl<'a> NoiseSource<'a> {
    /// Simplex source seeded from the low 32 bits of a field seed.
    pub fn simplex(seed: u64) -> Self {
        Self::Simplex(Simplex::new(seed as u32))
    }

    pub fn sample_2d(&self, x: f32, y: f32) -> f32 {
        match self {
            Self::Perlin(kernel) => kernel.evaluate_2d(x, y),
            Self::Simplex(kernel) => kernel.get([x as f64, y as f64]).clamp(-1.0, 1.0) as f32,
            Self::Worley(kernel) => kernel.distance(Vec3::new(x, y, 0.0)),
        }
    }

    pub fn sample_3d(&self, x: f32, y: f32, z: f32) -> f32 {
        match self {
            Self::Perlin(kernel) => kernel.evaluate_3d(x, y, z),
            Self::Simplex(kernel) => kernel.get([x as f64, y as f64, z as f64]).clamp(-1.0, 1.0) as f32,
            Self::Worley(kernel) => kernel.distance(Vec3::new(x, y, z)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FadeMode, InterpolationMode, PermutationTable};

    #[test]
    fn test_perlin_source_matches_kernel() {
        let table = PermutationTable::from_seed(2);
        let kernel = GradientNoise::new(&table, FadeMode::Quintic, InterpolationMode::Hermite);
        let source = NoiseSource::Perlin(kernel);
        assert_eq!(source.sample_2d(1.3, 4.7), kernel.evaluate_2d(1.3, 4.7));
        assert_eq!(source.sample_3d(1.3, 4.7, 0.2), kernel.evaluate_3d(1.3, 4.7, 0.2));
    }

    #[test]
    fn test_simplex_source_is_seeded_and_bounded() {
        let a = NoiseSource::simplex(9);
        let b = NoiseSource::simplex(9);
        for i in 0..100 {
            let x = i as f32 * 0.31;
            let value = a.sample_3d(x, -x, 0.5);
            assert_eq!(value, b.sample_3d(x, -x, 0.5));
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_worley_source_projects_2d_onto_z_zero() {
        let worley = Worley::new(vec![Vec3::new(0.0, 0.0, 0.0)]).unwrap();
        let source = NoiseSource::Worley(&worley);
        assert_eq!(source.sample_2d(3.0, 4.0), 5.0);
        assert_eq!(source.sample_3d(0.0, 0.0, 2.0), 2.0);
    }
}
