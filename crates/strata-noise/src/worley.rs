use glam::Vec3;

use crate::NoiseError;

/// Distance-to-nearest-seed kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct Worley {
    points: Vec<Vec3>,
}

impl Worley {
    pub fn new(points: Vec<Vec3>) -> Result<Self, NoiseError> {
        if points.is_empty() {
            return Err(NoiseError::NoSeedPoints);
        }
        Ok(Self { points })
    }

    /// Euclidean distance from `point` to the nearest seed point.
    pub fn distance(&self, point: Vec3) -> f32 {
        let nearest = self
            .points
            .iter()
            .map(|seed| (*seed - point).length_squared())
            .fold(f32::INFINITY, f32::min);
        libm::sqrtf(nearest)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_seed_set_is_rejected() {
        assert_eq!(Worley::new(Vec::new()), Err(NoiseError::NoSeedPoints));
    }

    #[test]
    fn test_distance_to_nearest_seed() {
        let worley = Worley::new(vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]).unwrap();
        assert_eq!(worley.distance(Vec3::new(3.0, 4.0, 0.0)), 5.0);
        assert_eq!(worley.distance(Vec3::new(9.0, 0.0, 0.0)), 1.0);
        assert_eq!(worley.distance(Vec3::new(10.0, 0.0, 0.0)), 0.0, "on a seed point");
    }
}
