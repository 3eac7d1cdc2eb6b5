use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Half-open range each octave offset component is drawn from.
pub const OCTAVE_OFFSET_RANGE: std::ops::Range<i32> = -100_000..100_000;

/// Per-octave sample offsets for one fractal synthesis call.
///
/// Each octave gets its own random shift so that layers do not line up on the
/// lattice. The caller's coordinate offset is folded in, which lets tiles that
/// share a seed sample one continuous field.
#[derive(Clone, Debug, PartialEq)]
pub struct OctaveOffsets {
    offsets: Vec<Vec3>,
}

impl OctaveOffsets {
    pub fn generate(seed: u64, octaves: u32, offset: Vec3) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let offsets = (0..octaves)
            .map(|_| {
                let mut draw = || rng.random_range(OCTAVE_OFFSET_RANGE) as f32;
                Vec3::new(draw(), draw(), draw()) + offset
            })
            .collect();
        Self { offsets }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.offsets
    }

    /// Offsets padded to four floats each, the layout a storage buffer expects.
    pub fn packed(&self) -> Vec<[f32; 4]> {
        self.offsets.iter().map(|o| [o.x, o.y, o.z, 0.0]).collect()
    }
}
