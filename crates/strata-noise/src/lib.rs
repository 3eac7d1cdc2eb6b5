//! Noise kernels for terrain synthesis.
//!
//! Provides the seeded permutation table, the 2D/3D gradient noise kernel
//! with selectable fade and blend curves, a Worley distance kernel, per-octave
//! offset derivation and a [`NoiseSource`] that puts them behind one call.

mod error;
mod interpolate;
mod octaves;
mod permutation;
mod perlin;
mod source;
mod worley;

pub use error::NoiseError;
pub use interpolate::{FadeMode, InterpolationMode, inverse_lerp};
pub use octaves::{OCTAVE_OFFSET_RANGE, OctaveOffsets};
pub use permutation::{PERMUTATION_SIZE, PermutationTable};
pub use perlin::{GradientNoise, HASH_2D_V1, HASH_3D_V1};
pub use source::{NoiseMode, NoiseSource};
pub use worley::Worley;
