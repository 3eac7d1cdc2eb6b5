//! Scalar field tiles and the fractal synthesizer that fills them.

mod error;
mod params;
mod synth;
mod tile;

pub use error::FieldError;
pub use params::{FractalParams, MIN_SCALE};
pub use synth::{FieldSynthesizer, FractalUniform};
pub use tile::{FieldTile, Rank, normalize};
