use thiserror::Error;

/// Errors raised while building noise kernels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoiseError {
    /// A Worley kernel needs at least one seed point.
    #[error("worley noise requires at least one seed point")]
    NoSeedPoints,

    /// A permutation table slice had the wrong length.
    #[error("permutation table must hold {expected} entries, got {actual}")]
    TableLength { expected: usize, actual: usize },

    /// The first half of a permutation table was not a permutation of `0..256`.
    #[error("permutation table entry {index} ({value}) breaks the permutation")]
    NotAPermutation { index: usize, value: u32 },
}
