use strata_dispatch::DispatchError;
use strata_noise::NoiseError;
use thiserror::Error;

use crate::Rank;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    /// Parameters that cannot be clamped into a usable state.
    #[error("invalid field configuration: {0}")]
    Configuration(String),

    #[error("a {dimensions}-wide rank {rank:?} tile holds {expected} cells, got {actual}")]
    CellCount {
        dimensions: usize,
        rank: Rank,
        expected: usize,
        actual: usize,
    },

    #[error("operation needs a {expected:?} tile, got {actual:?}")]
    RankMismatch { expected: Rank, actual: Rank },

    #[error("field dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Noise(#[from] NoiseError),
}
