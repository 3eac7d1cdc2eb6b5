use strata_dispatch::DispatchError;
use strata_field::Rank;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("invalid mesh configuration: {0}")]
    Configuration(String),

    #[error("mesher needs a {expected:?} tile, got {actual:?}")]
    RankMismatch { expected: Rank, actual: Rank },

    #[error("index buffer length {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{uvs} uvs for {vertices} vertices")]
    UvCount { vertices: usize, uvs: usize },

    #[error("mesh dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}
