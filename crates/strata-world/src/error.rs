use strata_field::FieldError;
use strata_mesh::MeshError;
use strata_terrain::{BatchError, RegionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("mesh synthesis failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("region extraction failed: {0}")]
    Region(#[from] RegionError),
}
