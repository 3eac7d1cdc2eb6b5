use strata_field::{FieldError, Rank};
use thiserror::Error;

use crate::TileCoord;

#[derive(Debug, Error, PartialEq)]
pub enum RegionError {
    #[error("region passes need a height field, got {0:?}")]
    RankMismatch(Rank),

    #[error("category `{name}` has an empty or inverted band [{min}, {max})")]
    InvalidBand { name: String, min: f32, max: f32 },

    #[error(transparent)]
    Field(#[from] FieldError),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("tile {coord} failed: {source}")]
    Tile {
        coord: TileCoord,
        #[source]
        source: FieldError,
    },

    #[error("failed to spawn tile worker: {0}")]
    Spawn(#[source] std::io::Error),
}
