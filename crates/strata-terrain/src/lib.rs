//! Terrain-level passes over field tiles.
//!
//! - [`TileBatch`]: generates a grid of tiles and normalizes them against
//!   shared global bounds so neighbouring tiles line up.
//! - [`classify`] / [`extract_landmasses`]: sort cells into terrain
//!   categories and split each category into connected landmasses with a
//!   representative seed point.
//! - [`color_map`]: per-cell colors for texturing.

mod batch;
mod category;
mod classify;
mod color;
mod coords;
mod error;
mod landmass;
mod resource;

pub use batch::{GlobalBounds, TileBatch};
pub use category::{Color, TerrainCategory};
pub use classify::{Classification, classify};
pub use color::{ColorMap, ColorMode, color_map};
pub use coords::{GridCoord, NEIGHBOUR_OFFSETS, TileCoord};
pub use error::{BatchError, RegionError};
pub use landmass::{CellBounds, LandMass, extract_all, extract_landmasses};
pub use resource::resource_field;
