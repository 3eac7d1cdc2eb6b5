//! One-call terrain generation from a [`Config`](strata_config::Config).
//!
//! [`rebuild`] runs the whole pipeline: a normalized tile grid, then per
//! tile a mesh, a color map, landmasses and a resource field. When to call it
//! is up to the caller; nothing here watches the config.

mod error;
mod rebuild;

pub use error::WorldError;
pub use rebuild::{TileOutput, rebuild, rebuild_with};
