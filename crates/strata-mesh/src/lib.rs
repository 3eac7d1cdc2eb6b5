//! Mesh synthesis from scalar field tiles.
//!
//! Height fields become a regular triangle grid ([`HeightmapMesher`]);
//! density volumes become an isosurface via marching cubes
//! ([`VolumeMesher`]). Both run their per-vertex or per-cube work as
//! dispatch kernels and return plain [`MeshBuffers`].

mod buffers;
mod curve;
mod error;
mod heightmap;
pub mod tables;
mod volume;

pub use buffers::{MeshBuffers, TerrainVertex};
pub use curve::HeightCurve;
pub use error::MeshError;
pub use heightmap::HeightmapMesher;
pub use volume::{CubeSlot, MAX_CUBE_VERTICES, VolumeMesher, fit_level_of_detail};
