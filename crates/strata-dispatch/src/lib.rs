//! Data-parallel dispatch and buffer binding.
//!
//! Kernels run against named buffers owned by a [`DispatchScope`]. The scope
//! allocates them from a [`ComputeBackend`], hands the kernel disjoint output
//! slots, reads results back, and releases every buffer it acquired when it
//! ends, whether the dispatch succeeded or not.

mod backend;
mod error;
mod host;
mod scope;

pub use backend::{BufferDesc, BufferId, BufferUsage, ComputeBackend};
pub use error::DispatchError;
pub use host::HostBackend;
pub use scope::DispatchScope;
