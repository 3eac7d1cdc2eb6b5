use crate::DispatchError;

/// Opaque handle to a buffer owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// How a kernel uses a bound buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Read-only array input.
    Storage,
    /// Small read-only parameter block.
    Constant,
    /// Written by the kernel, read back afterwards.
    Output,
}

/// Allocation request passed to [`ComputeBackend::allocate`].
#[derive(Clone, Copy, Debug)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub size: usize,
    pub usage: BufferUsage,
}

/// Storage and execution resources a [`DispatchScope`](crate::DispatchScope)
/// binds kernels against.
///
/// Implementations must be shareable across the worker threads a dispatch
/// spawns. Every successful `allocate` must be matched by exactly one
/// `release`.
pub trait ComputeBackend: Sync {
    /// Allocate a zero-filled buffer.
    fn allocate(&self, desc: &BufferDesc<'_>) -> Result<BufferId, DispatchError>;

    /// Overwrite the whole buffer. `bytes` must match the allocated size.
    fn write(&self, id: BufferId, bytes: &[u8]) -> Result<(), DispatchError>;

    /// Copy the buffer contents back to the host.
    fn read(&self, id: BufferId) -> Result<Vec<u8>, DispatchError>;

    fn release(&self, id: BufferId) -> Result<(), DispatchError>;

    /// Buffers allocated and not yet released.
    fn live_buffers(&self) -> usize;

    /// Number of workers a dispatch may split its work items across.
    fn parallelism(&self) -> usize;
}
