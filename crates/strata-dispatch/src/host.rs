//! Host-memory backend running kernels on scoped CPU threads.

use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;

use crate::{BufferDesc, BufferId, ComputeBackend, DispatchError};

struct HostBuffer {
    label: String,
    bytes: Vec<u8>,
}

/// A [`ComputeBackend`] that keeps buffers in host memory.
pub struct HostBackend {
    buffers: Mutex<HashMap<BufferId, HostBuffer>>,
    next_id: AtomicU64,
    workers: usize,
}

impl HostBackend {
    /// Create a backend that splits dispatches across `workers` threads.
    pub fn new(workers: usize) -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            workers: workers.max(1),
        }
    }

    /// Create a backend with one worker per logical CPU.
    pub fn with_defaults() -> Self {
        Self::new(num_cpus::get())
    }

    fn with_buffers<R>(
        &self,
        f: impl FnOnce(&mut HashMap<BufferId, HostBuffer>) -> Result<R, DispatchError>,
    ) -> Result<R, DispatchError> {
        let mut buffers = self.buffers.lock().map_err(|_| DispatchError::Poisoned)?;
        f(&mut buffers)
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ComputeBackend for HostBackend {
    fn allocate(&self, desc: &BufferDesc<'_>) -> Result<BufferId, DispatchError> {
        let id = BufferId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.with_buffers(|buffers| {
            buffers.insert(
                id,
                HostBuffer {
                    label: desc.label.to_owned(),
                    bytes: vec![0; desc.size],
                },
            );
            Ok(())
        })?;
        log::trace!("Allocated host buffer {id:?} `{}` ({} bytes)", desc.label, desc.size);
        Ok(id)
    }

    fn write(&self, id: BufferId, bytes: &[u8]) -> Result<(), DispatchError> {
        self.with_buffers(|buffers| {
            let buffer = buffers.get_mut(&id).ok_or(DispatchError::UnknownBuffer(id))?;
            if buffer.bytes.len() != bytes.len() {
                return Err(DispatchError::SizeMismatch {
                    name: buffer.label.clone(),
                    expected: buffer.bytes.len(),
                    actual: bytes.len(),
                });
            }
            buffer.bytes.copy_from_slice(bytes);
            Ok(())
        })
    }

    fn read(&self, id: BufferId) -> Result<Vec<u8>, DispatchError> {
        self.with_buffers(|buffers| {
            buffers
                .get(&id)
                .map(|buffer| buffer.bytes.clone())
                .ok_or(DispatchError::UnknownBuffer(id))
        })
    }

    fn release(&self, id: BufferId) -> Result<(), DispatchError> {
        self.with_buffers(|buffers| {
            buffers
                .remove(&id)
                .map(|_| ())
                .ok_or(DispatchError::UnknownBuffer(id))
        })
    }

    fn live_buffers(&self) -> usize {
        // A kernel that panicked mid-dispatch must not hide its buffers.
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn parallelism(&self) -> usize {
        self.workers
    }
}
