//! Scoped buffer binding for one kernel invocation.

use bytemuck::Pod;

use crate::{BufferDesc, BufferId, BufferUsage, ComputeBackend, DispatchError};

struct Binding {
    name: String,
    id: BufferId,
    usage: BufferUsage,
    size: usize,
}

/// Buffers bound by name for one kernel, released when the scope ends.
///
/// Every buffer a scope acquires is released exactly once: by
/// [`finish`](Self::finish) on the success path, or by `Drop` when an error
/// (or a panicking kernel) unwinds the caller early.
///
/// ```ignore
/// let mut scope = DispatchScope::new(&backend, "double");
/// scope.prepare_buffer("input", &[1.0f32, 2.0, 3.0])?;
/// scope.prepare_output::<f32>("output", 3)?;
/// let input: Vec<f32> = scope.input("input")?;
/// scope.dispatch("output", 3, 1, |i, out: &mut [f32]| out[0] = input[i] * 2.0)?;
/// let doubled: Vec<f32> = scope.read_output("output")?;
/// scope.finish()?;
/// ```
pub struct DispatchScope<'b, B: ComputeBackend + ?Sized> {
    backend: &'b B,
    label: String,
    bindings: Vec<Binding>,
}

impl<'b, B: ComputeBackend + ?Sized> DispatchScope<'b, B> {
    pub fn new(backend: &'b B, label: impl Into<String>) -> Self {
        Self {
            backend,
            label: label.into(),
            bindings: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of buffers currently held by this scope.
    pub fn bound_buffers(&self) -> usize {
        self.bindings.len()
    }

    /// Bind a read-only array.
    pub fn prepare_buffer<T: Pod>(&mut self, name: &str, data: &[T]) -> Result<(), DispatchError> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.bind(name, BufferUsage::Storage, bytes.len(), Some(bytes))
    }

    /// Bind a read-only parameter block.
    pub fn prepare_constant<T: Pod>(&mut self, name: &str, value: &T) -> Result<(), DispatchError> {
        let bytes = bytemuck::bytes_of(value);
        self.bind(name, BufferUsage::Constant, bytes.len(), Some(bytes))
    }

    /// Bind a zeroed output array of `count` elements.
    pub fn prepare_output<T: Pod>(&mut self, name: &str, count: usize) -> Result<(), DispatchError> {
        self.bind(name, BufferUsage::Output, count * size_of::<T>(), None)
    }

    /// Read a bound array back as typed elements.
    pub fn input<T: Pod>(&self, name: &str) -> Result<Vec<T>, DispatchError> {
        let binding = self.binding(name)?;
        decode(name, &self.backend.read(binding.id)?)
    }

    /// Read a bound parameter block.
    pub fn constant<T: Pod>(&self, name: &str) -> Result<T, DispatchError> {
        let binding = self.binding(name)?;
        let bytes = self.backend.read(binding.id)?;
        if bytes.len() != size_of::<T>() {
            return Err(DispatchError::SizeMismatch {
                name: name.to_owned(),
                expected: size_of::<T>(),
                actual: bytes.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Run `kernel` once per work item.
    ///
    /// Work item `i` owns elements `[i * stride, (i + 1) * stride)` of the
    /// output buffer and receives them as its slot. Items are split into
    /// contiguous runs across the backend's workers, so kernels never share
    /// a slot.
    pub fn dispatch<T, F>(
        &mut self,
        output: &str,
        work_items: usize,
        stride: usize,
        kernel: F,
    ) -> Result<(), DispatchError>
    where
        T: Pod + Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if stride == 0 {
            return Err(DispatchError::ZeroStride);
        }
        let binding = self.binding(output)?;
        if binding.usage != BufferUsage::Output {
            return Err(DispatchError::NotAnOutput(output.to_owned()));
        }
        let expected = work_items * stride * size_of::<T>();
        if binding.size != expected {
            return Err(DispatchError::SizeMismatch {
                name: output.to_owned(),
                expected,
                actual: binding.size,
            });
        }
        let id = binding.id;

        let mut results = vec![T::zeroed(); work_items * stride];
        let workers = self.backend.parallelism().clamp(1, work_items.max(1));
        let items_per_worker = work_items.div_ceil(workers).max(1);
        let kernel = &kernel;
        std::thread::scope(|s| {
            for (run, chunk) in results.chunks_mut(items_per_worker * stride).enumerate() {
                s.spawn(move || {
                    let first = run * items_per_worker;
                    for (offset, slot) in chunk.chunks_mut(stride).enumerate() {
                        kernel(first + offset, slot);
                    }
                });
            }
        });

        self.backend.write(id, bytemuck::cast_slice(&results))?;
        log::trace!(
            "Dispatched `{}` into `{output}`: {work_items} items across {workers} workers",
            self.label
        );
        Ok(())
    }

    /// Read an output buffer back after [`dispatch`](Self::dispatch).
    pub fn read_output<T: Pod>(&self, name: &str) -> Result<Vec<T>, DispatchError> {
        let binding = self.binding(name)?;
        if binding.usage != BufferUsage::Output {
            return Err(DispatchError::NotAnOutput(name.to_owned()));
        }
        decode(name, &self.backend.read(binding.id)?)
    }

    /// Release every buffer, reporting the first release the backend rejected.
    pub fn finish(mut self) -> Result<(), DispatchError> {
        self.release_all()
    }

    fn binding(&self, name: &str) -> Result<&Binding, DispatchError> {
        self.bindings
            .iter()
            .find(|binding| binding.name == name)
            .ok_or_else(|| DispatchError::UnboundName(name.to_owned()))
    }

    fn bind(
        &mut self,
        name: &str,
        usage: BufferUsage,
        size: usize,
        contents: Option<&[u8]>,
    ) -> Result<(), DispatchError> {
        if self.bindings.iter().any(|binding| binding.name == name) {
            return Err(DispatchError::DuplicateName(name.to_owned()));
        }
        let id = self.backend.allocate(&BufferDesc {
            label: name,
            size,
            usage,
        })?;
        // Tracked before the upload so a failed write is still released.
        self.bindings.push(Binding {
            name: name.to_owned(),
            id,
            usage,
            size,
        });
        if let Some(bytes) = contents {
            self.backend.write(id, bytes)?;
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), DispatchError> {
        let mut first_error = None;
        for binding in self.bindings.drain(..) {
            if let Err(err) = self.backend.release(binding.id) {
                log::error!(
                    "Dispatch scope `{}` failed to release `{}`: {err}",
                    self.label,
                    binding.name
                );
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<B: ComputeBackend + ?Sized> Drop for DispatchScope<'_, B> {
    fn drop(&mut self) {
        let released = self.release_all();
        debug_assert!(
            released.is_ok() || std::thread::panicking(),
            "dispatch scope `{}` released a buffer its backend did not recognise",
            self.label
        );
    }
}

fn decode<T: Pod>(name: &str, bytes: &[u8]) -> Result<Vec<T>, DispatchError> {
    let size = size_of::<T>();
    if size == 0 {
        return Ok(Vec::new());
    }
    if bytes.len() % size != 0 {
        return Err(DispatchError::SizeMismatch {
            name: name.to_owned(),
            expected: bytes.len() / size * size,
            actual: bytes.len(),
        });
    }
    Ok(bytes.chunks_exact(size).map(bytemuck::pod_read_unaligned).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::HostBackend;

    /// Host backend that refuses allocations after a fixed budget.
    struct FailingBackend {
        inner: HostBackend,
        allocations_left: AtomicUsize,
    }

    impl FailingBackend {
        fn new(budget: usize) -> Self {
            Self {
                inner: HostBackend::new(2),
                allocations_left: AtomicUsize::new(budget),
            }
        }
    }

    impl ComputeBackend for FailingBackend {
        fn allocate(&self, desc: &BufferDesc<'_>) -> Result<BufferId, DispatchError> {
            let left = self.allocations_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(DispatchError::Allocation {
                    label: desc.label.to_owned(),
                    size: desc.size,
                    reason: "budget exhausted".into(),
                });
            }
            self.allocations_left.store(left - 1, Ordering::SeqCst);
            self.inner.allocate(desc)
        }

        fn write(&self, id: BufferId, bytes: &[u8]) -> Result<(), DispatchError> {
            self.inner.write(id, bytes)
        }

        fn read(&self, id: BufferId) -> Result<Vec<u8>, DispatchError> {
            self.inner.read(id)
        }

        fn release(&self, id: BufferId) -> Result<(), DispatchError> {
            self.inner.release(id)
        }

        fn live_buffers(&self) -> usize {
            self.inner.live_buffers()
        }

        fn parallelism(&self) -> usize {
            self.inner.parallelism()
        }
    }

    fn double_into(
        backend: &impl ComputeBackend,
        values: &[f32],
    ) -> Result<Vec<f32>, DispatchError> {
        let mut scope = DispatchScope::new(backend, "double");
        scope.prepare_buffer("input", values)?;
        scope.prepare_constant("factor", &2.0f32)?;
        scope.prepare_output::<f32>("output", values.len())?;

        let input: Vec<f32> = scope.input("input")?;
        let factor: f32 = scope.constant("factor")?;
        scope.dispatch("output", input.len(), 1, |i, out: &mut [f32]| {
            out[0] = input[i] * factor;
        })?;
        let output = scope.read_output("output")?;
        scope.finish()?;
        Ok(output)
    }

    #[test]
    fn test_success_releases_everything() {
        let backend = HostBackend::new(3);
        let doubled = double_into(&backend, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(doubled, vec![2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(backend.live_buffers(), 0, "scope must release all buffers");
    }

    #[test]
    fn test_failure_releases_everything() {
        // Two allocations succeed, the output allocation fails.
        let backend = FailingBackend::new(2);
        let err = double_into(&backend, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, DispatchError::Allocation { .. }), "got {err:?}");
        assert_eq!(backend.live_buffers(), 0, "buffers leaked on the error path");
    }

    #[test]
    fn test_drop_without_finish_releases() {
        let backend = HostBackend::new(1);
        {
            let mut scope = DispatchScope::new(&backend, "abandoned");
            scope.prepare_buffer("a", &[1u32, 2, 3]).unwrap();
            scope.prepare_output::<u32>("b", 3).unwrap();
            assert_eq!(backend.live_buffers(), 2);
        }
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_strided_slots_cover_every_item() {
        let backend = HostBackend::new(3);
        let mut scope = DispatchScope::new(&backend, "strided");
        scope.prepare_output::<u32>("out", 10 * 2).unwrap();
        scope
            .dispatch("out", 10, 2, |i, slot: &mut [u32]| {
                assert_eq!(slot.len(), 2);
                slot[0] = i as u32;
                slot[1] = i as u32 * 100;
            })
            .unwrap();
        let out: Vec<u32> = scope.read_output("out").unwrap();
        for i in 0..10u32 {
            assert_eq!(out[2 * i as usize], i);
            assert_eq!(out[2 * i as usize + 1], i * 100);
        }
        scope.finish().unwrap();
    }

    #[test]
    fn test_zero_work_items_is_a_no_op() {
        let backend = HostBackend::new(4);
        let mut scope = DispatchScope::new(&backend, "empty");
        scope.prepare_output::<f32>("out", 0).unwrap();
        scope.dispatch("out", 0, 1, |_, _: &mut [f32]| unreachable!()).unwrap();
        assert!(scope.read_output::<f32>("out").unwrap().is_empty());
    }

    #[test]
    fn test_binding_errors() {
        let backend = HostBackend::new(1);
        let mut scope = DispatchScope::new(&backend, "errors");
        scope.prepare_buffer("data", &[1.0f32]).unwrap();

        assert_eq!(
            scope.prepare_buffer("data", &[2.0f32]),
            Err(DispatchError::DuplicateName("data".into()))
        );
        assert_eq!(
            scope.input::<f32>("missing"),
            Err(DispatchError::UnboundName("missing".into()))
        );
        assert_eq!(
            scope.dispatch("data", 1, 1, |_, _: &mut [f32]| {}),
            Err(DispatchError::NotAnOutput("data".into()))
        );

        scope.prepare_output::<f32>("out", 4).unwrap();
        assert_eq!(
            scope.dispatch("out", 4, 0, |_, _: &mut [f32]| {}),
            Err(DispatchError::ZeroStride)
        );
        assert!(matches!(
            scope.dispatch("out", 3, 1, |_, _: &mut [f32]| {}),
            Err(DispatchError::SizeMismatch { expected: 12, actual: 16, .. })
        ));
        assert_eq!(scope.bound_buffers(), 2, "failed binds must not be tracked");
    }
}
