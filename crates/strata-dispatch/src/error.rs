use thiserror::Error;

use crate::BufferId;

/// Failures raised while binding buffers or running a kernel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("backend could not allocate {size} bytes for `{label}`: {reason}")]
    Allocation {
        label: String,
        size: usize,
        reason: String,
    },

    #[error("backend does not recognise buffer {0:?}")]
    UnknownBuffer(BufferId),

    #[error("buffer `{0}` is not bound in this scope")]
    UnboundName(String),

    #[error("buffer `{0}` is already bound in this scope")]
    DuplicateName(String),

    #[error("buffer `{0}` was not prepared as an output")]
    NotAnOutput(String),

    #[error("buffer `{name}` holds {actual} bytes, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("kernel stride must be at least one element")]
    ZeroStride,

    #[error("backend state is poisoned by a panicked kernel")]
    Poisoned,
}
