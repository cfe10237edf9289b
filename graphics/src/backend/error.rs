//! Backend error types.

use std::fmt;

use crate::resources::GpuObjectKind;

/// A recoverable failure reported by a [`GpuBackend`](super::GpuBackend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend refused to create an object of this kind.
    CreationRejected {
        /// Requested object kind.
        kind: GpuObjectKind,
        /// Backend-specific reason.
        reason: String,
    },
    /// Device memory is exhausted.
    OutOfMemory,
    /// The device was removed or reset; nothing further can be submitted.
    DeviceLost,
    /// The queue rejected a command list.
    SubmissionRejected(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreationRejected { kind, reason } => {
                write!(f, "{kind:?} creation rejected: {reason}")
            }
            Self::OutOfMemory => f.write_str("out of GPU memory"),
            Self::DeviceLost => f.write_str("GPU device lost"),
            Self::SubmissionRejected(msg) => write!(f, "submission rejected: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
