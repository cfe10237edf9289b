//! Graphics error types.

use std::fmt;

use crate::backend::BackendError;

/// Errors that can occur in the graphics system.
///
/// Only recoverable conditions are reported through this type. Usage errors
/// such as illegal state transitions or double submission panic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// The recording thread pool could not be started.
    JobSystem(String),
    /// The backend refused to create an object.
    ObjectCreation(String),
    /// Out of GPU memory.
    OutOfMemory,
    /// The GPU device was lost.
    DeviceLost,
    /// An invalid parameter was provided.
    InvalidParameter(String),
    /// The pipeline cache could not be built from the available shaders.
    PipelineBuild(String),
    /// The backend rejected a command list.
    Submission(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobSystem(msg) => write!(f, "job system failed to start: {msg}"),
            Self::ObjectCreation(msg) => write!(f, "object creation failed: {msg}"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::DeviceLost => write!(f, "GPU device lost"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::PipelineBuild(msg) => write!(f, "pipeline build failed: {msg}"),
            Self::Submission(msg) => write!(f, "submission failed: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {}

impl From<BackendError> for GraphicsError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::CreationRejected { kind, reason } => {
                Self::ObjectCreation(format!("{kind:?}: {reason}"))
            }
            BackendError::OutOfMemory => Self::OutOfMemory,
            BackendError::DeviceLost => Self::DeviceLost,
            BackendError::SubmissionRejected(msg) => Self::Submission(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::GpuObjectKind;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::OutOfMemory;
        assert_eq!(err.to_string(), "out of GPU memory");

        let err = GraphicsError::PipelineBuild("missing imagePS".to_string());
        assert_eq!(err.to_string(), "pipeline build failed: missing imagePS");
    }

    #[test]
    fn test_from_backend_error() {
        let err: GraphicsError = BackendError::OutOfMemory.into();
        assert_eq!(err, GraphicsError::OutOfMemory);

        let err: GraphicsError = BackendError::CreationRejected {
            kind: GpuObjectKind::Sampler,
            reason: "heap full".into(),
        }
        .into();
        assert_eq!(err, GraphicsError::ObjectCreation("Sampler: heap full".into()));
    }
}
