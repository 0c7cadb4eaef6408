//! Backend error types.

/// Errors reported by a [`GpuBackend`](super::GpuBackend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Failed to initialize the backend.
    #[error("backend initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create or upload a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// A pass operation was issued in the wrong state.
    #[error("invalid pass state: {0}")]
    InvalidState(&'static str),
    /// Internal backend error.
    #[error("internal backend error: {0}")]
    Internal(String),
}
