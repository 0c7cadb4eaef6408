//! Graphics error types.

use crate::backend::BackendError;
use crate::draw_list::DrawListError;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphicsError {
    /// The backend failed; the frame was dropped.
    #[error("frame dropped: {0}")]
    Backend(#[from] BackendError),
    /// A command could not be recorded.
    #[error("invalid draw command: {0}")]
    DrawList(#[from] DrawListError),
    /// A WGSL shader failed to parse or validate.
    #[error("shader '{name}' is invalid: {message}")]
    Shader { name: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::from(BackendError::OutOfMemory);
        assert_eq!(err.to_string(), "frame dropped: out of GPU memory");

        let err = GraphicsError::Shader {
            name: "flat_2d",
            message: "unknown identifier".to_string(),
        };
        assert_eq!(err.to_string(), "shader 'flat_2d' is invalid: unknown identifier");
    }
}
