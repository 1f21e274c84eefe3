//! Error types for NumBridge.

use thiserror::Error;

/// Result type alias for NumBridge operations.
pub type Result<T> = std::result::Result<T, ArrayError>;

/// Error types for the array adapter.
#[derive(Error, Debug)]
pub enum ArrayError {
    /// A source array cannot be coerced to the requested type/requirements.
    #[error("type conversion error: {message}")]
    TypeConversion { message: String },

    /// A caller-supplied buffer is too small for the requested shape.
    #[error("buffer too small: need {required} bytes, got {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Element count mismatch between a shape and the supplied data.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Shape has more dimensions than the supported maximum.
    #[error("rank {rank} exceeds maximum of {max} dimensions")]
    RankOverflow { rank: usize, max: usize },

    /// Invalid index access.
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl ArrayError {
    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Create a buffer-too-small error.
    pub fn buffer_too_small(required: usize, available: usize) -> Self {
        Self::BufferTooSmall {
            required,
            available,
        }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create a rank overflow error.
    pub fn rank_overflow(rank: usize, max: usize) -> Self {
        Self::RankOverflow { rank, max }
    }

    /// Create an index out of bounds error.
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
