use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    #[error("Invalid dimensions: {0}x{1}, both must be positive")]
    InvalidDimensions(u32, u32),
    #[error("Invalid pixel data: expecting {expected} bytes but got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Shape mismatch: expecting {expected:?} but got {actual:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
