use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwishError {
    #[error("Shape mismatch: shape {shape:?} implies {elements} elements but data length is {len}")]
    ShapeDataMismatch {
        shape: Vec<usize>,
        elements: usize,
        len: usize,
    },

    #[error("Cannot broadcast shapes {0:?} and {1:?}")]
    BroadcastError(Vec<usize>, Vec<usize>),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, SwishError>;
