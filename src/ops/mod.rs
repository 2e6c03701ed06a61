// Operation enums and trait implementations
pub mod binary;
pub mod reduce;
pub mod swish;
pub mod unary;

// Re-export operation types
pub use binary::{BinaryGradFn, BinaryOp};
pub use reduce::{ReduceGradFn, ReduceOp};
pub use swish::{Beta, SwishGradFn};
pub use unary::{UnaryGradFn, UnaryOp};

use crate::{RawTensor, Tensor};

// ===== LOAD OPERATIONS =====

impl RawTensor {
    /// Create tensor filled with constant value
    pub fn constant(value: f64, shape: &[usize]) -> Tensor {
        let size = shape.iter().product();
        Self::new(vec![value; size], shape, false)
    }
    /// Create tensor from existing Vec
    pub fn from_vec(data: Vec<f64>, shape: &[usize]) -> Tensor {
        Self::new(data, shape, false)
    }
}
