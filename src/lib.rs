//! Swish activation with a hand-written backward pass.
//!
//! The crate centers on one differentiable primitive, x·σ(β·x), wired into a
//! minimal reverse-mode autograd engine:
//!
//! - [`ops::swish`]: the forward/backward pair with its saved context
//! - [`nn::Swish`]: the module-style wrapper holding β
//! - [`tensor`]: the `f64` tensor core, plus finite-difference gradient
//!   checking for verifying the analytic derivative
//! - [`functional`]: forward-only scalar kernels (`f32` and `f64`)
//!
//! The engine carries only the arithmetic the activation and its tests
//! compose: broadcasting add/sub/mul/div, neg/exp/sigmoid, and scalar
//! sum/mean reductions.

pub mod autograd;
pub mod error;
pub mod functional;
pub mod nn;
pub mod ops;
pub mod tensor;

pub use autograd::GradFn;
pub use error::{Result, SwishError};
pub use nn::{Module, Swish};
pub use ops::{Beta, BinaryOp, ReduceOp, UnaryOp};
pub use tensor::{RawTensor, Tensor, TensorOps};
