use crate::autograd::GradFn;
use crate::functional;
use crate::{RawTensor, Tensor};

/// Unary operations: single input, single output
///
/// Each operation has a corresponding derivative:
/// - Neg: d(-x)/dx = -1
/// - Exp: d(eˣ)/dx = eˣ
/// - Sigmoid: d(σ(x))/dx = σ(x)·(1-σ(x))
#[derive(Clone, Copy)]
pub enum UnaryOp {
    Neg,
    Exp,
    Sigmoid,
}

impl UnaryOp {
    /// Evaluate the operation at a single point.
    fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Exp => x.exp(),
            UnaryOp::Sigmoid => functional::sigmoid(x),
        }
    }

    /// Closed-form derivative at a single point.
    fn derivative(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -1.0,
            UnaryOp::Exp => x.exp(),
            UnaryOp::Sigmoid => {
                let s = functional::sigmoid(x);
                s * (1.0 - s)
            }
        }
    }
}

/// Gradient function for unary operations
///
/// Stores which operation was performed so backward can apply the correct derivative.
pub struct UnaryGradFn {
    op: UnaryOp,
}

impl GradFn for UnaryGradFn {
    fn backward(&self, out_grad: &RawTensor, parents: &[Tensor]) -> Vec<Option<Tensor>> {
        let input = parents
            .first()
            .expect("unary ops require 1 parent")
            .borrow();

        // Chain rule: ∂L/∂x = ∂L/∂y · f'(x), elementwise.
        let grad: Vec<f64> = out_grad
            .data
            .iter()
            .zip(&input.data)
            .map(|(&g, &x)| g * self.op.derivative(x))
            .collect();

        vec![Some(RawTensor::new(grad, &input.shape, false))]
    }

    fn clone_box(&self) -> Box<dyn GradFn> {
        Box::new(Self { op: self.op })
    }
}

// ===== UNARY OPERATIONS =====
impl RawTensor {
    /// Apply a unary operation element-wise, recording the graph edge when the
    /// input participates in gradient tracking.
    pub fn unary_op(input: &Tensor, op: UnaryOp) -> Tensor {
        let (result, shape, requires_grad) = {
            let t = input.borrow();
            let mapped: Vec<f64> = t.data.iter().map(|&x| op.apply(x)).collect();
            (mapped, t.shape.clone(), t.requires_grad)
        };

        let out = Self::new(result, &shape, requires_grad);

        if requires_grad {
            let mut o = out.borrow_mut();
            o.parents = vec![input.clone()];
            o.grad_fn = Some(Box::new(UnaryGradFn { op }));
        }
        out
    }

    // Convenience methods for each unary operation
    pub fn neg(t: &Tensor) -> Tensor {
        Self::unary_op(t, UnaryOp::Neg)
    }
    pub fn exp(t: &Tensor) -> Tensor {
        Self::unary_op(t, UnaryOp::Exp)
    }
    pub fn sigmoid(t: &Tensor) -> Tensor {
        Self::unary_op(t, UnaryOp::Sigmoid)
    }
}
