use crate::autograd::GradFn;
use crate::error::{Result, SwishError};
use crate::{RawTensor, Tensor};

/// Binary operations: two inputs, one output
///
/// Broadcasting is automatically handled for compatible shapes.
#[derive(Clone, Copy)]
pub enum BinaryOp {
    Add, // x + y
    Sub, // x - y
    Mul, // x * y (element-wise)
    Div, // x / y (element-wise)
}

impl BinaryOp {
    /// Evaluate the operation at a single point.
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }

    /// Partial derivatives (∂out/∂a, ∂out/∂b) at a single point.
    fn partials(self, a: f64, b: f64) -> (f64, f64) {
        match self {
            BinaryOp::Add => (1.0, 1.0),
            BinaryOp::Sub => (1.0, -1.0),
            BinaryOp::Mul => (b, a),
            BinaryOp::Div => (1.0 / b, -a / (b * b)),
        }
    }
}

/// Gradient function for binary operations
///
/// Handles broadcasting during backward pass - gradients must be summed
/// over dimensions that were broadcast in the forward pass.
pub struct BinaryGradFn {
    op: BinaryOp,
}

impl GradFn for BinaryGradFn {
    fn backward(&self, out_grad: &RawTensor, parents: &[Tensor]) -> Vec<Option<Tensor>> {
        let lhs_ref = parents.first().cloned().expect("binary ops take 2 parents");
        let rhs_ref = parents.get(1).cloned().expect("binary ops take 2 parents");
        let lhs = lhs_ref.borrow();
        let rhs = rhs_ref.borrow();

        // Re-broadcast both operands to the output shape, then chain each
        // upstream gradient element through the matching local partial.
        let a = RawTensor::broadcast_to(&lhs.data, &lhs.shape, &out_grad.shape);
        let b = RawTensor::broadcast_to(&rhs.data, &rhs.shape, &out_grad.shape);

        let side = |operand: &RawTensor, pick_lhs: bool| -> Option<Tensor> {
            if !operand.requires_grad {
                return None;
            }
            let chained: Vec<f64> = out_grad
                .data
                .iter()
                .enumerate()
                .map(|(k, &g)| {
                    let (da, db) = self.op.partials(a[k], b[k]);
                    g * if pick_lhs { da } else { db }
                })
                .collect();
            let summed =
                RawTensor::sum_over_broadcast_dims(&chained, &out_grad.shape, &operand.shape);
            Some(RawTensor::new(summed, &operand.shape, false))
        };

        vec![side(&lhs, true), side(&rhs, false)]
    }

    fn clone_box(&self) -> Box<dyn GradFn> {
        Box::new(BinaryGradFn { op: self.op })
    }
}

// ===== BROADCASTING HELPERS =====
impl RawTensor {
    /// Compute broadcast shape following `NumPy` broadcasting rules
    ///
    /// Rules:
    /// 1. Align shapes from the right (trailing dimensions)
    /// 2. For each dimension, both must be equal OR one must be 1
    /// 3. Output dimension is the maximum of the two
    ///
    /// Examples:
    /// - (3, 1) + (1, 4) -> (3, 4)
    /// - (5, 3, 1) + (1, 4) -> (5, 3, 4)
    ///
    /// # Errors
    /// Returns `BroadcastError` for incompatible shapes.
    pub fn try_broadcast_shape(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>> {
        let rank = shape_a.len().max(shape_b.len());
        let mut out = vec![1; rank];

        for i in 0..rank {
            // Missing leading dimensions count as size 1.
            let a = shape_a
                .len()
                .checked_sub(i + 1)
                .map_or(1, |j| shape_a[j]);
            let b = shape_b
                .len()
                .checked_sub(i + 1)
                .map_or(1, |j| shape_b[j]);

            out[rank - 1 - i] = match (a, b) {
                (a, b) if a == b => a,
                (1, b) => b,
                (a, 1) => a,
                _ => {
                    return Err(SwishError::BroadcastError(
                        shape_a.to_vec(),
                        shape_b.to_vec(),
                    ));
                }
            };
        }
        Ok(out)
    }

    /// Panicking variant of [`RawTensor::try_broadcast_shape`], for the op hot
    /// paths where a shape mismatch is a programmer error.
    ///
    /// # Panics
    /// broadcast failures
    #[must_use]
    pub fn broadcast_shape(shape_a: &[usize], shape_b: &[usize]) -> Vec<usize> {
        match Self::try_broadcast_shape(shape_a, shape_b) {
            Ok(shape) => shape,
            Err(e) => panic!("{e}"),
        }
    }

    /// Broadcast data from one shape to another
    ///
    /// This repeats values along dimensions where `from_shape` is 1
    /// and `to_shape` is larger.
    pub(crate) fn broadcast_to(data: &[f64], from_shape: &[usize], to_shape: &[usize]) -> Vec<f64> {
        if from_shape == to_shape {
            return data.to_vec();
        }

        let rank = to_shape.len();
        let offset = rank - from_shape.len();
        let from_strides = Self::compute_strides(from_shape);
        let to_size: usize = to_shape.iter().product();

        // Walk output coordinates odometer-style; dimensions where the source
        // has size 1 (or doesn't exist) stay pinned at coordinate 0.
        let mut out = Vec::with_capacity(to_size);
        let mut coords = vec![0usize; rank];
        for _ in 0..to_size {
            let mut src = 0;
            for d in offset..rank {
                if from_shape[d - offset] != 1 {
                    src += coords[d] * from_strides[d - offset];
                }
            }
            out.push(data[src]);

            for d in (0..rank).rev() {
                coords[d] += 1;
                if coords[d] < to_shape[d] {
                    break;
                }
                coords[d] = 0;
            }
        }
        out
    }

    /// Sum gradient over dimensions that were broadcast
    ///
    /// During backward pass, if a dimension was broadcast from size 1 to size N,
    /// we need to sum the gradients over that dimension to get the gradient
    /// for the original size-1 dimension.
    pub(crate) fn sum_over_broadcast_dims(
        grad: &[f64],
        grad_shape: &[usize],
        target_shape: &[usize],
    ) -> Vec<f64> {
        if grad_shape == target_shape {
            return grad.to_vec();
        }

        let rank = grad_shape.len();
        let offset = rank - target_shape.len();
        let target_strides = Self::compute_strides(target_shape);

        let mut out = vec![0.0; target_shape.iter().product()];
        let mut coords = vec![0usize; rank];
        for &g in grad {
            let mut dst = 0;
            for d in offset..rank {
                if target_shape[d - offset] != 1 {
                    dst += coords[d] * target_strides[d - offset];
                }
            }
            out[dst] += g;

            for d in (0..rank).rev() {
                coords[d] += 1;
                if coords[d] < grad_shape[d] {
                    break;
                }
                coords[d] = 0;
            }
        }
        out
    }

    /// Row-major strides for a contiguous tensor of the given shape.
    pub(crate) fn compute_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1; shape.len()];
        let mut acc = 1;
        for (stride, &dim) in strides.iter_mut().zip(shape).rev() {
            *stride = acc;
            acc *= dim;
        }
        strides
    }
}

// ===== BINARY OPERATIONS =====
impl RawTensor {
    /// Apply a binary operation with broadcasting
    ///
    /// Both inputs are broadcast to their common shape, the operation is
    /// applied element-wise, and a graph edge is recorded when either input
    /// participates in gradient tracking.
    ///
    /// # Panics
    /// broadcast failure
    pub fn binary_op(lhs: &Tensor, rhs: &Tensor, op: BinaryOp) -> Tensor {
        let (a_data, a_shape, a_req) = {
            let t = lhs.borrow();
            (t.data.clone(), t.shape.clone(), t.requires_grad)
        };
        let (b_data, b_shape, b_req) = {
            let t = rhs.borrow();
            (t.data.clone(), t.shape.clone(), t.requires_grad)
        };

        let out_shape = Self::broadcast_shape(&a_shape, &b_shape);
        let a = Self::broadcast_to(&a_data, &a_shape, &out_shape);
        let b = Self::broadcast_to(&b_data, &b_shape, &out_shape);

        let data: Vec<f64> = a.iter().zip(&b).map(|(&a, &b)| op.apply(a, b)).collect();

        let requires_grad = a_req || b_req;
        let out = Self::new(data, &out_shape, requires_grad);

        if requires_grad {
            let mut o = out.borrow_mut();
            o.parents = vec![lhs.clone(), rhs.clone()];
            o.grad_fn = Some(Box::new(BinaryGradFn { op }));
        }
        out
    }

    // Convenience methods for each binary operation
    pub fn add(self_t: &Tensor, other: &Tensor) -> Tensor {
        Self::binary_op(self_t, other, BinaryOp::Add)
    }
    pub fn sub(self_t: &Tensor, other: &Tensor) -> Tensor {
        Self::binary_op(self_t, other, BinaryOp::Sub)
    }
    pub fn elem_mul(self_t: &Tensor, other: &Tensor) -> Tensor {
        Self::binary_op(self_t, other, BinaryOp::Mul)
    }
    pub fn div(self_t: &Tensor, other: &Tensor) -> Tensor {
        Self::binary_op(self_t, other, BinaryOp::Div)
    }
}
