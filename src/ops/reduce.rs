use crate::autograd::GradFn;
use crate::{RawTensor, Tensor};

/// Reduction operations: reduce tensor to scalar
///
/// These operations collapse all dimensions and require special gradient handling
/// since the output shape differs from the input.
#[derive(Clone, Copy)]
pub enum ReduceOp {
    Sum,  // Σ(x) - gradient broadcasts ones
    Mean, // mean(x) - gradient broadcasts 1/n
}

/// Gradient function for scalar reductions.
///
/// Every input element receives the same upstream gradient, scaled by 1/n for
/// Mean, so backward is a broadcast of one value over the saved input shape.
pub struct ReduceGradFn {
    op: ReduceOp,
    input_shape: Vec<usize>,
}

impl GradFn for ReduceGradFn {
    fn backward(&self, out_grad: &RawTensor, _parents: &[Tensor]) -> Vec<Option<Tensor>> {
        let size: usize = self.input_shape.iter().product();
        let per_element = match self.op {
            ReduceOp::Sum => out_grad.data[0],
            ReduceOp::Mean => out_grad.data[0] / (size as f64),
        };
        vec![Some(RawTensor::new(
            vec![per_element; size],
            &self.input_shape,
            false,
        ))]
    }

    fn clone_box(&self) -> Box<dyn GradFn> {
        Box::new(ReduceGradFn {
            op: self.op,
            input_shape: self.input_shape.clone(),
        })
    }
}

// ===== REDUCE OPERATIONS =====

impl RawTensor {
    /// Apply a reduction operation that collapses tensor to scalar
    ///
    /// All reduction ops produce a shape [1] output.
    pub fn reduce_op(input: &Tensor, op: ReduceOp) -> Tensor {
        let (total, count, shape, requires_grad) = {
            let t = input.borrow();
            (
                t.data.iter().sum::<f64>(),
                t.data.len(),
                t.shape.clone(),
                t.requires_grad,
            )
        };

        let value = match op {
            ReduceOp::Sum => total,
            ReduceOp::Mean => total / (count as f64),
        };

        let out = Self::new(vec![value], &[1], requires_grad);

        if requires_grad {
            let mut o = out.borrow_mut();
            o.parents = vec![input.clone()];
            o.grad_fn = Some(Box::new(ReduceGradFn {
                op,
                input_shape: shape,
            }));
        }
        out
    }

    pub fn sum(self_t: &Tensor) -> Tensor {
        Self::reduce_op(self_t, ReduceOp::Sum)
    }
    pub fn mean(self_t: &Tensor) -> Tensor {
        Self::reduce_op(self_t, ReduceOp::Mean)
    }
}
