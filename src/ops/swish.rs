use crate::autograd::GradFn;
use crate::functional;
use crate::{RawTensor, Tensor};

/// How the shape parameter β may be supplied to the swish primitive.
///
/// β controls the steepness of the sigmoid gate in x·σ(β·x). Callers hand in
/// either a plain number or a tensor; the variant is normalized to a tensor
/// exactly once, at the primitive's entry.
#[derive(Clone)]
pub enum Beta {
    Scalar(f64),
    Tensor(Tensor),
}

impl From<f64> for Beta {
    fn from(value: f64) -> Self {
        Beta::Scalar(value)
    }
}

impl From<Tensor> for Beta {
    fn from(tensor: Tensor) -> Self {
        Beta::Tensor(tensor)
    }
}

impl Beta {
    /// Normalize to a tensor broadcastable against the activation input.
    ///
    /// A plain number becomes a shape-[1] tensor; a tensor passes through
    /// unchanged and is shape-checked against the input by the op itself.
    fn into_tensor(self) -> Tensor {
        match self {
            Beta::Scalar(value) => RawTensor::scalar(value),
            Beta::Tensor(tensor) => tensor,
        }
    }
}

/// Values retained between forward and backward.
///
/// Holds exactly what the backward pass needs to recompute the sigmoid term:
/// the forward input, β broadcast to the input's shape, and that shape. Owned
/// by the output tensor's `grad_fn` and dropped with it.
#[derive(Clone)]
struct SavedContext {
    input: Vec<f64>,
    beta: Vec<f64>,
    shape: Vec<usize>,
}

/// Gradient function for the swish activation.
///
/// With s = σ(β·x), the forward pass computes x·s and the local derivative is
///   d/dx [x·σ(β·x)] = s · (1 + β·x·(1 − s))
///
/// β is a fixed shape hyperparameter: its gradient slot is always `None`,
/// even when β was supplied as a tensor with `requires_grad`.
pub struct SwishGradFn {
    saved: SavedContext,
}

impl GradFn for SwishGradFn {
    fn backward(&self, out_grad: &RawTensor, _parents: &[Tensor]) -> Vec<Option<Tensor>> {
        // Recompute the sigmoid term from the saved (input, beta) pair and
        // apply the chain rule against the upstream gradient.
        let grad_data: Vec<f64> = out_grad
            .data
            .iter()
            .zip(self.saved.input.iter().zip(&self.saved.beta))
            .map(|(&g, (&x, &b))| g * functional::swish_derivative(x, b))
            .collect();

        vec![
            Some(RawTensor::new(grad_data, &self.saved.shape, false)),
            None, // β slot: non-differentiable
        ]
    }

    fn clone_box(&self) -> Box<dyn GradFn> {
        Box::new(SwishGradFn {
            saved: self.saved.clone(),
        })
    }
}

// ===== SWISH OPERATION =====
impl RawTensor {
    /// Swish activation x·σ(β·x) as a single differentiable op.
    ///
    /// β is normalized once at entry and must broadcast to the input's shape;
    /// the output always has the input's shape. When the input requires
    /// gradients, the op records `(input, β)` so backward can recompute the
    /// sigmoid term. Whether β itself requires gradients is irrelevant: the
    /// output is differentiable w.r.t. the input only.
    ///
    /// # Panics
    /// Panics if β's shape does not broadcast to the input's shape.
    pub fn swish(input: &Tensor, beta: Beta) -> Tensor {
        let beta_t = beta.into_tensor();

        let (data, shape, requires_grad) = {
            let s = input.borrow();
            (s.data.clone(), s.shape.clone(), s.requires_grad)
        };
        let (beta_data, beta_shape) = {
            let b = beta_t.borrow();
            (b.data.clone(), b.shape.clone())
        };

        // β may broadcast up to the input's shape but never enlarge it:
        // the output shape is the input shape, always.
        let bc_shape = Self::broadcast_shape(&beta_shape, &shape);
        assert_eq!(
            bc_shape, shape,
            "beta shape {beta_shape:?} must broadcast to the input shape {shape:?}"
        );
        let beta_bc = Self::broadcast_to(&beta_data, &beta_shape, &shape);

        let result: Vec<f64> = data
            .iter()
            .zip(&beta_bc)
            .map(|(&x, &b)| functional::swish(x, b))
            .collect();

        let out = Self::new(result, &shape, requires_grad);

        if out.borrow().requires_grad {
            let saved = SavedContext {
                input: data,
                beta: beta_bc,
                shape,
            };
            out.borrow_mut().parents = vec![input.clone(), beta_t.clone()];
            out.borrow_mut().grad_fn = Some(Box::new(SwishGradFn { saved }));
        }
        out
    }
}
