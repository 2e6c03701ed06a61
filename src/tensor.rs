use crate::autograd::GradFn;
use crate::error::{Result, SwishError};
use crate::ops::Beta;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable tensor.
///
/// `Rc<RefCell<RawTensor>>` lets several graph nodes hold the same parent
/// while backward still mutates it to accumulate gradients.
///
/// **Note**: This is single-threaded only. Each forward/backward pair owns its
/// own saved state, so independent invocations never share anything mutable.
pub type Tensor = Rc<RefCell<RawTensor>>;

/// Upper bound on tensor element count, to catch runaway shapes early.
const MAX_ELEMENTS: usize = 100_000_000;

// ===== RAW TENSOR STRUCTURE =====

/// The tensor payload behind the public [`Tensor`] alias.
///
/// `data` is a flat row-major `Vec<f64>` described by `shape`; `grad` holds
/// the accumulated gradient once backward has run. `grad_fn` and `parents`
/// are the execution record: how this value was computed and from what.
///
/// Data is double precision throughout: the gradient-correctness contract is
/// checked against central finite differences, which needs f64 headroom.
pub struct RawTensor {
    pub data: Vec<f64>,
    pub shape: Vec<usize>,
    pub grad: Option<Vec<f64>>,
    pub requires_grad: bool,
    pub grad_fn: Option<Box<dyn GradFn>>,
    pub parents: Vec<Tensor>,
}

impl Clone for RawTensor {
    fn clone(&self) -> Self {
        RawTensor {
            data: self.data.clone(),
            shape: self.shape.clone(),
            grad: self.grad.clone(),
            requires_grad: self.requires_grad,
            grad_fn: self.grad_fn.as_ref().map(|gf| gf.clone_box()),
            parents: self.parents.clone(),
        }
    }
}

impl std::fmt::Debug for RawTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.is_some())
            .finish()
    }
}

// ===== TENSOR CONSTRUCTORS =====
impl RawTensor {
    /// Create a new tensor, validating data length against the shape.
    ///
    /// # Errors
    /// Returns `ShapeDataMismatch` if `data.len()` differs from the product of
    /// the shape dimensions, and `InvalidParameter` if the element count
    /// exceeds the allocation cap.
    pub fn try_new(data: Vec<f64>, shape: &[usize], requires_grad: bool) -> Result<Tensor> {
        let elements: usize = shape.iter().product();
        if elements > MAX_ELEMENTS {
            return Err(SwishError::InvalidParameter(format!(
                "tensor with {elements} elements exceeds the {MAX_ELEMENTS} element cap"
            )));
        }
        if data.len() != elements {
            return Err(SwishError::ShapeDataMismatch {
                shape: shape.to_vec(),
                elements,
                len: data.len(),
            });
        }
        let raw = RawTensor {
            data,
            shape: shape.to_vec(),
            grad: None,
            requires_grad,
            grad_fn: None,
            parents: vec![],
        };
        Ok(Rc::new(RefCell::new(raw)))
    }

    /// Create a new tensor from data and shape
    ///
    /// # Panics
    /// Panics if data.len() != shape.product()
    pub fn new(data: Vec<f64>, shape: &[usize], requires_grad: bool) -> Tensor {
        match Self::try_new(data, shape, requires_grad) {
            Ok(t) => t,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize]) -> Tensor {
        Self::constant(0.0, shape)
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize]) -> Tensor {
        Self::constant(1.0, shape)
    }

    /// Create a shape-[1] tensor from a single value.
    ///
    /// This is the normalized form of a plain-number parameter; it broadcasts
    /// against any shape.
    pub fn scalar(value: f64) -> Tensor {
        Self::new(vec![value], &[1], false)
    }

    /// Fill the requested shape by repeatedly calling `sample`.
    fn sampled(shape: &[usize], mut sample: impl FnMut() -> f64) -> Tensor {
        let size = shape.iter().product();
        let data: Vec<f64> = (0..size).map(|_| sample()).collect();
        Self::new(data, shape, false)
    }

    /// Create a tensor with random values uniformly distributed in [0, 1)
    pub fn rand(shape: &[usize]) -> Tensor {
        let mut rng = rand::rng();
        Self::sampled(shape, || rng.random())
    }

    /// Create a tensor with values from standard normal distribution N(0, 1)
    pub fn randn(shape: &[usize]) -> Tensor {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = rand::rng();
        Self::sampled(shape, || normal.sample(&mut rng))
    }
}

// ===== NUMERICAL GRADIENT CHECKING =====

impl RawTensor {
    /// Check gradients numerically using finite differences
    ///
    /// For each input element, the analytical gradient produced by backward
    /// is compared against the central difference (f(x+ε) - f(x-ε)) / (2ε),
    /// which is more accurate than a forward difference. Errors are relative,
    /// falling back to absolute near zero.
    ///
    /// # Arguments
    /// * `tensor` - The input tensor whose gradients to check
    /// * `loss_fn` - Function that computes a scalar loss from the tensor
    /// * `epsilon` - Step size for finite differences
    /// * `tolerance` - Maximum acceptable relative error
    ///
    /// # Returns
    /// (max_error, mean_error, passed)
    ///
    /// # Panics
    /// Panics if `loss_fn` produces a graph that leaves `tensor` without a
    /// gradient.
    pub fn check_gradients<F>(
        tensor: &Tensor,
        loss_fn: F,
        epsilon: f64,
        tolerance: f64,
    ) -> (f64, f64, bool)
    where
        F: Fn(&Tensor) -> Tensor,
    {
        let loss = loss_fn(tensor);
        RawTensor::backward(&loss);
        let analytical = tensor
            .borrow()
            .grad
            .clone()
            .expect("Tensor must have gradient");

        let base = tensor.borrow().data.clone();
        let shape = tensor.borrow().shape.clone();
        let requires_grad = tensor.borrow().requires_grad;

        // Scalar loss value at a perturbed copy of the input.
        let loss_at = |data: Vec<f64>| -> f64 {
            let probe = RawTensor::new(data, &shape, requires_grad);
            loss_fn(&probe).borrow().data[0]
        };

        let mut max_error: f64 = 0.0;
        let mut total_error = 0.0;

        for (i, &analytic) in analytical.iter().enumerate() {
            let mut plus = base.clone();
            plus[i] += epsilon;
            let mut minus = base.clone();
            minus[i] -= epsilon;
            let numeric = (loss_at(plus) - loss_at(minus)) / (2.0 * epsilon);

            let error = (analytic - numeric).abs();
            let relative_error = if numeric.abs() > 1e-6 {
                error / numeric.abs()
            } else {
                error
            };

            if relative_error > tolerance {
                eprintln!(
                    "Gradient mismatch at index {i}: analytical={analytic:.6e}, numerical={numeric:.6e}, error={relative_error:.6e}"
                );
            }
            max_error = max_error.max(relative_error);
            total_error += relative_error;
        }

        let mean_error = total_error / analytical.len() as f64;
        (max_error, mean_error, max_error < tolerance)
    }

    /// Simplified gradient checker with default parameters
    ///
    /// Uses epsilon=1e-5 and tolerance=1e-4, sized for double precision.
    pub fn check_gradients_simple<F>(tensor: &Tensor, loss_fn: F) -> bool
    where
        F: Fn(&Tensor) -> Tensor,
    {
        let (max_err, mean_err, passed) = Self::check_gradients(
            tensor, loss_fn, 1e-5, // epsilon
            1e-4, // tolerance
        );

        if !passed {
            eprintln!("Gradient check FAILED: max_error={max_err:.6e}, mean_error={mean_err:.6e}");
        }

        passed
    }
}

// ===== TRAIT-BASED API =====

/// Public trait for tensor operations
///
/// This provides a more ergonomic API: `tensor.add(&other)` instead of `RawTensor::add(&tensor, &other)`
pub trait TensorOps {
    //Binary ops
    fn add(&self, other: &Tensor) -> Tensor;
    fn sub(&self, other: &Tensor) -> Tensor;
    fn elem_mul(&self, other: &Tensor) -> Tensor;
    fn div(&self, other: &Tensor) -> Tensor;

    // Unary ops
    fn neg(&self) -> Tensor;
    fn exp(&self) -> Tensor;
    fn sigmoid(&self) -> Tensor;

    // Activation
    fn swish(&self, beta: Beta) -> Tensor;

    //Reduce ops
    fn sum(&self) -> Tensor;
    fn mean(&self) -> Tensor;

    //Gradient ops
    fn backward(&self);
    fn grad(&self) -> Option<Vec<f64>>;
}

impl TensorOps for Tensor {
    fn add(&self, other: &Tensor) -> Tensor {
        RawTensor::add(self, other)
    }
    fn sub(&self, other: &Tensor) -> Tensor {
        RawTensor::sub(self, other)
    }
    fn elem_mul(&self, other: &Tensor) -> Tensor {
        RawTensor::elem_mul(self, other)
    }
    fn div(&self, other: &Tensor) -> Tensor {
        RawTensor::div(self, other)
    }

    fn neg(&self) -> Tensor {
        RawTensor::neg(self)
    }
    fn exp(&self) -> Tensor {
        RawTensor::exp(self)
    }
    fn sigmoid(&self) -> Tensor {
        RawTensor::sigmoid(self)
    }

    fn swish(&self, beta: Beta) -> Tensor {
        RawTensor::swish(self, beta)
    }

    fn sum(&self) -> Tensor {
        RawTensor::sum(self)
    }
    fn mean(&self) -> Tensor {
        RawTensor::mean(self)
    }

    fn backward(&self) {
        RawTensor::backward(self)
    }
    fn grad(&self) -> Option<Vec<f64>> {
        self.borrow().grad.clone()
    }
}
