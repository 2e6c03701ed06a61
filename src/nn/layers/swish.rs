use crate::nn::Module;
use crate::ops::Beta;
use crate::tensor::Tensor;
use crate::tensor::TensorOps;

/// Swish activation layer: x·σ(β·x)
///
/// β shapes the sigmoid gate and defaults to 1.0 (the SiLU special case).
/// It is a fixed hyperparameter, not a learnable parameter, so the layer
/// carries it as a plain number and reports no parameters.
pub struct Swish {
    beta: f64,
}

impl Swish {
    pub fn new(beta: f64) -> Self {
        Swish { beta }
    }

    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Default for Swish {
    fn default() -> Self {
        Swish::new(1.0)
    }
}

impl Module for Swish {
    fn forward(&self, x: &Tensor) -> Tensor {
        x.swish(Beta::Scalar(self.beta))
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![] // No learnable params
    }
}
