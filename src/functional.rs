//! Forward-only activation math.
//!
//! Plain scalar and slice kernels with no graph participation. The `f64`
//! functions are the single source of truth for the differentiable ops in
//! [`crate::ops`]; the `f32` variants exist for forward-only use where
//! single precision is enough.

/// Logistic sigmoid 1 / (1 + e⁻ˣ).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Single-precision sigmoid.
pub fn sigmoid_f32(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Swish activation x · sigmoid(β·x).
pub fn swish(x: f64, beta: f64) -> f64 {
    x * sigmoid(beta * x)
}

/// Single-precision swish, forward only.
pub fn swish_f32(x: f32, beta: f32) -> f32 {
    x * sigmoid_f32(beta * x)
}

/// Analytic derivative of swish w.r.t. x.
///
/// With s = sigmoid(β·x):
///   d/dx [x·s] = s · (1 + β·x·(1 − s))
pub fn swish_derivative(x: f64, beta: f64) -> f64 {
    let s = sigmoid(beta * x);
    s * (1.0 + beta * x * (1.0 - s))
}

/// Apply swish in place on a single-precision slice.
pub fn swish_in_place(data: &mut [f32], beta: f32) {
    for v in data.iter_mut() {
        *v = swish_f32(*v, beta);
    }
}
