//! End-to-end tests for the swish activation: the module-style wrapper,
//! the differentiable primitive, and gradient correctness against central
//! finite differences (double precision).

use swish::{Beta, Module, RawTensor, Swish, Tensor, TensorOps};

const BETAS: [f64; 4] = [0.0, 0.5, 1.0, 2.0];

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Standard-normal input with gradient tracking enabled.
fn randn_grad(shape: &[usize]) -> Tensor {
    let t = RawTensor::randn(shape);
    t.borrow_mut().requires_grad = true;
    t
}

/// Reference formula x ⊙ σ(β·x), composed from the engine's own ops.
fn reference_swish(x: &Tensor, beta: f64) -> Tensor {
    let beta_t = RawTensor::scalar(beta);
    x.elem_mul(&beta_t.elem_mul(x).sigmoid())
}

// ===== WRAPPER (nn::Swish) =====

#[test]
fn test_forward() {
    let swish = Swish::new(1.0);
    let x = randn_grad(&[10]);
    let y = swish.forward(&x);
    let expected = reference_swish(&x, 1.0);
    assert_eq!(
        y.borrow().data,
        expected.borrow().data,
        "Swish forward pass is incorrect."
    );
}

#[test]
fn test_backward() {
    let swish = Swish::new(1.0);
    let x = randn_grad(&[10]);
    assert!(
        RawTensor::check_gradients_simple(&x, |t| swish.forward(t).sum()),
        "Swish backward pass is incorrect."
    );
}

#[test]
fn test_forward_beta() {
    for beta in BETAS {
        let swish = Swish::new(beta);
        let x = randn_grad(&[10]);
        let y = swish.forward(&x);
        let expected = reference_swish(&x, beta);
        assert_eq!(
            y.borrow().data,
            expected.borrow().data,
            "Swish forward pass is incorrect for beta={beta}."
        );
    }
}

#[test]
fn test_backward_beta() {
    for beta in BETAS {
        let swish = Swish::new(beta);
        let x = randn_grad(&[10]);
        assert!(
            RawTensor::check_gradients_simple(&x, |t| swish.forward(t).sum()),
            "Swish backward pass is incorrect for beta={beta}."
        );
    }
}

#[test]
fn test_backward_mean_loss() {
    let swish = Swish::default();
    let x = randn_grad(&[10]);
    assert!(
        RawTensor::check_gradients_simple(&x, |t| swish.forward(t).mean()),
        "Swish backward pass is incorrect under a mean loss."
    );
}

#[test]
fn test_forward_shapes() {
    let swish = Swish::new(1.0);
    for shape in [
        vec![10],
        vec![10, 10],
        vec![10, 10, 10],
        vec![10, 20, 30],
    ] {
        let x = RawTensor::rand(&shape);
        let y = swish.forward(&x);
        assert_eq!(
            y.borrow().shape,
            shape,
            "Swish forward pass returns incorrect shape."
        );
    }
}

#[test]
fn test_backward_shapes() {
    let swish = Swish::new(1.0);
    for shape in [vec![10], vec![10, 10], vec![10, 10, 10]] {
        let x = randn_grad(&shape);
        assert!(
            RawTensor::check_gradients_simple(&x, |t| swish.forward(t).sum()),
            "Swish backward pass is incorrect for shape={shape:?}."
        );
    }
}

#[test]
fn test_default_beta_is_one() {
    let swish = Swish::default();
    assert_eq!(swish.beta(), 1.0);

    let x = randn_grad(&[10]);
    let y = swish.forward(&x);
    let expected = reference_swish(&x, 1.0);
    assert_eq!(y.borrow().data, expected.borrow().data);
}

#[test]
fn test_wrapper_has_no_parameters() {
    let mut swish = Swish::new(2.0);
    assert!(swish.parameters().is_empty());
    swish.zero_grad(); // no-op: nothing to clear
}

// ===== PRIMITIVE (RawTensor::swish) =====

#[test]
fn test_primitive_forward() {
    let x = randn_grad(&[10]);
    let beta = RawTensor::scalar(1.0);
    let y = x.swish(Beta::Tensor(beta));
    let expected = reference_swish(&x, 1.0);
    assert_eq!(
        y.borrow().data,
        expected.borrow().data,
        "Swish primitive forward pass is incorrect."
    );
}

#[test]
fn test_primitive_backward() {
    let x = randn_grad(&[10]);
    assert!(
        RawTensor::check_gradients_simple(&x, |t| {
            t.swish(Beta::Tensor(RawTensor::scalar(1.0))).sum()
        }),
        "Swish primitive backward pass is incorrect."
    );
}

#[test]
fn test_primitive_forward_beta() {
    for beta in BETAS {
        let x = randn_grad(&[10]);
        let y = x.swish(Beta::Scalar(beta));
        let expected = reference_swish(&x, beta);
        assert_eq!(
            y.borrow().data,
            expected.borrow().data,
            "Swish primitive forward pass is incorrect for beta={beta}."
        );
    }
}

#[test]
fn test_primitive_backward_beta() {
    for beta in BETAS {
        let x = randn_grad(&[10]);
        assert!(
            RawTensor::check_gradients_simple(&x, |t| t.swish(Beta::Scalar(beta)).sum()),
            "Swish primitive backward pass is incorrect for beta={beta}."
        );
    }
}

#[test]
fn test_primitive_backward_shapes() {
    for shape in [vec![10], vec![10, 10], vec![10, 10, 10]] {
        let x = randn_grad(&shape);
        assert!(
            RawTensor::check_gradients_simple(&x, |t| t.swish(Beta::Scalar(1.0)).sum()),
            "Swish primitive backward pass is incorrect for shape={shape:?}."
        );
    }
}

#[test]
fn test_wrapper_matches_primitive() {
    let x = randn_grad(&[10]);
    let wrapped = Swish::new(0.5).forward(&x);
    let primitive = x.swish(Beta::Scalar(0.5));
    assert_eq!(wrapped.borrow().data, primitive.borrow().data);
}

// ===== SCENARIOS & EDGE CASES =====

#[test]
fn test_known_values() {
    // x = [-1, 0, 1], beta = 1  =>  x * sigmoid(x)
    let x = RawTensor::from_vec(vec![-1.0, 0.0, 1.0], &[3]);
    let y = x.swish(Beta::Scalar(1.0));
    let out = y.borrow();
    assert!(approx_eq(out.data[0], -0.2689, 1e-4));
    assert_eq!(out.data[1], 0.0);
    assert!(approx_eq(out.data[2], 0.7311, 1e-4));
}

#[test]
fn test_zero_beta_halves_the_input_exactly() {
    // sigmoid(0) is exactly 0.5, and scaling by 0.5 is exact in IEEE
    let x = RawTensor::from_vec(vec![2.0], &[1]);
    let y = x.swish(Beta::Scalar(0.0));
    assert_eq!(y.borrow().data, vec![1.0]);

    let x = randn_grad(&[32]);
    let y = x.swish(Beta::Scalar(0.0));
    let expected = x.elem_mul(&RawTensor::constant(0.5, &[32]));
    assert_eq!(y.borrow().data, expected.borrow().data);
}

#[test]
fn test_beta_gradient_is_never_propagated() {
    let x = randn_grad(&[10]);
    let beta = RawTensor::scalar(1.0);
    beta.borrow_mut().requires_grad = true;

    let y = x.swish(Beta::Tensor(beta.clone()));
    y.sum().backward();

    assert!(x.grad().is_some(), "input gradient must be produced");
    assert!(
        beta.grad().is_none(),
        "beta is a fixed hyperparameter; its gradient slot is always empty"
    );
}

#[test]
fn test_zero_dim_beta_broadcasts() {
    let x = RawTensor::from_vec(vec![-1.0, 0.0, 1.0], &[3]);
    let beta = RawTensor::from_vec(vec![1.0], &[]);
    let y = x.swish(Beta::Tensor(beta));
    let expected = reference_swish(&x, 1.0);
    assert_eq!(y.borrow().data, expected.borrow().data);
    assert_eq!(y.borrow().shape, vec![3]);
}

#[test]
fn test_elementwise_beta_tensor() {
    // A beta with the input's own shape gates each element independently
    let x = RawTensor::from_vec(vec![1.0, 1.0, 1.0], &[3]);
    let beta = RawTensor::from_vec(vec![0.0, 1.0, 2.0], &[3]);
    let y = x.swish(Beta::Tensor(beta));
    let out = y.borrow();
    assert_eq!(out.data[0], 0.5);
    assert!(approx_eq(out.data[1], 0.7311, 1e-4));
    assert!(approx_eq(out.data[2], 0.8808, 1e-4));
}

#[test]
fn test_incompatible_beta_shape_panics() {
    let result = std::panic::catch_unwind(|| {
        let x = RawTensor::from_vec(vec![1.0; 6], &[2, 3]);
        let beta = RawTensor::from_vec(vec![1.0; 2], &[2]);
        let _ = x.swish(Beta::Tensor(beta));
    });
    assert!(result.is_err(), "beta [2] cannot broadcast against [2, 3]");
}

#[test]
fn test_fused_matches_sigmoid_identity_composition() {
    // 1 / (1 + e^(-βx)), spelled out with div/add/neg/exp, then gated by x
    let x = randn_grad(&[16]);
    let beta = 1.5;

    let beta_t = RawTensor::scalar(beta);
    let bx = beta_t.elem_mul(&x);
    let ones = RawTensor::ones(&[16]);
    let sig = ones.div(&ones.add(&bx.neg().exp()));
    let composed = x.elem_mul(&sig);

    let fused = x.swish(Beta::Scalar(beta));
    for (a, b) in fused
        .borrow()
        .data
        .iter()
        .zip(composed.borrow().data.iter())
    {
        assert!(approx_eq(*a, *b, 1e-12));
    }
}

#[test]
fn test_forward_does_not_mutate_input() {
    let x = RawTensor::from_vec(vec![-1.0, 2.0, 3.0], &[3]);
    let before = x.borrow().data.clone();
    let _ = x.swish(Beta::Scalar(2.0));
    assert_eq!(x.borrow().data, before);
    assert!(x.borrow().grad.is_none());
}
