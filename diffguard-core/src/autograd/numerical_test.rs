use approx::assert_relative_eq;

use super::numerical_gradient;
use crate::autograd::backprop_mode::is_backprop_required;
use crate::autograd::GraphId;
use crate::error::DiffGuardError;
use crate::ops::arithmetic::{mul_op, mul_scalar_op};
use crate::ops::math_elem::exp_op;
use crate::tensor::{from_vec_f64, full_like, ones_like, Tensor};

fn square(xs: &[Tensor]) -> Result<Vec<Tensor>, DiffGuardError> {
    Ok(vec![mul_op(&xs[0], &xs[0])?])
}

#[test]
fn test_linear_function_gradient() {
    let x = from_vec_f64(vec![1.0, -2.0, 0.5], vec![3]).unwrap();
    let seed = from_vec_f64(vec![1.0, 2.0, -1.0], vec![3]).unwrap();
    let eps = full_like(&x, 1e-3).unwrap();
    let func = |xs: &[Tensor]| -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![mul_scalar_op(&xs[0], 3.0)?])
    };

    let grads = numerical_gradient(&func, &[x], &[seed], &[eps]).unwrap();
    assert_eq!(grads.len(), 1);
    let g = grads[0].get_f64_data().unwrap();
    assert_relative_eq!(g[0], 3.0, epsilon = 1e-9);
    assert_relative_eq!(g[1], 6.0, epsilon = 1e-9);
    assert_relative_eq!(g[2], -3.0, epsilon = 1e-9);
}

#[test]
fn test_square_is_exact_on_dyadic_values() {
    let x = from_vec_f64(vec![1.5, -0.25, 2.0], vec![3]).unwrap();
    let seed = ones_like(&x).unwrap();
    let eps = full_like(&x, 0.5).unwrap();

    let grads = numerical_gradient(&square, &[x], &[seed], &[eps]).unwrap();
    assert_eq!(grads[0].get_f64_data().unwrap(), vec![3.0, -0.5, 4.0]);
}

#[test]
fn test_smooth_function_matches_derivative() {
    let x = from_vec_f64(vec![0.0, 0.7], vec![2]).unwrap();
    let seed = ones_like(&x).unwrap();
    let eps = full_like(&x, 1e-4).unwrap();
    let func = |xs: &[Tensor]| -> Result<Vec<Tensor>, DiffGuardError> { Ok(vec![exp_op(&xs[0])?]) };

    let grads = numerical_gradient(&func, &[x], &[seed], &[eps]).unwrap();
    let g = grads[0].get_f64_data().unwrap();
    assert_relative_eq!(g[0], 1.0, epsilon = 1e-7);
    assert_relative_eq!(g[1], 0.7f64.exp(), epsilon = 1e-7);
}

#[test]
fn test_two_inputs_two_outputs() {
    // outputs: (a * b, 2a); seeds (1, 10)
    let a = from_vec_f64(vec![2.0], vec![1]).unwrap();
    let b = from_vec_f64(vec![-3.0], vec![1]).unwrap();
    let seeds = vec![
        from_vec_f64(vec![1.0], vec![1]).unwrap(),
        from_vec_f64(vec![10.0], vec![1]).unwrap(),
    ];
    let eps = vec![full_like(&a, 0.25).unwrap(), full_like(&b, 0.25).unwrap()];
    let func = |xs: &[Tensor]| -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![mul_op(&xs[0], &xs[1])?, mul_scalar_op(&xs[0], 2.0)?])
    };

    let grads = numerical_gradient(&func, &[a, b], &seeds, &eps).unwrap();
    assert_eq!(grads[0].get_f64_data().unwrap(), vec![-3.0 + 20.0]);
    assert_eq!(grads[1].get_f64_data().unwrap(), vec![2.0]);
}

#[test]
fn test_runs_without_backprop_and_leaves_inputs_untouched() {
    let graph = GraphId::fresh();
    let x = from_vec_f64(vec![1.0], vec![1]).unwrap();
    x.require_grad(graph);
    let seed = ones_like(&x).unwrap();
    let eps = full_like(&x, 0.5).unwrap();
    let func = move |xs: &[Tensor]| -> Result<Vec<Tensor>, DiffGuardError> {
        assert!(!is_backprop_required(graph));
        assert!(xs[0].graph_ids().is_empty());
        square(xs)
    };

    numerical_gradient(&func, &[x.clone()], &[seed], &[eps]).unwrap();
    assert!(x.is_leaf(graph));
    assert!(x.grad(graph).is_none());
    assert!(is_backprop_required(graph));
}

#[test]
fn test_eps_count_mismatch() {
    let x = from_vec_f64(vec![1.0], vec![1]).unwrap();
    let seed = ones_like(&x).unwrap();
    let result = numerical_gradient(&square, &[x], &[seed], &[]);
    assert!(matches!(result, Err(DiffGuardError::SizeMismatch { .. })));
}

#[test]
fn test_eps_shape_mismatch() {
    let x = from_vec_f64(vec![1.0, 2.0], vec![2]).unwrap();
    let seed = ones_like(&x).unwrap();
    let eps = from_vec_f64(vec![0.1], vec![1]).unwrap();
    let result = numerical_gradient(&square, &[x], &[seed], &[eps]);
    assert!(matches!(result, Err(DiffGuardError::ShapeMismatch { .. })));
}

#[test]
fn test_output_seed_count_mismatch() {
    let x = from_vec_f64(vec![1.0], vec![1]).unwrap();
    let seeds = vec![ones_like(&x).unwrap(), ones_like(&x).unwrap()];
    let eps = full_like(&x, 0.5).unwrap();
    let result = numerical_gradient(&square, &[x], &seeds, &[eps]);
    assert!(matches!(result, Err(DiffGuardError::SizeMismatch { .. })));
}
