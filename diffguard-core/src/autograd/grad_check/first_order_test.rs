use std::sync::Arc;

use super::check_backward_computation;
use crate::autograd::backprop_mode::is_backprop_required;
use crate::autograd::grad_check::{CheckConfig, ForwardResult, GradCheckError};
use crate::autograd::{BackwardOp, GraphId};
use crate::error::DiffGuardError;
use crate::ops::arithmetic::{add_op, mul_op, mul_scalar_op};
use crate::ops::{apply_unary_kernel, record_op};
use crate::tensor::{from_vec_f64, full_like, ones_like, Tensor};
use crate::types::DType;

/// Identity whose backward narrows the gradient to f32.
#[derive(Debug)]
struct NarrowingIdentityBackward;

impl BackwardOp for NarrowingIdentityBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![Tensor::from_f64_data(
            grad_output.to_f64_vec(),
            grad_output.shape(),
            DType::F32,
        )?])
    }
}

/// Identity whose backward collapses the gradient to its sum.
#[derive(Debug)]
struct SummingIdentityBackward;

impl BackwardOp for SummingIdentityBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        let total: f64 = grad_output.to_f64_vec().iter().sum();
        Ok(vec![Tensor::from_f64_data(vec![total], vec![1], grad_output.dtype())?])
    }
}

fn identity_with(x: &Tensor, op: Arc<dyn BackwardOp>) -> Result<Tensor, DiffGuardError> {
    let out = apply_unary_kernel(x, |v| v)?;
    record_op(&out, &[x], || op);
    Ok(out)
}

fn leaf(data: Vec<f64>, graph: GraphId) -> Tensor {
    let shape = vec![data.len()];
    let t = from_vec_f64(data, shape).unwrap();
    t.require_grad(graph);
    t
}

#[test]
fn test_exact_polynomial_passes_with_zero_tolerance() {
    let config = CheckConfig::default().with_atol(0.0).with_rtol(0.0);
    let x = leaf(vec![1.5, -0.25, 2.0], config.graph_id);
    let grad_outputs = vec![ones_like(&x).unwrap()];
    let eps = vec![full_like(&x, 0.5).unwrap()];
    let func = |xs: &[Tensor]| -> ForwardResult { Ok(vec![mul_op(&xs[0], &xs[0])?]) };

    check_backward_computation(&func, &[x.clone()], &grad_outputs, &eps, &config).unwrap();
    assert!(x.grad(config.graph_id).is_none());
}

#[test]
fn test_shifted_numerical_side_names_the_input() {
    let config = CheckConfig::default().with_atol(1e-3).with_rtol(1e-3);
    let graph = config.graph_id;
    let a = leaf(vec![1.0, 2.0], graph);
    let b = leaf(vec![3.0, -1.0], graph);
    let grad_outputs = vec![from_vec_f64(vec![1.0, 1.0], vec![2]).unwrap()];
    let eps = vec![full_like(&a, 1e-3).unwrap(), full_like(&b, 1e-3).unwrap()];
    // The estimator runs without backprop; only then is the output shifted by 0.5 * b.
    let func = move |xs: &[Tensor]| -> ForwardResult {
        let y = mul_op(&xs[0], &xs[1])?;
        if is_backprop_required(graph) {
            Ok(vec![y])
        } else {
            Ok(vec![add_op(&y, &mul_scalar_op(&xs[1], 0.5)?)?])
        }
    };

    let err = check_backward_computation(&func, &[a, b], &grad_outputs, &eps, &config).unwrap_err();
    assert!(err.is_check_failure());
    let GradCheckError::CheckFailed(report) = err else {
        unreachable!();
    };
    assert!(report.starts_with("Numerical error in backward on inputs (out of 2): 1\n"));
    assert!(report.contains("Error[1]:"));
    assert!(!report.contains("Error[0]:"));
}

#[test]
fn test_inputs_without_grad_are_skipped() {
    let config = CheckConfig::default();
    let graph = config.graph_id;
    let a = leaf(vec![1.0], graph);
    let b = from_vec_f64(vec![3.0], vec![1]).unwrap();
    let grad_outputs = vec![from_vec_f64(vec![1.0], vec![1]).unwrap()];
    let eps = vec![full_like(&a, 1e-3).unwrap(), full_like(&b, 1e-3).unwrap()];
    // Numerical gradient of `b` is off by 10, but `b` has no analytic gradient.
    let func = move |xs: &[Tensor]| -> ForwardResult {
        let y = mul_op(&xs[0], &xs[1])?;
        if is_backprop_required(graph) {
            Ok(vec![y])
        } else {
            Ok(vec![add_op(&y, &mul_scalar_op(&xs[1], 10.0)?)?])
        }
    };

    check_backward_computation(&func, &[a, b], &grad_outputs, &eps, &config).unwrap();
}

#[test]
fn test_seed_count_mismatch_is_precondition() {
    let config = CheckConfig::default();
    let x = leaf(vec![1.0], config.graph_id);
    let eps = vec![full_like(&x, 1e-3).unwrap()];
    let func = |xs: &[Tensor]| -> ForwardResult { Ok(vec![mul_op(&xs[0], &xs[0])?]) };

    let err = check_backward_computation(&func, &[x], &[], &eps, &config).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn test_gradient_dtype_mismatch_is_check_failure() {
    let config = CheckConfig::default();
    let x = leaf(vec![1.0, 2.0], config.graph_id);
    let grad_outputs = vec![ones_like(&x).unwrap()];
    let eps = vec![full_like(&x, 1e-3).unwrap()];
    let func = |xs: &[Tensor]| -> ForwardResult {
        Ok(vec![identity_with(&xs[0], Arc::new(NarrowingIdentityBackward))?])
    };

    let err = check_backward_computation(&func, &[x], &grad_outputs, &eps, &config).unwrap_err();
    assert!(err.is_check_failure());
    assert_eq!(
        err,
        GradCheckError::CheckFailed(
            "Dtype of input gradient 0 of 1 float32 does not match the corresponding input dtype float64."
                .to_string()
        )
    );
}

#[test]
fn test_gradient_shape_mismatch_is_check_failure() {
    let config = CheckConfig::default();
    let x = leaf(vec![1.0, 2.0], config.graph_id);
    let grad_outputs = vec![ones_like(&x).unwrap()];
    let eps = vec![full_like(&x, 1e-3).unwrap()];
    let func = |xs: &[Tensor]| -> ForwardResult {
        Ok(vec![identity_with(&xs[0], Arc::new(SummingIdentityBackward))?])
    };

    let err = check_backward_computation(&func, &[x], &grad_outputs, &eps, &config).unwrap_err();
    assert!(err.is_check_failure());
    assert_eq!(
        err,
        GradCheckError::CheckFailed(
            "Shape of input gradient 0 of 1 [1] does not match the corresponding input shape [2]."
                .to_string()
        )
    );
}
