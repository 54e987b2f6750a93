use crate::autograd::backward::DoubleBackpropOption;
use crate::autograd::numerical::numerical_gradient;
use crate::tensor::Tensor;

use super::error::GradCheckError;
use super::extraction::backward_gradients;
use super::isolation::disconnect_inputs;
use super::report::check_numerical_agreement;
use super::{CheckConfig, ForwardResult};

/// Compares the gradients of the backward pass with central finite differences.
///
/// The backward pass runs on isolated copies of `inputs` with double backprop disabled;
/// the estimator runs on the originals with the same seeds. Inputs that received no
/// analytic gradient are not compared.
pub(crate) fn check_backward_computation<F>(
    func: &F,
    inputs: &[Tensor],
    grad_outputs: &[Tensor],
    eps: &[Tensor],
    config: &CheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> ForwardResult,
{
    let graph_id = config.graph_id;
    log::debug!("checking backward computation on graph '{}'", graph_id);

    let inputs_disconnected = disconnect_inputs(inputs);
    let backward_grads = backward_gradients(
        func,
        &inputs_disconnected,
        Some(grad_outputs),
        graph_id,
        DoubleBackpropOption::Disable,
    )?;
    if backward_grads.len() != inputs.len() {
        return Err(GradCheckError::CheckFailed(
            "Number of input gradients does not match the input tensors.".to_string(),
        ));
    }
    for (i, (backward_grad, input)) in backward_grads.iter().zip(inputs).enumerate() {
        let Some(backward_grad) = backward_grad else {
            continue;
        };
        if backward_grad.shape() != input.shape() {
            return Err(GradCheckError::CheckFailed(format!(
                "Shape of input gradient {} of {} {:?} does not match the corresponding input shape {:?}.",
                i,
                inputs.len(),
                backward_grad.shape(),
                input.shape()
            )));
        }
        if backward_grad.dtype() != input.dtype() {
            return Err(GradCheckError::CheckFailed(format!(
                "Dtype of input gradient {} of {} {} does not match the corresponding input dtype {}.",
                i,
                inputs.len(),
                backward_grad.dtype(),
                input.dtype()
            )));
        }
    }

    let numerical_grads = numerical_gradient(func, inputs, grad_outputs, eps)?;
    assert_eq!(numerical_grads.len(), inputs.len(), "numerical gradient count");
    for (numerical_grad, input) in numerical_grads.iter().zip(inputs) {
        assert_eq!(numerical_grad.shape(), input.shape(), "numerical gradient shape");
        assert_eq!(numerical_grad.dtype(), input.dtype(), "numerical gradient dtype");
    }

    check_numerical_agreement(
        "Numerical error in backward",
        &backward_grads,
        &numerical_grads,
        eps,
        config,
    )
}

#[cfg(test)]
#[path = "first_order_test.rs"]
mod tests;
