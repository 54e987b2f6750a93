use crate::autograd::backprop_mode::ForceBackpropModeScope;
use crate::autograd::backward::DoubleBackpropOption;
use crate::autograd::numerical::numerical_gradient;
use crate::tensor::Tensor;

use super::error::{GradCheckError, PreconditionError};
use super::extraction::backward_gradients;
use super::report::check_numerical_agreement;
use super::{CheckConfig, ForwardResult};

/// Checks second derivatives by differentiating the first-order gradient computation.
///
/// The derived function maps `inputs ++ grad_outputs` to the first-order input gradients
/// of `func`, computed with double backprop enabled. Its own gradients (seeded with
/// `grad_grad_inputs`) are compared against finite differences over the combined vector,
/// using one `eps` entry per combined element.
///
/// Every input and every first-order seed must already require grad on the graph.
pub(crate) fn check_second_order_computation<F>(
    func: &F,
    inputs: &[Tensor],
    grad_outputs: &[Tensor],
    grad_grad_inputs: &[Tensor],
    eps: &[Tensor],
    config: &CheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> ForwardResult,
{
    let graph_id = config.graph_id;
    let nin = inputs.len();
    let nout = grad_outputs.len();

    if grad_grad_inputs.len() != nin {
        return Err(PreconditionError::GradGradInputCountMismatch {
            inputs: nin,
            grad_grad_inputs: grad_grad_inputs.len(),
        }
        .into());
    }
    if let Some(index) = inputs.iter().position(|t| !t.is_grad_required(graph_id)) {
        return Err(PreconditionError::InputNotDifferentiable {
            index,
            total: nin,
            graph_id,
        }
        .into());
    }
    if let Some(index) = grad_outputs.iter().position(|t| !t.is_grad_required(graph_id)) {
        return Err(PreconditionError::GradOutputNotDifferentiable {
            index,
            total: nout,
            graph_id,
        }
        .into());
    }
    log::debug!(
        "checking double backward computation on graph '{}': {} inputs, {} outputs",
        graph_id,
        nin,
        nout
    );

    let first_order_grad_func = |inputs_and_grad_outputs: &[Tensor]| -> ForwardResult {
        let (inputs, grad_outputs) = inputs_and_grad_outputs.split_at(nin);

        let _force_backprop = ForceBackpropModeScope::new(graph_id);
        for input in inputs {
            input.require_grad(graph_id);
        }

        let grads = backward_gradients(
            func,
            inputs,
            Some(grad_outputs),
            graph_id,
            DoubleBackpropOption::Enable,
        )?;
        if grads.len() != nin {
            return Err(GradCheckError::CheckFailed(format!(
                "Number of first-order input gradients {} does not match the number of inputs {}.",
                grads.len(),
                nin
            )));
        }
        let mut first_order_grads = Vec::with_capacity(nin);
        for (i, grad) in grads.into_iter().enumerate() {
            let Some(grad) = grad else {
                return Err(GradCheckError::CheckFailed(format!(
                    "First-order input gradient {} / {} does not exist.",
                    i, nin
                )));
            };
            if !grad.is_grad_required(graph_id) {
                return Err(GradCheckError::CheckFailed(format!(
                    "First-order input gradient {} / {} is not differentiable w.r.t. the graph '{}'.",
                    i, nin, graph_id
                )));
            }
            first_order_grads.push(grad);
        }
        Ok(first_order_grads)
    };

    let inputs_and_grad_outputs: Vec<Tensor> = inputs.iter().chain(grad_outputs).cloned().collect();

    let numerical_grads =
        numerical_gradient(&first_order_grad_func, &inputs_and_grad_outputs, grad_grad_inputs, eps)?;
    assert_eq!(numerical_grads.len(), nin + nout, "numerical gradient count");

    let backward_grads = backward_gradients(
        &first_order_grad_func,
        &inputs_and_grad_outputs,
        Some(grad_grad_inputs),
        graph_id,
        DoubleBackpropOption::Disable,
    )?;
    assert_eq!(backward_grads.len(), nin + nout, "second-order gradient count");

    let missing: Vec<String> = backward_grads
        .iter()
        .enumerate()
        .filter(|(_, grad)| grad.is_none())
        .map(|(i, _)| {
            format!(
                "Second order gradient w.r.t. the input gradient {} (Total inputs: {}, outputs: {}) is missing on the graph '{}'. \
                 Maybe you need additional nonlinearity in the target function.",
                i, nin, nout, graph_id
            )
        })
        .collect();
    if !missing.is_empty() {
        return Err(GradCheckError::CheckFailed(missing.join("\n")));
    }

    check_numerical_agreement(
        "Numerical error in double backward",
        &backward_grads,
        &numerical_grads,
        eps,
        config,
    )
}

#[cfg(test)]
#[path = "second_order_test.rs"]
mod tests;
