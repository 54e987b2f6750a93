use crate::autograd::backward::DoubleBackpropOption;
use crate::autograd::GraphId;
use crate::ops::arithmetic::mul_op;
use crate::tensor::Tensor;

use super::error::GradCheckError;
use super::extraction::backward_gradients;
use super::isolation::disconnect_inputs;
use super::ForwardResult;

/// Verifies that the double-backprop option controls whether gradients stay connected
/// to `graph_id`.
///
/// Every output of `func` is squared first, so gradients depend on the forward values
/// even when `func` is linear. With the option disabled no gradient may require grad on
/// the graph; with it enabled every gradient must. All violations of both runs are
/// reported together.
pub(crate) fn check_double_backprop_option<F>(
    func: &F,
    inputs: &[Tensor],
    graph_id: GraphId,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> ForwardResult,
{
    let nonlinear_func = |func_inputs: &[Tensor]| -> ForwardResult {
        func(func_inputs)?
            .iter()
            .map(|output| Ok(mul_op(output, output)?))
            .collect()
    };

    let mut failures: Vec<String> = Vec::new();

    {
        let inputs_disconnected = disconnect_inputs(inputs);
        let grads = backward_gradients(
            &nonlinear_func,
            &inputs_disconnected,
            None,
            graph_id,
            DoubleBackpropOption::Disable,
        )?;
        for (i, grad) in grads.iter().enumerate() {
            if grad.as_ref().is_some_and(|g| g.is_grad_required(graph_id)) {
                failures.push(format!(
                    "Gradient {} / {} is connected to the graph '{}' even when double-backprop is disabled.",
                    i,
                    grads.len(),
                    graph_id
                ));
            }
        }
    }

    {
        let inputs_disconnected = disconnect_inputs(inputs);
        let grads = backward_gradients(
            &nonlinear_func,
            &inputs_disconnected,
            None,
            graph_id,
            DoubleBackpropOption::Enable,
        )?;
        for (i, grad) in grads.iter().enumerate() {
            if grad.as_ref().is_some_and(|g| !g.is_grad_required(graph_id)) {
                failures.push(format!(
                    "Gradient {} / {} is not connected to the graph '{}' even when double-backprop is enabled.",
                    i,
                    grads.len(),
                    graph_id
                ));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(GradCheckError::CheckFailed(failures.join("\n")))
    }
}

#[cfg(test)]
#[path = "double_backprop_test.rs"]
mod tests;
