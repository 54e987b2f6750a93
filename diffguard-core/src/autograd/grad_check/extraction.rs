use crate::autograd::backward::{backward, DoubleBackpropOption};
use crate::autograd::GraphId;
use crate::tensor::Tensor;

use super::error::{GradCheckError, PreconditionError};

/// Fails unless every input is a leaf (or unattached) on `graph_id`.
pub(crate) fn validate_leaf_inputs(inputs: &[Tensor], graph_id: GraphId) -> Result<(), PreconditionError> {
    match inputs.iter().position(|input| !input.is_leaf(graph_id)) {
        Some(index) => Err(PreconditionError::InputNotLeaf { index, graph_id }),
        None => Ok(()),
    }
}

/// Runs `func` on `inputs` and back-propagates from its outputs, returning the gradient
/// each input received on `graph_id`.
///
/// Outputs that require grad get the matching entry of `grad_outputs` as their seed
/// (ones when no seeds are given). Gradients already present on the inputs are cleared
/// after the forward run, in case `func` ran a backward pass of its own.
///
/// # Returns
/// One entry per input: `None` if the input does not require grad on `graph_id` or no
/// gradient reached it.
///
/// # Errors
/// * `PreconditionError::InputNotLeaf` if an input already has history on `graph_id`;
///   `func` is not run in that case.
/// * `PreconditionError::IdenticalInputOutput` if `func` returns an input body that
///   requires grad.
/// * `PreconditionError::GradOutputCountMismatch` if seeds are given and their count
///   differs from the number of outputs.
/// * `GradCheckError::Tensor` for failures of `func` or of the backward engine.
pub fn backward_gradients<F>(
    func: &F,
    inputs: &[Tensor],
    grad_outputs: Option<&[Tensor]>,
    graph_id: GraphId,
    double_backprop: DoubleBackpropOption,
) -> Result<Vec<Option<Tensor>>, GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Vec<Tensor>, GradCheckError>,
{
    validate_leaf_inputs(inputs, graph_id)?;

    let outputs = func(inputs)?;

    for (i, input) in inputs.iter().enumerate() {
        if !input.is_grad_required(graph_id) {
            continue;
        }
        if let Some(j) = outputs.iter().position(|output| output.shares_body_with(input)) {
            return Err(PreconditionError::IdenticalInputOutput { input: i, output: j }.into());
        }
    }

    if let Some(grad_outputs) = grad_outputs {
        if outputs.len() != grad_outputs.len() {
            return Err(PreconditionError::GradOutputCountMismatch {
                outputs: outputs.len(),
                grad_outputs: grad_outputs.len(),
            }
            .into());
        }
        for (output, grad_output) in outputs.iter().zip(grad_outputs) {
            if output.is_grad_required(graph_id) {
                output.set_grad(grad_output.clone(), graph_id)?;
            }
        }
    }

    for input in inputs {
        input.clear_grad(graph_id);
    }

    let outputs_requiring_grad: Vec<&Tensor> = outputs
        .iter()
        .filter(|output| output.is_grad_required(graph_id))
        .collect();
    log::debug!(
        "extracting gradients on graph '{}': {} inputs, {}/{} outputs require grad",
        graph_id,
        inputs.len(),
        outputs_requiring_grad.len(),
        outputs.len()
    );
    if !outputs_requiring_grad.is_empty() {
        backward(&outputs_requiring_grad, graph_id, double_backprop)?;
    }

    Ok(inputs.iter().map(|input| input.grad(graph_id)).collect())
}

#[cfg(test)]
#[path = "extraction_test.rs"]
mod tests;
