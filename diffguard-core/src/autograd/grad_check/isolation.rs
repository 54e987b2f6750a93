use crate::tensor::Tensor;

/// Returns views of `inputs` that require grad on exactly the graphs the originals are
/// attached to, but as fresh leaves with no history.
///
/// Anything a check does to the views (forward runs, backward passes, gradient slots)
/// stays off the caller's tensors, so graph nodes created inside a check can only be
/// owned by bodies created inside it.
pub fn disconnect_inputs(inputs: &[Tensor]) -> Vec<Tensor> {
    inputs
        .iter()
        .map(|input| {
            let view = input.as_grad_stopped();
            for graph_id in input.graph_ids() {
                view.require_grad(graph_id);
            }
            view
        })
        .collect()
}

#[cfg(test)]
#[path = "isolation_test.rs"]
mod tests;
