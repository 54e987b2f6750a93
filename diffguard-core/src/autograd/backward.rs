use std::collections::HashMap;
use std::sync::Arc;

use crate::autograd::backprop_mode::{ForceBackpropModeScope, NoBackpropModeScope};
use crate::autograd::graph::{topological_order, GraphNode, NodeId};
use crate::autograd::GraphId;
use crate::error::DiffGuardError;
use crate::ops::arithmetic::add_op;
use crate::tensor::{ones_like, Tensor};

/// Whether gradients produced by a backward pass are themselves tracked on the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoubleBackpropOption {
    #[default]
    Disable,
    Enable,
}

/// Back-propagates from `outputs` on `graph_id`, writing gradients into the slots of the
/// leaf tensors reachable from them.
///
/// Each output's seed is its gradient slot on `graph_id` if one was set, ones otherwise.
/// Gradients reaching the same node are summed. Leaf gradients are accumulated into
/// whatever the leaf's slot already holds.
///
/// # Errors
/// `GradNotRequired` if an output is not attached to `graph_id`; `BackwardError` if a
/// backward rule returns the wrong number of gradients, or a gradient whose shape does not
/// match an intermediate input; any error raised by the backward rules themselves.
///
/// A gradient reaching a leaf is not checked against the leaf's shape or dtype.
pub fn backward(
    outputs: &[&Tensor],
    graph_id: GraphId,
    double_backprop: DoubleBackpropOption,
) -> Result<(), DiffGuardError> {
    let mut roots: Vec<Arc<GraphNode>> = Vec::with_capacity(outputs.len());
    let mut grads: HashMap<NodeId, Tensor> = HashMap::new();

    // Backward rules record graph history on `graph_id` only when double backprop is on.
    let _no_backprop = (double_backprop == DoubleBackpropOption::Disable)
        .then(|| NoBackpropModeScope::for_graphs(&[graph_id]));
    let _force_backprop = (double_backprop == DoubleBackpropOption::Enable)
        .then(|| ForceBackpropModeScope::new(graph_id));

    for output in outputs {
        let node = output
            .node(graph_id)
            .ok_or_else(|| DiffGuardError::GradNotRequired {
                graph_id,
                operation: "backward".to_string(),
            })?;
        let seed = match output.grad(graph_id) {
            Some(grad) => grad,
            None => ones_like(output)?,
        };
        if node.is_leaf() {
            // The seed is re-stored below as the leaf's own gradient.
            output.clear_grad(graph_id);
        }
        accumulate(&mut grads, GraphNode::id(&node), seed)?;
        roots.push(node);
    }

    let order = topological_order(&roots);
    log::debug!(
        "backward on graph '{}': {} outputs, {} reachable nodes, double backprop {:?}",
        graph_id,
        outputs.len(),
        order.len(),
        double_backprop
    );

    for node in &order {
        let Some(grad) = grads.remove(&GraphNode::id(node)) else {
            continue;
        };
        match &node.creator {
            Some(creator) => {
                let input_grads = creator.op.backward(&grad)?;
                if input_grads.len() != creator.inputs.len() {
                    return Err(DiffGuardError::BackwardError(format!(
                        "{:?} returned {} gradients, but expected {}",
                        creator.op,
                        input_grads.len(),
                        creator.inputs.len()
                    )));
                }
                for (input, input_grad) in creator.inputs.iter().zip(input_grads) {
                    let Some(input) = input else {
                        continue;
                    };
                    // Leaf gradients are stored as produced; callers compare them with
                    // their inputs.
                    if !input.is_leaf() && input_grad.shape() != input.shape {
                        return Err(DiffGuardError::BackwardError(format!(
                            "{:?} produced a gradient of shape {:?} for an input of shape {:?}",
                            creator.op,
                            input_grad.shape(),
                            input.shape
                        )));
                    }
                    accumulate(&mut grads, GraphNode::id(input), input_grad)?;
                }
            }
            None => store_leaf_grad(node, grad)?,
        }
    }
    Ok(())
}

fn accumulate(
    grads: &mut HashMap<NodeId, Tensor>,
    node_id: NodeId,
    grad: Tensor,
) -> Result<(), DiffGuardError> {
    let summed = match grads.remove(&node_id) {
        Some(existing) => add_op(&existing, &grad)?,
        None => grad,
    };
    grads.insert(node_id, summed);
    Ok(())
}

/// Accumulates `grad` into the slot of the leaf's body, if the body is still alive.
fn store_leaf_grad(node: &GraphNode, grad: Tensor) -> Result<(), DiffGuardError> {
    let Some(body) = node.body.upgrade() else {
        log::trace!("leaf on graph '{}' was dropped, discarding its gradient", node.graph_id);
        return Ok(());
    };
    let leaf = Tensor { data: body };
    let total = match leaf.grad(node.graph_id) {
        Some(existing) => add_op(&existing, &grad)?,
        // A view, so the stored gradient never aliases a seed or a caller's tensor.
        None => grad.shallow_view(),
    };
    leaf.store_grad(total, node.graph_id)
}

#[cfg(test)]
#[path = "backward_test.rs"]
mod tests;
