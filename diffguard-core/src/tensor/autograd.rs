// src/tensor/autograd.rs

use std::sync::Arc;

use crate::autograd::backward::{backward, DoubleBackpropOption};
use crate::autograd::graph::GraphNode;
use crate::autograd::GraphId;
use crate::error::DiffGuardError;
use crate::tensor::Tensor;
use crate::tensor_data::{GraphSlot, TensorData};

impl Tensor {
    /// Checks if the tensor requires gradient computation on `graph_id`.
    pub fn is_grad_required(&self, graph_id: GraphId) -> bool {
        self.read_data().slot(graph_id).is_some()
    }

    /// Graph ids this tensor is attached to, in attachment order.
    pub fn graph_ids(&self) -> Vec<GraphId> {
        self.read_data().graph_ids()
    }

    /// Marks the tensor as requiring grad on `graph_id` by attaching a leaf node.
    /// Does nothing if the tensor is already attached to that graph.
    pub fn require_grad(&self, graph_id: GraphId) -> &Self {
        let mut guard = self.write_data();
        if guard.slot(graph_id).is_none() {
            let node = GraphNode::new_leaf(
                graph_id,
                Arc::downgrade(&self.data),
                guard.shape.clone(),
                guard.dtype,
            );
            guard.slots.push(GraphSlot {
                graph_id,
                node: Arc::new(node),
                grad: None,
            });
        }
        self
    }

    /// True unless the tensor was produced by an op recorded on `graph_id`.
    pub fn is_leaf(&self, graph_id: GraphId) -> bool {
        self.read_data()
            .slot(graph_id)
            .map_or(true, |slot| slot.node.is_leaf())
    }

    /// Returns a clone of the gradient handle stored for `graph_id`, if any.
    pub fn grad(&self, graph_id: GraphId) -> Option<Tensor> {
        self.read_data()
            .slot(graph_id)
            .and_then(|slot| slot.grad.clone())
    }

    /// Stores `grad` as this tensor's gradient on `graph_id`.
    ///
    /// # Errors
    /// `GradNotRequired` if the tensor is not attached to the graph; `ShapeMismatch` or
    /// `DataTypeMismatch` if `grad` does not match this tensor.
    pub fn set_grad(&self, grad: Tensor, graph_id: GraphId) -> Result<(), DiffGuardError> {
        let (grad_shape, grad_dtype) = {
            let grad_guard = grad.read_data();
            (grad_guard.shape.clone(), grad_guard.dtype)
        };
        let mut guard = self.write_data();
        if grad_shape != guard.shape {
            return Err(DiffGuardError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: grad_shape,
                operation: "set_grad".to_string(),
            });
        }
        if grad_dtype != guard.dtype {
            return Err(DiffGuardError::DataTypeMismatch {
                expected: guard.dtype,
                actual: grad_dtype,
                operation: "set_grad".to_string(),
            });
        }
        let slot = guard
            .slot_mut(graph_id)
            .ok_or_else(|| DiffGuardError::GradNotRequired {
                graph_id,
                operation: "set_grad".to_string(),
            })?;
        slot.grad = Some(grad);
        Ok(())
    }

    /// Writes the gradient slot for `graph_id` without comparing layouts.
    pub(crate) fn store_grad(&self, grad: Tensor, graph_id: GraphId) -> Result<(), DiffGuardError> {
        let mut guard = self.write_data();
        let slot = guard
            .slot_mut(graph_id)
            .ok_or_else(|| DiffGuardError::GradNotRequired {
                graph_id,
                operation: "store_grad".to_string(),
            })?;
        slot.grad = Some(grad);
        Ok(())
    }

    /// Resets the gradient for `graph_id` to None.
    pub fn clear_grad(&self, graph_id: GraphId) {
        if let Some(slot) = self.write_data().slot_mut(graph_id) {
            slot.grad = None;
        }
    }

    /// New body over the same buffer with no graph attachment at all.
    pub fn as_grad_stopped(&self) -> Tensor {
        let (buffer, shape) = {
            let guard = self.read_data();
            (Arc::clone(&guard.buffer), guard.shape.clone())
        };
        Tensor::from_tensor_data(TensorData::new_view(buffer, shape))
    }

    /// New body over the same buffer carrying the same graph nodes, without gradients.
    ///
    /// Differentiating through the view reaches the same graph as the original; the
    /// bodies are distinct, so storing the view somewhere never aliases the original.
    pub fn shallow_view(&self) -> Tensor {
        let data = {
            let guard = self.read_data();
            let mut data = TensorData::new_view(Arc::clone(&guard.buffer), guard.shape.clone());
            data.slots = guard
                .slots
                .iter()
                .map(|slot| GraphSlot {
                    graph_id: slot.graph_id,
                    node: Arc::clone(&slot.node),
                    grad: None,
                })
                .collect();
            data
        };
        Tensor::from_tensor_data(data)
    }

    /// Runs the backward pass from this tensor on `graph_id`.
    pub fn backward(
        &self,
        graph_id: GraphId,
        double_backprop: DoubleBackpropOption,
    ) -> Result<(), DiffGuardError> {
        backward(&[self], graph_id, double_backprop)
    }

    pub(crate) fn node(&self, graph_id: GraphId) -> Option<Arc<GraphNode>> {
        self.read_data()
            .slot(graph_id)
            .map(|slot| Arc::clone(&slot.node))
    }

    pub(crate) fn attach_node(&self, node: GraphNode) {
        let graph_id = node.graph_id;
        let mut guard = self.write_data();
        debug_assert!(guard.slot(graph_id).is_none(), "node already attached for graph");
        guard.slots.push(GraphSlot {
            graph_id,
            node: Arc::new(node),
            grad: None,
        });
    }
}

#[cfg(test)]
#[path = "autograd_test.rs"]
mod tests;
