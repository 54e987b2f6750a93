use std::fmt::Debug;
use std::sync::Arc;

use crate::autograd::graph::GraphNode;
use crate::autograd::GraphId;
use crate::buffer::Buffer;
use crate::error::DiffGuardError;
use crate::tensor::Tensor;
use crate::tensor_data::{GraphSlot, TensorData};
use crate::types::DType;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` stores an implementation of this trait
/// in the output's graph node(s); the backward engine calls it to propagate gradients
/// according to the chain rule.
///
/// Implementations compute input gradients with the differentiable ops in [`crate::ops`]
/// rather than on raw buffers. That is what lets a gradient be differentiated again when
/// double backprop is enabled: the engine decides whether those ops record graph history
/// by running `backward` under a force-backprop or a no-backprop scope.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes dL/dInput_i for each input, given dL/dOutput.
    ///
    /// The returned `Vec` must have one tensor per op input, in forward-call order, each
    /// with the shape and dtype of the corresponding input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError>;
}

/// A forward-time snapshot of a tensor needed later by a backward rule.
///
/// Holds the shared buffer and the graph nodes, never the body itself. During backward
/// [`SavedTensor::restore`] builds a fresh body with the same data and graph
/// attachments, so the restored tensor is differentiable on the same graphs as the
/// original was.
#[derive(Debug, Clone)]
pub struct SavedTensor {
    buffer: Arc<Buffer>,
    shape: Vec<usize>,
    nodes: Vec<(GraphId, Arc<GraphNode>)>,
}

impl SavedTensor {
    pub fn save(tensor: &Tensor) -> SavedTensor {
        let guard = tensor.read_data();
        SavedTensor {
            buffer: Arc::clone(&guard.buffer),
            shape: guard.shape.clone(),
            nodes: guard
                .slots
                .iter()
                .map(|slot| (slot.graph_id, Arc::clone(&slot.node)))
                .collect(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    /// Re-materialises the saved tensor as a new body carrying the saved graph nodes.
    pub fn restore(&self) -> Tensor {
        let mut data = TensorData::new_view(Arc::clone(&self.buffer), self.shape.clone());
        data.slots = self
            .nodes
            .iter()
            .map(|(graph_id, node)| GraphSlot {
                graph_id: *graph_id,
                node: Arc::clone(node),
                grad: None,
            })
            .collect();
        Tensor::from_tensor_data(data)
    }
}
