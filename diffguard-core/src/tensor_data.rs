// src/tensor_data.rs
use std::fmt::Debug;
use std::sync::Arc;

use crate::autograd::graph::GraphNode;
use crate::autograd::GraphId;
use crate::buffer::Buffer;
use crate::error::DiffGuardError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Per-graph autograd state of a tensor body.
///
/// A body holds at most one slot per graph id. Having a slot is what "requires grad on
/// that graph" means; the node says whether the body is a leaf or was produced by an op.
#[derive(Debug)]
pub(crate) struct GraphSlot {
    pub(crate) graph_id: GraphId,
    pub(crate) node: Arc<GraphNode>,
    /// Accumulated gradient for this graph, written by the backward engine or by seeding.
    pub(crate) grad: Option<Tensor>,
}

/// Internal storage and metadata for a Tensor.
///
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct. Two bodies may
/// share one `Arc<Buffer>` ("views") while keeping independent graph attachments.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying data buffer, shared between views.
    pub(crate) buffer: Arc<Buffer>,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,
    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// Graph attachments, keyed by graph id. Usually empty or a single entry.
    pub(crate) slots: Vec<GraphSlot>,
}

impl TensorData {
    /// Creates a new `TensorData` from a buffer and a shape.
    ///
    /// # Errors
    /// Returns `DiffGuardError::TensorCreationError` if the buffer length does not match
    /// the number of elements implied by `shape`.
    pub fn new(buffer: Buffer, shape: Vec<usize>) -> Result<Self, DiffGuardError> {
        let numel: usize = shape.iter().product();
        let data_len = buffer.len();
        if data_len != numel {
            return Err(DiffGuardError::TensorCreationError { data_len, shape });
        }
        Ok(TensorData {
            dtype: buffer.dtype(),
            buffer: Arc::new(buffer),
            shape,
            slots: Vec::new(),
        })
    }

    /// Creates a body sharing `buffer`, with no graph attachment.
    pub(crate) fn new_view(buffer: Arc<Buffer>, shape: Vec<usize>) -> Self {
        TensorData {
            dtype: buffer.dtype(),
            buffer,
            shape,
            slots: Vec::new(),
        }
    }

    /// Provides immutable access to the underlying shared data buffer.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub(crate) fn slot(&self, graph_id: GraphId) -> Option<&GraphSlot> {
        self.slots.iter().find(|slot| slot.graph_id == graph_id)
    }

    pub(crate) fn slot_mut(&mut self, graph_id: GraphId) -> Option<&mut GraphSlot> {
        self.slots.iter_mut().find(|slot| slot.graph_id == graph_id)
    }

    pub(crate) fn graph_ids(&self) -> Vec<GraphId> {
        self.slots.iter().map(|slot| slot.graph_id).collect()
    }
}
