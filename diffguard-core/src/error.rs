use crate::autograd::GraphId;
use crate::types::DType;
use thiserror::Error;

/// Error type for tensor operations and the autograd engine.
///
/// Gradient-check failures have their own type,
/// [`GradCheckError`](crate::autograd::grad_check::GradCheckError), which wraps this one
/// when a collaborator fails underneath a check.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum DiffGuardError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("DType mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    DataTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Tensor does not require grad on graph '{graph_id}' ({operation})")]
    GradNotRequired { graph_id: GraphId, operation: String },

    #[error("Size mismatch in {operation}: expected {expected}, got {actual}")]
    SizeMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Backward pass error: {0}")]
    BackwardError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
