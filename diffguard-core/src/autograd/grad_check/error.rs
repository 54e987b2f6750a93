use thiserror::Error;

use crate::autograd::GraphId;
use crate::error::DiffGuardError;

/// Misuse of the gradient-check API. Raised before any comparison is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionError {
    #[error("At least one input tensor is required")]
    EmptyInputs,

    #[error("All inputs must be leaf nodes: input {index} has graph history on the graph '{graph_id}'")]
    InputNotLeaf { index: usize, graph_id: GraphId },

    #[error("Input {input} and output {output} of the forward function are identical.")]
    IdenticalInputOutput { input: usize, output: usize },

    #[error("Size of function outputs: {outputs} and size of grad outputs: {grad_outputs} must be same")]
    GradOutputCountMismatch { outputs: usize, grad_outputs: usize },

    #[error("Number of input tensors ({inputs}) and grad_grad_input tensors ({grad_grad_inputs}) do not match")]
    GradGradInputCountMismatch {
        inputs: usize,
        grad_grad_inputs: usize,
    },

    #[error("Expected {expected} eps tensors (one per differentiated tensor), got {actual}")]
    EpsCountMismatch { expected: usize, actual: usize },

    #[error("Input {index} / {total} is not differentiable w.r.t. the graph '{graph_id}'.")]
    InputNotDifferentiable {
        index: usize,
        total: usize,
        graph_id: GraphId,
    },

    #[error("Output gradient {index} / {total} is not differentiable w.r.t. the graph '{graph_id}'.")]
    GradOutputNotDifferentiable {
        index: usize,
        total: usize,
        graph_id: GraphId,
    },
}

/// Error type for gradient checking.
///
/// `CheckFailed` is the expected outcome of a failing check and carries the rendered
/// diagnostic. `Precondition` means the check itself was called incorrectly. `Tensor`
/// wraps a failure of the forward function or of the autograd machinery.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed:\n{0}")]
    CheckFailed(String),

    #[error("Invalid gradient check: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Tensor error during gradient check: {0}")]
    Tensor(#[from] DiffGuardError),
}

impl GradCheckError {
    pub fn is_check_failure(&self) -> bool {
        matches!(self, GradCheckError::CheckFailed(_))
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, GradCheckError::Precondition(_))
    }
}
