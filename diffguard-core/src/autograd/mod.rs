//! # Automatic differentiation and gradient checking
//!
//! Graph bookkeeping (`graph_id`, `graph`, `backward_op`), the backward engine
//! (`backward`), thread-local execution scopes (`backprop_mode`, `leak_detection`),
//! the finite-difference estimator (`numerical`) and the gradient-check harness
//! built on top of them (`grad_check`).

pub mod backprop_mode;
pub mod backward;
pub mod backward_op;
pub mod grad_check;
pub(crate) mod graph;
pub mod graph_id;
pub mod leak_detection;
pub mod numerical;

pub use backprop_mode::{is_backprop_required, ForceBackpropModeScope, NoBackpropModeScope};
pub use backward::{backward, DoubleBackpropOption};
pub use backward_op::{BackwardOp, SavedTensor};
pub use graph_id::GraphId;
pub use leak_detection::{AliveBody, LeakDetectionScope, LeakTracker};
pub use numerical::numerical_gradient;
