//! # diffguard-core
//!
//! Gradient-checking harness for reverse-mode automatic differentiation.
//!
//! The entry points [`check_backward`] and [`check_double_backward_computation`] compare
//! analytic gradients produced by the backward engine against central finite differences,
//! verify that the double-backprop toggle really controls graph connectivity of
//! gradients, and assert that no tensor body allocated during a check outlives it.
//!
//! The crate also carries the minimal tensor/autograd substrate the harness drives:
//! CPU tensors in f32/f64, per-graph gradient slots, a handful of differentiable
//! elementwise ops and the backward engine.

pub mod autograd;
pub mod buffer;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use autograd::grad_check::{
    check_all_bodies_freed, check_backward, check_double_backward_computation, CheckConfig,
    ForwardResult, GradCheckError, PreconditionError,
};
pub use autograd::{DoubleBackpropOption, GraphId};
pub use error::DiffGuardError;
pub use tensor::Tensor;
pub use types::DType;

// Re-export traits required by public functions/structs
pub use num_traits;
