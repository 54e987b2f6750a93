//! # Gradient checking
//!
//! Verifies backward rules against central finite differences, for first and second
//! derivatives, and checks the structural guarantees of the engine along the way:
//!
//! - with double backprop disabled, gradients are disconnected from the graph, and with
//!   it enabled they stay connected;
//! - no tensor body allocated during a check outlives it.
//!
//! Every check works on isolated copies of the caller's inputs (see
//! [`disconnect_inputs`]), so the caller's tensors never gain gradients or history.

use crate::autograd::leak_detection::{LeakDetectionScope, LeakTracker};
use crate::autograd::GraphId;
use crate::tensor::Tensor;

mod double_backprop;
pub mod error;
pub mod extraction;
mod first_order;
pub mod isolation;
mod report;
mod second_order;

pub use error::{GradCheckError, PreconditionError};
pub use extraction::backward_gradients;
pub use isolation::disconnect_inputs;

/// What a forward function under check returns.
pub type ForwardResult = Result<Vec<Tensor>, GradCheckError>;

/// Tolerances and target graph of a gradient check.
///
/// Gradients `a` (analytic) and `n` (numerical) agree when
/// `|a - n| <= atol + rtol * |n|` holds element-wise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckConfig {
    pub atol: f64,
    pub rtol: f64,
    pub graph_id: GraphId,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            atol: 1e-5,
            rtol: 1e-4,
            graph_id: GraphId::DEFAULT,
        }
    }
}

impl CheckConfig {
    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    pub fn with_graph_id(mut self, graph_id: GraphId) -> Self {
        self.graph_id = graph_id;
        self
    }
}

/// Fails with a report naming every body recorded by `tracker` that is still alive.
pub fn check_all_bodies_freed(tracker: &LeakTracker) -> Result<(), GradCheckError> {
    match tracker.leak_report() {
        Some(report) => {
            log::warn!("{} tensor bodies outlived the check", tracker.alive_count());
            Err(GradCheckError::CheckFailed(report))
        }
        None => Ok(()),
    }
}

/// Runs `check` inside a fresh leak detection scope, then asserts nothing it allocated
/// survived.
fn run_leak_checked<T>(
    check: impl FnOnce() -> Result<T, GradCheckError>,
) -> Result<T, GradCheckError> {
    let tracker = LeakTracker::new();
    let value = {
        let _scope = LeakDetectionScope::new(&tracker);
        check()?
    };
    check_all_bodies_freed(&tracker)?;
    Ok(value)
}

fn validate_common(
    inputs: &[Tensor],
    eps: &[Tensor],
    expected_eps: usize,
    config: &CheckConfig,
) -> Result<(), GradCheckError> {
    if inputs.is_empty() {
        return Err(PreconditionError::EmptyInputs.into());
    }
    if eps.len() != expected_eps {
        return Err(PreconditionError::EpsCountMismatch {
            expected: expected_eps,
            actual: eps.len(),
        }
        .into());
    }
    extraction::validate_leaf_inputs(inputs, config.graph_id)?;
    Ok(())
}

/// Checks the first-order backward computation of `func` at `inputs`.
///
/// Runs two phases, each in its own leak detection scope:
/// 1. the double-backprop toggle check on `func`;
/// 2. the comparison of analytic gradients (seeded with `grad_outputs`) against central
///    differences with one `eps` tensor per input.
///
/// # Errors
/// * `GradCheckError::Precondition` on misuse: no inputs, `eps` count, non-leaf inputs,
///   aliased input/output, seed count.
/// * `GradCheckError::CheckFailed` on disagreement, connectivity violations, gradient
///   shape/dtype mismatch or leaked bodies.
/// * `GradCheckError::Tensor` if `func` or the autograd machinery fails.
pub fn check_backward<F>(
    func: &F,
    inputs: &[Tensor],
    grad_outputs: &[Tensor],
    eps: &[Tensor],
    config: &CheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> ForwardResult,
{
    validate_common(inputs, eps, inputs.len(), config)?;
    log::debug!("check_backward on graph '{}' with {} inputs", config.graph_id, inputs.len());

    run_leak_checked(|| double_backprop::check_double_backprop_option(func, inputs, config.graph_id))?;
    run_leak_checked(|| first_order::check_backward_computation(func, inputs, grad_outputs, eps, config))
}

/// Checks the second-order backward computation of `func`.
///
/// `inputs` and `grad_outputs` must all require grad on the checked graph.
/// `grad_grad_inputs` seeds the first-order gradients (one per input) and `eps` holds
/// one perturbation tensor per element of `inputs ++ grad_outputs`.
///
/// # Errors
/// As [`check_backward`], plus the preconditions on differentiability and on the
/// `grad_grad_inputs` count.
pub fn check_double_backward_computation<F>(
    func: &F,
    inputs: &[Tensor],
    grad_outputs: &[Tensor],
    grad_grad_inputs: &[Tensor],
    eps: &[Tensor],
    config: &CheckConfig,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> ForwardResult,
{
    validate_common(inputs, eps, inputs.len() + grad_outputs.len(), config)?;
    log::debug!(
        "check_double_backward_computation on graph '{}' with {} inputs",
        config.graph_id,
        inputs.len()
    );

    run_leak_checked(|| {
        let inputs_disconnected = disconnect_inputs(inputs);
        let grad_outputs_disconnected = disconnect_inputs(grad_outputs);
        second_order::check_second_order_computation(
            func,
            &inputs_disconnected,
            &grad_outputs_disconnected,
            grad_grad_inputs,
            eps,
            config,
        )
    })
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
