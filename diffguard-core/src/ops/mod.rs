//! # Tensor Operations Module (`ops`)
//!
//! Differentiable elementwise operations used by user functions and by the backward
//! rules themselves, plus the closeness predicate used by the gradient checks.
//!
//! - **`_op` functions** perform the forward computation on the CPU and record graph
//!   history through [`record_op`].
//! - **`Backward` structs** (e.g. `MulBackward`) implement
//!   [`BackwardOp`](crate::autograd::BackwardOp) and keep whatever the forward pass has to
//!   hand to the backward pass, as [`SavedTensor`](crate::autograd::SavedTensor)s.
//!
//! All elementwise ops require operands of identical shape and dtype; there is no
//! broadcasting.

use std::sync::Arc;

use crate::autograd::backprop_mode::is_backprop_required;
use crate::autograd::graph::{GraphNode, OpNode};
use crate::autograd::{BackwardOp, GraphId};
use crate::buffer::Buffer;
use crate::error::DiffGuardError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

pub mod arithmetic;
pub mod comparison;
pub mod math_elem;

/// Fails unless `a` and `b` have the same shape and dtype.
pub(crate) fn check_same_layout(a: &Tensor, b: &Tensor, operation: &str) -> Result<(), DiffGuardError> {
    let (a_shape, a_dtype) = {
        let guard = a.read_data();
        (guard.shape.clone(), guard.dtype)
    };
    let (b_shape, b_dtype) = {
        let guard = b.read_data();
        (guard.shape.clone(), guard.dtype)
    };
    if a_shape != b_shape {
        return Err(DiffGuardError::ShapeMismatch {
            expected: a_shape,
            actual: b_shape,
            operation: operation.to_string(),
        });
    }
    if a_dtype != b_dtype {
        return Err(DiffGuardError::DataTypeMismatch {
            expected: a_dtype,
            actual: b_dtype,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Applies `f` to every element of `a` (in f64) and returns an untracked tensor of
/// `a`'s dtype and shape.
pub(crate) fn apply_unary_kernel<F>(a: &Tensor, f: F) -> Result<Tensor, DiffGuardError>
where
    F: Fn(f64) -> f64,
{
    let guard = a.read_data();
    let result: Vec<f64> = guard.buffer.to_f64_vec().into_iter().map(f).collect();
    let tensor_data = TensorData::new(Buffer::from_f64(guard.dtype, result), guard.shape.clone())?;
    drop(guard);
    Ok(Tensor::from_tensor_data(tensor_data))
}

/// Applies `f` elementwise over `a` and `b` (same layout, checked by the caller).
pub(crate) fn apply_binary_kernel<F>(a: &Tensor, b: &Tensor, f: F) -> Result<Tensor, DiffGuardError>
where
    F: Fn(f64, f64) -> f64,
{
    let (a_data, shape, dtype) = {
        let guard = a.read_data();
        (guard.buffer.to_f64_vec(), guard.shape.clone(), guard.dtype)
    };
    let b_data = b.to_f64_vec();
    let result: Vec<f64> = a_data
        .into_iter()
        .zip(b_data)
        .map(|(x, y)| f(x, y))
        .collect();
    let tensor_data = TensorData::new(Buffer::from_f64(dtype, result), shape)?;
    Ok(Tensor::from_tensor_data(tensor_data))
}

/// Links `output` into the graph of every graph id that (a) some input is attached to
/// and (b) currently has backprop enabled.
///
/// The backward rule is built at most once and shared by the nodes of all graphs.
pub(crate) fn record_op<F>(output: &Tensor, inputs: &[&Tensor], make_op: F)
where
    F: FnOnce() -> Arc<dyn BackwardOp>,
{
    let mut graph_ids: Vec<GraphId> = Vec::new();
    for input in inputs {
        for graph_id in input.graph_ids() {
            if !graph_ids.contains(&graph_id) && is_backprop_required(graph_id) {
                graph_ids.push(graph_id);
            }
        }
    }
    if graph_ids.is_empty() {
        return;
    }

    let op = make_op();
    let (shape, dtype) = (output.shape(), output.dtype());
    for graph_id in graph_ids {
        let node = GraphNode {
            graph_id,
            creator: Some(OpNode {
                op: Arc::clone(&op),
                inputs: inputs.iter().map(|input| input.node(graph_id)).collect(),
            }),
            body: Arc::downgrade(&output.data),
            shape: shape.clone(),
            dtype,
        };
        output.attach_node(node);
    }
}
