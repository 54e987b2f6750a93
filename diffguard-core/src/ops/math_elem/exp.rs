use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::DiffGuardError;
use crate::ops::arithmetic::mul_op;
use crate::ops::{apply_unary_kernel, record_op};
use crate::tensor::Tensor;

/// Backward context for `exp`.
///
/// Saves the input and recomputes `exp(a)` in backward: saving the output would make the
/// output's own node reachable from its creator.
#[derive(Debug)]
struct ExpBackward {
    a: SavedTensor,
}

impl BackwardOp for ExpBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        let exp_a = exp_op(&self.a.restore())?;
        Ok(vec![mul_op(grad_output, &exp_a)?])
    }
}

/// Element-wise `e^a`.
pub fn exp_op(a: &Tensor) -> Result<Tensor, DiffGuardError> {
    let result = apply_unary_kernel(a, f64::exp)?;
    record_op(&result, &[a], || {
        Arc::new(ExpBackward {
            a: SavedTensor::save(a),
        })
    });
    Ok(result)
}

#[cfg(test)]
#[path = "exp_test.rs"]
mod tests;
