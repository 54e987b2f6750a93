use std::sync::Arc;

use crate::autograd::{BackwardOp, SavedTensor};
use crate::error::DiffGuardError;
use crate::ops::{apply_binary_kernel, check_same_layout, record_op};
use crate::tensor::Tensor;

// --- Backward Operation Structure ---

/// Backward operation context for multiplication.
#[derive(Debug)]
struct MulBackward {
    a: SavedTensor,
    b: SavedTensor,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        // grad_a = grad_output * b
        let grad_a = mul_op(grad_output, &self.b.restore())?;
        // grad_b = grad_output * a
        let grad_b = mul_op(grad_output, &self.a.restore())?;
        Ok(vec![grad_a, grad_b])
    }
}

// --- Forward Operation ---

/// Element-wise `a * b`.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, DiffGuardError> {
    check_same_layout(a, b, "mul_op")?;
    let result = apply_binary_kernel(a, b, |x, y| x * y)?;
    record_op(&result, &[a, b], || {
        Arc::new(MulBackward {
            a: SavedTensor::save(a),
            b: SavedTensor::save(b),
        })
    });
    Ok(result)
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
