// diffguard-core/src/ops/arithmetic/add.rs

use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::DiffGuardError;
use crate::ops::{apply_binary_kernel, check_same_layout, record_op};
use crate::tensor::Tensor;

// --- Backward Operation ---

/// Backward operation for addition. The gradient passes through to both inputs.
#[derive(Debug)]
struct AddBackward;

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![grad_output.clone(), grad_output.clone()])
    }
}

// --- Forward Operation ---

/// Element-wise `a + b`.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, DiffGuardError> {
    check_same_layout(a, b, "add_op")?;
    let result = apply_binary_kernel(a, b, |x, y| x + y)?;
    record_op(&result, &[a, b], || Arc::new(AddBackward));
    Ok(result)
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
