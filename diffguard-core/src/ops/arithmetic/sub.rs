use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::DiffGuardError;
use crate::ops::arithmetic::neg_op;
use crate::ops::{apply_binary_kernel, check_same_layout, record_op};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SubBackward;

impl BackwardOp for SubBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![grad_output.clone(), neg_op(grad_output)?])
    }
}

/// Element-wise `a - b`.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, DiffGuardError> {
    check_same_layout(a, b, "sub_op")?;
    let result = apply_binary_kernel(a, b, |x, y| x - y)?;
    record_op(&result, &[a, b], || Arc::new(SubBackward));
    Ok(result)
}

#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
