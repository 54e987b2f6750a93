use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::DiffGuardError;
use crate::ops::{apply_unary_kernel, record_op};
use crate::tensor::Tensor;

#[derive(Debug)]
struct NegBackward;

impl BackwardOp for NegBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![neg_op(grad_output)?])
    }
}

/// Element-wise `-a`.
pub fn neg_op(a: &Tensor) -> Result<Tensor, DiffGuardError> {
    let result = apply_unary_kernel(a, |x| -x)?;
    record_op(&result, &[a], || Arc::new(NegBackward));
    Ok(result)
}

#[cfg(test)]
#[path = "neg_test.rs"]
mod tests;
