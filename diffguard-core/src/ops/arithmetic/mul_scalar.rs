use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::DiffGuardError;
use crate::ops::{apply_unary_kernel, record_op};
use crate::tensor::Tensor;

#[derive(Debug)]
struct MulScalarBackward {
    scalar: f64,
}

impl BackwardOp for MulScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, DiffGuardError> {
        Ok(vec![mul_scalar_op(grad_output, self.scalar)?])
    }
}

/// Element-wise `a * scalar`. The backward rule does not depend on `a`.
pub fn mul_scalar_op(a: &Tensor, scalar: f64) -> Result<Tensor, DiffGuardError> {
    let result = apply_unary_kernel(a, |x| x * scalar)?;
    record_op(&result, &[a], || Arc::new(MulScalarBackward { scalar }));
    Ok(result)
}

#[cfg(test)]
#[path = "mul_scalar_test.rs"]
mod tests;
