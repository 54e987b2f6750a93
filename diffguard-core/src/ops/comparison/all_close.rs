use approx::AbsDiffEq;

use crate::error::DiffGuardError;
use crate::ops::check_same_layout;
use crate::tensor::Tensor;

/// Returns whether every element satisfies `|a - b| <= atol + rtol * |b|`.
///
/// NaN never compares close. Shapes and dtypes must match exactly; a mismatch is an error
/// rather than `false`.
pub fn all_close(a: &Tensor, b: &Tensor, atol: f64, rtol: f64) -> Result<bool, DiffGuardError> {
    check_same_layout(a, b, "all_close")?;
    let a_data = a.to_f64_vec();
    let b_data = b.to_f64_vec();
    Ok(a_data
        .iter()
        .zip(b_data.iter())
        .all(|(x, y)| x.abs_diff_eq(y, atol + rtol * y.abs())))
}

#[cfg(test)]
#[path = "all_close_test.rs"]
mod tests;
