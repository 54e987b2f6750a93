use crate::autograd::backprop_mode::NoBackpropModeScope;
use crate::error::DiffGuardError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Estimates input gradients by central finite differences.
///
/// For every element `k` of every input `i`, the function is evaluated on copies of the
/// inputs where element `k` is shifted by `+eps_i[k]` and `-eps_i[k]`. The per-output
/// differences are contracted with the output seeds:
///
/// `g_i[k] = Σ_j Σ_m (y⁺_j[m] - y⁻_j[m]) * gy_j[m] / (2 * eps_i[k])`
///
/// The function runs under a no-backprop scope for all graphs and only ever sees fresh
/// bodies, so the original inputs are never attached to any new graph history.
///
/// # Arguments
/// * `func` - The forward function.
/// * `inputs` - Point at which to estimate. Not modified.
/// * `grad_outputs` - One seed per function output, same shape as that output.
/// * `eps` - One perturbation tensor per input, same shape as that input.
///
/// # Returns
/// One gradient per input, with the input's shape and dtype.
pub fn numerical_gradient<F, E>(
    func: &F,
    inputs: &[Tensor],
    grad_outputs: &[Tensor],
    eps: &[Tensor],
) -> Result<Vec<Tensor>, E>
where
    F: Fn(&[Tensor]) -> Result<Vec<Tensor>, E>,
    E: From<DiffGuardError>,
{
    if eps.len() != inputs.len() {
        return Err(DiffGuardError::SizeMismatch {
            expected: inputs.len(),
            actual: eps.len(),
            operation: "numerical_gradient (eps per input)".to_string(),
        }
        .into());
    }
    for (input, input_eps) in inputs.iter().zip(eps) {
        if input.shape() != input_eps.shape() {
            return Err(DiffGuardError::ShapeMismatch {
                expected: input.shape(),
                actual: input_eps.shape(),
                operation: "numerical_gradient (eps)".to_string(),
            }
            .into());
        }
    }

    let _no_backprop = NoBackpropModeScope::new();

    let base: Vec<(Vec<f64>, Vec<usize>, DType)> = inputs
        .iter()
        .map(|t| (t.to_f64_vec(), t.shape(), t.dtype()))
        .collect();
    let seeds: Vec<Vec<f64>> = grad_outputs.iter().map(Tensor::to_f64_vec).collect();

    // Evaluates `func` with element `k` of input `i` replaced by `value`.
    let eval_at = |i: usize, k: usize, value: f64| -> Result<Vec<Vec<f64>>, E> {
        let mut shifted = Vec::with_capacity(base.len());
        for (j, (data, shape, dtype)) in base.iter().enumerate() {
            let mut data = data.clone();
            if j == i {
                data[k] = value;
            }
            shifted.push(Tensor::from_f64_data(data, shape.clone(), *dtype)?);
        }
        let outputs = func(&shifted)?;
        if outputs.len() != grad_outputs.len() {
            return Err(DiffGuardError::SizeMismatch {
                expected: grad_outputs.len(),
                actual: outputs.len(),
                operation: "numerical_gradient (outputs vs grad_outputs)".to_string(),
            }
            .into());
        }
        let mut values = Vec::with_capacity(outputs.len());
        for (output, seed) in outputs.iter().zip(grad_outputs) {
            if output.shape() != seed.shape() {
                return Err(DiffGuardError::ShapeMismatch {
                    expected: output.shape(),
                    actual: seed.shape(),
                    operation: "numerical_gradient (grad_output)".to_string(),
                }
                .into());
            }
            values.push(output.to_f64_vec());
        }
        Ok(values)
    };

    let mut grads = Vec::with_capacity(inputs.len());
    for (i, (data, shape, dtype)) in base.iter().enumerate() {
        let eps_data = eps[i].to_f64_vec();
        let mut grad = Vec::with_capacity(data.len());
        for (k, (&x, &h)) in data.iter().zip(&eps_data).enumerate() {
            let plus = eval_at(i, k, x + h)?;
            let minus = eval_at(i, k, x - h)?;
            let mut acc = 0.0;
            for ((y_plus, y_minus), gy) in plus.iter().zip(&minus).zip(&seeds) {
                acc += y_plus
                    .iter()
                    .zip(y_minus)
                    .zip(gy)
                    .map(|((p, m), g)| (p - m) * g)
                    .sum::<f64>();
            }
            grad.push(acc / (2.0 * h));
        }
        log::trace!("numerical gradient for input {} computed over {} elements", i, data.len());
        grads.push(Tensor::from_f64_data(grad, shape.clone(), *dtype)?);
    }
    Ok(grads)
}

#[cfg(test)]
#[path = "numerical_test.rs"]
mod tests;
