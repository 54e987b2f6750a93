use crate::ops::comparison::all_close;
use crate::tensor::Tensor;

use super::error::GradCheckError;
use super::CheckConfig;

/// Compares analytic and numerical gradients element-wise and fails with one report
/// covering every index that is not all-close.
///
/// Indices without an analytic gradient are skipped.
pub(crate) fn check_numerical_agreement(
    title: &str,
    backward_grads: &[Option<Tensor>],
    numerical_grads: &[Tensor],
    eps: &[Tensor],
    config: &CheckConfig,
) -> Result<(), GradCheckError> {
    let mut failed: Vec<(usize, &Tensor)> = Vec::new();
    for (i, (backward_grad, numerical_grad)) in backward_grads.iter().zip(numerical_grads).enumerate() {
        let Some(backward_grad) = backward_grad else {
            continue;
        };
        if !all_close(backward_grad, numerical_grad, config.atol, config.rtol)? {
            failed.push((i, backward_grad));
        }
    }
    if failed.is_empty() {
        return Ok(());
    }

    let index_list: Vec<String> = failed.iter().map(|(i, _)| i.to_string()).collect();
    log::debug!("{} on graph '{}': [{}]", title, config.graph_id, index_list.join(", "));
    let mut report = format!(
        "{} on inputs (out of {}): {}\nGraph: {}\nAtol: {}  Rtol: {}\n",
        title,
        backward_grads.len(),
        index_list.join(", "),
        config.graph_id,
        config.atol,
        config.rtol
    );
    for (i, backward_grad) in failed {
        let difference = absolute_difference(backward_grad, &numerical_grads[i])?;
        report.push_str(&format!(
            "Error[{i}]:\n{}\nBackward gradients[{i}]:\n{}\nNumerical gradients[{i}]:\n{}\nEps[{i}] (perturbation in numerical gradients):\n{}\n",
            difference, backward_grad, numerical_grads[i], eps[i]
        ));
    }
    Err(GradCheckError::CheckFailed(report))
}

/// `|a - b|` element-wise, untracked.
fn absolute_difference(a: &Tensor, b: &Tensor) -> Result<Tensor, GradCheckError> {
    let values: Vec<f64> = a
        .to_f64_vec()
        .iter()
        .zip(b.to_f64_vec())
        .map(|(x, y)| (x - y).abs())
        .collect();
    Ok(Tensor::from_f64_data(values, a.shape(), a.dtype())?)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
