use crate::autograd::GraphId;
use crate::tensor::Tensor;

/// Checks if two tensors are approximately equal (shape and data within tolerance).
/// Works for both f32 and f64 tensors; values are compared after widening to f64.
/// Panics if shapes differ or data differs significantly.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f32],
    tolerance: f32,
) {
    let expected: Vec<f64> = expected_data.iter().map(|&e| f64::from(e)).collect();
    check_tensor_near_f64(actual, expected_shape, &expected, f64::from(tolerance));
}

/// f64 counterpart of [`check_tensor_near`].
pub fn check_tensor_near_f64(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data_vec = actual.to_f64_vec();
    assert_eq!(
        actual_data_vec.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data_vec.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Helper to create an f64 leaf tensor that requires grad under `graph_id`.
pub fn create_test_tensor_with_grad(data: Vec<f64>, shape: Vec<usize>, graph_id: GraphId) -> Tensor {
    let tensor = Tensor::new_f64(data, shape).expect("Failed to create test tensor with grad");
    tensor.require_grad(graph_id);
    tensor
}
