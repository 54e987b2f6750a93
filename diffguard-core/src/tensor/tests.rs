// diffguard-core/src/tensor/tests.rs

use super::*;
use crate::autograd::GraphId;

#[test]
fn test_tensor_creation() {
    let t = Tensor::new(vec![1.0_f32, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    assert_eq!(t.shape(), vec![2, 2]);
    assert_eq!(t.dtype(), DType::F32);
    assert_eq!(t.numel(), 4);
    assert_eq!(t.get_f32_data().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_tensor_creation_f64() {
    let t = Tensor::new_f64(vec![0.5, -1.5], vec![2]).unwrap();
    assert_eq!(t.dtype(), DType::F64);
    assert_eq!(t.get_f64_data().unwrap(), vec![0.5, -1.5]);
    assert!(t.get_f32_data().is_err());
}

#[test]
fn test_tensor_creation_error() {
    let result = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
    assert!(matches!(
        result,
        Err(DiffGuardError::TensorCreationError { data_len: 3, .. })
    ));
}

#[test]
fn test_from_f64_data_narrows_to_f32() {
    let t = Tensor::from_f64_data(vec![0.25, 8.0], vec![2], DType::F32).unwrap();
    assert_eq!(t.dtype(), DType::F32);
    assert_eq!(t.get_f32_data().unwrap(), vec![0.25, 8.0]);
    assert_eq!(t.to_f64_vec(), vec![0.25, 8.0]);
}

#[test]
fn test_scalar_tensor() {
    let t = Tensor::new_f64(vec![3.0], vec![]).unwrap();
    assert_eq!(t.numel(), 1);
    assert_eq!(format!("{}", t), "tensor(3, dtype=float64)");
}

#[test]
fn test_clone_shares_body() {
    let t1 = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let t2 = t1.clone();
    assert!(t1.shares_body_with(&t2));
    assert!(t1.shares_buffer_with(&t2));
    t1.require_grad(GraphId::DEFAULT);
    assert!(t2.is_grad_required(GraphId::DEFAULT));
}

#[test]
fn test_tensor_equality_is_by_value() {
    let t1 = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let t2 = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let t3 = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
    let t4 = Tensor::new_f64(vec![1.0, 2.0], vec![2]).unwrap();
    assert_eq!(t1, t2);
    assert!(!t1.shares_body_with(&t2));
    assert_ne!(t1, t3);
    assert_ne!(t1, t4);
}

#[test]
fn test_display_nested() {
    let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
    assert_eq!(
        format!("{}", t),
        "tensor([[1, 2, 3], [4, 5, 6]], dtype=float32)"
    );
    let v = Tensor::new_f64(vec![0.5, -1.25], vec![2]).unwrap();
    assert_eq!(format!("{}", v), "tensor([0.5, -1.25], dtype=float64)");
}

#[test]
fn test_debug_shows_metadata() {
    let graph = GraphId::fresh();
    let t = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    assert_eq!(format!("{:?}", t), "Tensor(shape=[2], dtype=F32, graphs=[])");
    t.require_grad(graph);
    t.set_grad(Tensor::new(vec![0.0, 0.0], vec![2]).unwrap(), graph)
        .unwrap();
    assert_eq!(
        format!("{:?}", t),
        format!("Tensor(shape=[2], dtype=F32, graphs=[{}:leaf+grad])", graph)
    );
}
