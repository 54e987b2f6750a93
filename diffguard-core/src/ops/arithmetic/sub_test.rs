use crate::autograd::{DoubleBackpropOption, GraphId};
use crate::error::DiffGuardError;
use crate::ops::arithmetic::sub_op;
use crate::tensor::{from_vec_f32, Tensor};

#[test]
fn test_sub_tensors_ok() {
    let t1 = from_vec_f32(vec![5.0, 6.0, 7.0], vec![3]).unwrap();
    let t2 = from_vec_f32(vec![1.0, 2.0, 4.0], vec![3]).unwrap();
    let result = sub_op(&t1, &t2).unwrap();
    assert_eq!(result.get_f32_data().unwrap(), vec![4.0, 4.0, 3.0]);
}

#[test]
fn test_sub_shape_mismatch() {
    let t1 = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let t2 = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
    assert!(matches!(
        sub_op(&t1, &t2),
        Err(DiffGuardError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_sub_backward() {
    let graph = GraphId::fresh();
    let a = from_vec_f32(vec![1.0, 2.0], vec![2]).unwrap();
    let b = from_vec_f32(vec![3.0, 5.0], vec![2]).unwrap();
    a.require_grad(graph);
    b.require_grad(graph);

    let result = sub_op(&a, &b).unwrap();
    result.backward(graph, DoubleBackpropOption::Disable).unwrap();

    assert_eq!(a.grad(graph).unwrap().get_f32_data().unwrap(), vec![1.0, 1.0]);
    assert_eq!(b.grad(graph).unwrap().get_f32_data().unwrap(), vec![-1.0, -1.0]);
}
