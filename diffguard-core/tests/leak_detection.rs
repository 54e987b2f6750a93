mod common;

use std::cell::RefCell;

use common::{eps_for, leaf, setup_logger};
use diffguard_core::autograd::{LeakDetectionScope, LeakTracker};
use diffguard_core::ops::arithmetic::{add_op, mul_op};
use diffguard_core::ops::math_elem::exp_op;
use diffguard_core::tensor::ones_like;
use diffguard_core::{
    check_all_bodies_freed, check_backward, check_double_backward_computation, CheckConfig,
    DoubleBackpropOption, ForwardResult, GradCheckError, GraphId, Tensor,
};

#[test]
fn test_deep_chain_is_fully_released() {
    setup_logger();
    let graph = GraphId::fresh();
    let tracker = LeakTracker::new();
    let x = leaf(vec![0.1, 0.2], vec![2], graph);
    {
        let _scope = LeakDetectionScope::new(&tracker);
        let mut y = x.clone();
        for _ in 0..10 {
            y = add_op(&mul_op(&y, &x).unwrap(), &exp_op(&x).unwrap()).unwrap();
        }
        y.backward(graph, DoubleBackpropOption::Enable).unwrap();
    }
    // The gradient stored on `x` keeps its double-backprop graph (and nothing else) alive.
    assert!(x.grad(graph).is_some());
    x.clear_grad(graph);
    assert!(tracker.tracked_count() > 10);
    check_all_bodies_freed(&tracker).unwrap();
}

#[test]
fn test_checks_release_everything() {
    setup_logger();
    let graph = GraphId::fresh();
    let config = CheckConfig::default().with_graph_id(graph);
    let x = leaf(vec![0.3, -0.6], vec![2], graph);
    let gy = leaf(vec![1.0, 2.0], vec![2], graph);
    let ggx = ones_like(&x).unwrap();
    let func = |xs: &[Tensor]| -> ForwardResult { Ok(vec![mul_op(&exp_op(&xs[0])?, &xs[0])?]) };

    let tracker = LeakTracker::new();
    {
        let _scope = LeakDetectionScope::new(&tracker);
        let eps = eps_for(&[x.clone()], 1e-3);
        check_backward(&func, &[x.clone()], &[gy.clone()], &eps, &config).unwrap();
        let eps = eps_for(&[x.clone(), gy.clone()], 1e-3);
        check_double_backward_computation(
            &func,
            &[x.clone()],
            &[gy.clone()],
            &[ggx.clone()],
            &eps,
            &config,
        )
        .unwrap();
    }
    check_all_bodies_freed(&tracker).unwrap();
}

#[test]
fn test_collaborator_retaining_a_body_is_named() {
    setup_logger();
    let graph = GraphId::fresh();
    let config = CheckConfig::default().with_graph_id(graph);
    let x = leaf(vec![1.0, 2.0, 3.0], vec![3], graph);
    let grad_outputs = vec![ones_like(&x).unwrap()];
    let eps = eps_for(&[x.clone()], 1e-3);
    let cache: RefCell<Option<Tensor>> = RefCell::new(None);
    let func = |xs: &[Tensor]| -> ForwardResult {
        let y = mul_op(&xs[0], &xs[0])?;
        // Keeps the first output only.
        cache.borrow_mut().get_or_insert_with(|| y.clone());
        Ok(vec![y])
    };

    let err = check_backward(&func, &[x], &grad_outputs, &eps, &config).unwrap_err();
    let report = match err {
        GradCheckError::CheckFailed(report) => report,
        other => panic!("expected a check failure, got {:?}", other),
    };
    assert!(report.contains("Number of alive tensor bodies: 1"));
    assert!(report.contains(&format!(
        "- TensorBody(shape=[3], dtype=float64, graphs=[{}], refs=1)",
        graph
    )));
}
