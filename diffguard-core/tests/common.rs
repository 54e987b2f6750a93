use std::sync::Once;

use diffguard_core::tensor::full_like;
use diffguard_core::utils::testing::create_test_tensor_with_grad;
use diffguard_core::{GraphId, Tensor};

// Helper to initialize logger only once for all tests in a test binary.
static LOGGER_INIT: Once = Once::new();

#[allow(dead_code)]
pub fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        // Set RUST_LOG=diffguard_core=debug to see the check phases.
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// f64 leaf tensor requiring grad on `graph`.
#[allow(dead_code)]
pub fn leaf(data: Vec<f64>, shape: Vec<usize>, graph: GraphId) -> Tensor {
    create_test_tensor_with_grad(data, shape, graph)
}

/// One eps tensor of value `value` per tensor in `like`.
#[allow(dead_code)]
pub fn eps_for(like: &[Tensor], value: f64) -> Vec<Tensor> {
    like.iter()
        .map(|t| full_like(t, value).expect("Test eps creation failed"))
        .collect()
}
