// src/tensor/traits.rs

use std::sync::Arc;

use crate::tensor::Tensor;

impl Clone for Tensor {
    /// Shallow clone: the new handle shares the body (data, graph nodes, gradients).
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl PartialEq for Tensor {
    /// Value equality: same shape, same dtype and the same elements.
    /// Graph attachments are not compared.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let self_guard = self.read_data();
        let other_guard = other.read_data();
        self_guard.shape == other_guard.shape
            && self_guard.dtype == other_guard.dtype
            && *self_guard.buffer == *other_guard.buffer
    }
}
