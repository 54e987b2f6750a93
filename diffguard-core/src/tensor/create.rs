// src/tensor/create.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::DiffGuardError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Creates a new tensor of `dtype` filled with zeros.
pub fn zeros(shape: &[usize], dtype: DType) -> Result<Tensor, DiffGuardError> {
    full(shape, 0.0, dtype)
}

/// Creates a new tensor of `dtype` filled with ones.
pub fn ones(shape: &[usize], dtype: DType) -> Result<Tensor, DiffGuardError> {
    full(shape, 1.0, dtype)
}

/// Creates a new tensor of `dtype` filled with `value`.
pub fn full(shape: &[usize], value: f64, dtype: DType) -> Result<Tensor, DiffGuardError> {
    let numel = shape.iter().product();
    Tensor::from_f64_data(vec![value; numel], shape.to_vec(), dtype)
}

/// Creates a new F32 Tensor from a Vec<f32> and shape.
pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, DiffGuardError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new F64 Tensor from a Vec<f64> and shape.
pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, DiffGuardError> {
    Tensor::new_f64(data_vec, shape)
}

/// Zeros with the shape and dtype of `tensor`. The result has no graph attachment.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, DiffGuardError> {
    full_like(tensor, 0.0)
}

/// Ones with the shape and dtype of `tensor`. The result has no graph attachment.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, DiffGuardError> {
    full_like(tensor, 1.0)
}

/// `value` with the shape and dtype of `tensor`. Handy for per-element eps tensors.
pub fn full_like(tensor: &Tensor, value: f64) -> Result<Tensor, DiffGuardError> {
    let (shape, dtype) = {
        let guard = tensor.read_data();
        (guard.shape.clone(), guard.dtype)
    };
    full(&shape, value, dtype)
}

/// Uniform samples in `[low, high)` from a generator seeded with `seed`.
pub fn rand_uniform(
    shape: &[usize],
    low: f64,
    high: f64,
    dtype: DType,
    seed: u64,
) -> Result<Tensor, DiffGuardError> {
    if low.partial_cmp(&high) != Some(std::cmp::Ordering::Less) {
        return Err(DiffGuardError::InvalidArgument(format!(
            "rand_uniform requires low < high, got [{}, {})",
            low, high
        )));
    }
    let numel = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let data_vec: Vec<f64> = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    Tensor::from_f64_data(data_vec, shape.to_vec(), dtype)
}

/// Normal samples with the given mean and standard deviation, seeded with `seed`.
pub fn randn(
    shape: &[usize],
    mean: f64,
    std_dev: f64,
    dtype: DType,
    seed: u64,
) -> Result<Tensor, DiffGuardError> {
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return Err(DiffGuardError::InvalidArgument(format!(
            "randn requires a finite, positive std_dev, got {}",
            std_dev
        )));
    }
    let normal = Normal::new(mean, std_dev).map_err(|e| {
        DiffGuardError::InvalidArgument(format!("randn: invalid distribution: {}", e))
    })?;
    let numel = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let data_vec: Vec<f64> = (0..numel).map(|_| normal.sample(&mut rng)).collect();
    Tensor::from_f64_data(data_vec, shape.to_vec(), dtype)
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
