// src/tensor/mod.rs

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::autograd::leak_detection;
use crate::buffer::{Buffer, Element};
use crate::error::DiffGuardError;
use crate::tensor_data::TensorData;
use crate::types::DType;

mod autograd;
pub mod create;
mod debug;
mod traits;

pub use create::{
    from_vec_f32, from_vec_f64, full, full_like, ones, ones_like, rand_uniform, randn, zeros,
    zeros_like,
};

/// Handle to a tensor body.
///
/// `Tensor` wraps `Arc<RwLock<TensorData>>`: clones are cheap and share the body,
/// including its graph attachments and gradient slots. A *view* (see
/// [`Tensor::as_grad_stopped`]) is a different body over the same buffer.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability of TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new f32 Tensor with the given data and shape.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, DiffGuardError> {
        Self::from_vec(data_vec, shape)
    }

    /// Creates a new f64 Tensor with the given data and shape.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, DiffGuardError> {
        Self::from_vec(data_vec, shape)
    }

    /// Creates a tensor from any supported element type.
    pub fn from_vec<T: Element>(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, DiffGuardError> {
        let tensor_data = TensorData::new(T::into_buffer(data_vec), shape)?;
        Ok(Self::from_tensor_data(tensor_data))
    }

    /// Creates a tensor of `dtype` from f64 values (narrowed for f32).
    pub fn from_f64_data(
        data_vec: Vec<f64>,
        shape: Vec<usize>,
        dtype: DType,
    ) -> Result<Self, DiffGuardError> {
        let tensor_data = TensorData::new(Buffer::from_f64(dtype, data_vec), shape)?;
        Ok(Self::from_tensor_data(tensor_data))
    }

    /// Wraps a body into a handle. Every body in the crate is created here, which is
    /// where allocations are reported to the active leak trackers.
    pub(crate) fn from_tensor_data(tensor_data: TensorData) -> Tensor {
        let data = Arc::new(RwLock::new(tensor_data));
        leak_detection::track_allocation(&data);
        Tensor { data }
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Acquires a read lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Shared buffer of this tensor.
    pub(crate) fn buffer(&self) -> Arc<Buffer> {
        Arc::clone(&self.read_data().buffer)
    }

    /// Returns the data as `Vec<f32>`; errors if the tensor is not F32.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, DiffGuardError> {
        Ok(self.read_data().buffer.try_get_f32()?.to_vec())
    }

    /// Returns the data as `Vec<f64>`; errors if the tensor is not F64.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, DiffGuardError> {
        Ok(self.read_data().buffer.try_get_f64()?.to_vec())
    }

    /// Returns the data widened to f64, whatever the dtype.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.read_data().buffer.to_f64_vec()
    }

    /// Whether both handles refer to the same body (not merely the same buffer).
    pub fn shares_body_with(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Whether both handles read the same underlying buffer (views included).
    pub fn shares_buffer_with(&self, other: &Tensor) -> bool {
        let (own, theirs) = (self.buffer(), other.buffer());
        Arc::ptr_eq(&own, &theirs)
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
