use std::fmt::Debug;

use num_traits::{Float, ToPrimitive};

use crate::error::DiffGuardError;
use crate::types::DType;

/// Typed CPU storage behind a tensor body.
///
/// Buffers are immutable once created and shared through `Arc<Buffer>`, so views
/// (bodies built with [`Tensor::as_grad_stopped`](crate::Tensor::as_grad_stopped)) and the
/// saved tensors of backward rules never copy element data.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// Buffer holding f32 data.
    F32(Vec<f32>),
    /// Buffer holding f64 data.
    F64(Vec<f64>),
}

/// Element types a [`Buffer`] can hold.
pub trait Element: Float + Debug + Send + Sync + 'static {
    const DTYPE: DType;

    fn into_buffer(data: Vec<Self>) -> Buffer;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::F32(data)
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::F64(data)
    }
}

impl Buffer {
    /// Builds a buffer of the requested dtype from f64 values, narrowing if needed.
    pub fn from_f64(dtype: DType, data: Vec<f64>) -> Buffer {
        match dtype {
            DType::F64 => Buffer::F64(data),
            DType::F32 => Buffer::F32(data.into_iter().map(|x| x as f32).collect()),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(data) => data.len(),
            Buffer::F64(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the elements out as f64, the working precision of the numerical code.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Buffer::F32(data) => widen(data),
            Buffer::F64(data) => data.clone(),
        }
    }

    /// Attempts to get a reference to the underlying f32 data.
    pub fn try_get_f32(&self) -> Result<&[f32], DiffGuardError> {
        match self {
            Buffer::F32(data) => Ok(data),
            other => Err(DiffGuardError::DataTypeMismatch {
                expected: DType::F32,
                actual: other.dtype(),
                operation: "try_get_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying f64 data.
    pub fn try_get_f64(&self) -> Result<&[f64], DiffGuardError> {
        match self {
            Buffer::F64(data) => Ok(data),
            other => Err(DiffGuardError::DataTypeMismatch {
                expected: DType::F64,
                actual: other.dtype(),
                operation: "try_get_f64".to_string(),
            }),
        }
    }
}

fn widen<T: ToPrimitive>(data: &[T]) -> Vec<f64> {
    data.iter().map(|x| x.to_f64().unwrap_or(f64::NAN)).collect()
}
