//! Saved tensor for backward pass.

use crate::tensor::DenseTensor;
use std::rc::{Rc, Weak};

/// Tensor kept by an operation between its forward and backward calls.
///
/// Uses `Rc` because tapes are thread-local. A [`Weak`] handle from
/// [`SavedTensor::downgrade`] tells whether the saved copy is still alive.
#[derive(Debug, Clone)]
pub struct SavedTensor {
    data: Rc<DenseTensor<f64>>,
}

impl SavedTensor {
    /// Save a tensor. The buffer is shared, not copied.
    pub fn new(tensor: DenseTensor<f64>) -> Self {
        Self {
            data: Rc::new(tensor),
        }
    }

    /// Get reference to saved data.
    pub fn get(&self) -> &DenseTensor<f64> {
        &self.data
    }

    /// Materialize saved tensor as an owned `DenseTensor`.
    pub fn materialize(&self) -> DenseTensor<f64> {
        self.data.as_ref().clone()
    }

    /// Non-owning handle to the saved tensor.
    pub fn downgrade(&self) -> Weak<DenseTensor<f64>> {
        Rc::downgrade(&self.data)
    }
}

impl From<DenseTensor<f64>> for SavedTensor {
    fn from(tensor: DenseTensor<f64>) -> Self {
        Self::new(tensor)
    }
}
