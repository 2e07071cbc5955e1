//! Storage types for tensor data.
//!
//! Storage is always a flat, column-major vector of elements; shape and
//! strides live on the [`Tensor`](crate::Tensor) wrapper.

mod dense;

use crate::scalar::Scalar;

pub use dense::Dense;

/// Trait for tensor storage types.
pub trait TensorStorage<T: Scalar>: Clone + std::fmt::Debug {
    /// Create storage with given length, zero-initialized.
    fn zeros(len: usize) -> Self;

    /// Create storage from existing vector.
    fn from_vec(data: Vec<T>) -> Self;

    /// Length of storage (number of elements).
    fn len(&self) -> usize;

    /// Check if storage is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get immutable slice of data.
    fn as_slice(&self) -> &[T];

    /// Get mutable slice of data.
    ///
    /// Storage shared with other tensors is copied first.
    fn as_mut_slice(&mut self) -> &mut [T];

    /// Another handle on the same elements, without copying.
    fn view(&self) -> Self;

    /// Whether `self` and `other` read the same elements.
    fn shares_storage_with(&self, other: &Self) -> bool;

    /// Whether any other handle reads these elements.
    fn is_shared(&self) -> bool;
}

impl<T: Scalar> TensorStorage<T> for Dense<T> {
    fn zeros(len: usize) -> Self {
        Dense::zeros(len)
    }

    fn from_vec(data: Vec<T>) -> Self {
        Dense::from_vec(data)
    }

    fn len(&self) -> usize {
        Dense::len(self)
    }

    fn as_slice(&self) -> &[T] {
        Dense::as_slice(self)
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        Dense::as_mut_slice(self)
    }

    fn view(&self) -> Self {
        Dense::view(self)
    }

    fn shares_storage_with(&self, other: &Self) -> bool {
        Dense::shares_storage_with(self, other)
    }

    fn is_shared(&self) -> bool {
        Dense::is_shared(self)
    }
}
