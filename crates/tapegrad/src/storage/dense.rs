//! Dense storage for tensor data.

use crate::scalar::Scalar;
use std::sync::Arc;

/// Dense storage - contiguous array of elements in column-major order.
///
/// Elements sit behind an `Arc`, so views are free and the first write
/// through a shared handle copies the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<ElT: Scalar> {
    data: Arc<Vec<ElT>>,
}

impl<ElT: Scalar> Dense<ElT> {
    /// Create dense storage with given length, zero-initialized.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: Arc::new(vec![ElT::zero(); len]),
        }
    }

    /// Create dense storage from existing vector (takes ownership).
    pub fn from_vec(data: Vec<ElT>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Length of storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get immutable slice of data.
    #[inline]
    pub fn as_slice(&self) -> &[ElT] {
        &self.data
    }

    /// Get mutable slice of data, copying first if the buffer is shared.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [ElT] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// A second handle on the same buffer.
    #[inline]
    pub fn view(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }

    /// Whether both handles point at the same buffer.
    #[inline]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Whether more than one handle points at this buffer.
    #[inline]
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.data) > 1
    }
}

impl<ElT: Scalar> std::ops::Index<usize> for Dense<ElT> {
    type Output = ElT;

    #[inline]
    fn index(&self, i: usize) -> &ElT {
        &self.data[i]
    }
}
