//! N-dimensional tensor type.
//!
//! ```text
//! Tensor<ElT, StoreT: TensorStorage>
//! └── DenseTensor = Tensor<ElT, Dense<ElT>>
//! ```
//!
//! Tensors are column-major. Every tensor carries a [`Device`] tag that
//! operations propagate from their first operand.

use crate::device::Device;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::storage::{Dense, TensorStorage};
use crate::strides::{cartesian_to_linear, compute_strides};
use std::marker::PhantomData;

/// A n-dimensional tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<ElT: Scalar, StoreT: TensorStorage<ElT> = Dense<ElT>> {
    storage: StoreT,
    shape: Vec<usize>,
    strides: Vec<usize>,
    device: Device,
    _phantom: PhantomData<ElT>,
}

/// Type alias for dense tensors.
pub type DenseTensor<ElT> = Tensor<ElT, Dense<ElT>>;

impl<ElT: Scalar> Tensor<ElT, Dense<ElT>> {
    /// Create a new tensor with the given shape, zero-initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapegrad::Tensor;
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        // empty shape: rank 0, one element
        let len: usize = shape.iter().product();
        Self {
            storage: Dense::zeros(len),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            device: Device::Cpu,
            _phantom: PhantomData,
        }
    }

    /// Create tensor from column-major data and shape.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if data length doesn't match shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapegrad::{DenseTensor, Tensor};
    ///
    /// let t: DenseTensor<f64> = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[1, 0]), Some(&2.0)); // Column-major: [1,0] is second element
    /// assert_eq!(t.get(&[0, 1]), Some(&3.0));
    /// ```
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(TensorError::ShapeMismatch {
                expected: expected_len,
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: Dense::from_vec(data),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            device: Device::Cpu,
            _phantom: PhantomData,
        })
    }

    /// Create a rank-0 tensor holding one value.
    pub fn scalar(value: ElT) -> Self {
        Self {
            storage: Dense::from_vec(vec![value]),
            shape: Vec::new(),
            strides: Vec::new(),
            device: Device::Cpu,
            _phantom: PhantomData,
        }
    }

    /// Create a tensor filled with `value`.
    pub fn full(shape: &[usize], value: ElT) -> Self {
        let mut t = Self::zeros(shape);
        t.fill(value);
        t
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, ElT::one())
    }

    /// Ones with this tensor's shape and device.
    pub fn ones_like(&self) -> Self {
        Self::ones(&self.shape).to_device(self.device)
    }

    /// Zeros with this tensor's shape and device.
    pub fn zeros_like(&self) -> Self {
        Self::zeros(&self.shape).to_device(self.device)
    }
}

impl<ElT: Scalar, StoreT: TensorStorage<ElT>> Tensor<ElT, StoreT> {
    /// Get the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if tensor is empty (has zero elements).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Device this tensor is placed on.
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    /// Whether this tensor is placed on an accelerator.
    #[inline]
    pub fn is_accelerator(&self) -> bool {
        self.device.is_accelerator()
    }

    /// Retag the tensor with a new device.
    pub fn to_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Get underlying data as slice.
    #[inline]
    pub fn data(&self) -> &[ElT] {
        self.storage.as_slice()
    }

    /// Get underlying data as mutable slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        self.storage.as_mut_slice()
    }

    /// Get element by linear index.
    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&ElT> {
        self.storage.as_slice().get(i)
    }

    /// The single element of a one-element tensor.
    pub fn item(&self) -> Option<ElT> {
        match self.data() {
            [x] => Some(*x),
            _ => None,
        }
    }

    fn check_indices(&self, indices: &[usize]) -> Result<usize, TensorError> {
        if indices.len() != self.ndim() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        for (&idx, &dim) in indices.iter().zip(self.shape.iter()) {
            if idx >= dim {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    dim_size: dim,
                });
            }
        }
        Ok(cartesian_to_linear(indices, &self.strides))
    }

    /// Get element by cartesian indices.
    ///
    /// Returns `None` if indices are out of bounds or wrong number of indices.
    pub fn get(&self, indices: &[usize]) -> Option<&ElT> {
        let linear = self.check_indices(indices).ok()?;
        self.get_linear(linear)
    }

    /// Set element by cartesian indices.
    ///
    /// # Errors
    ///
    /// Returns error if indices are out of bounds or wrong number of indices.
    pub fn set(&mut self, indices: &[usize], value: ElT) -> Result<(), TensorError> {
        let linear = self.check_indices(indices)?;
        self.storage.as_mut_slice()[linear] = value;
        Ok(())
    }

    /// Fill all elements with a value.
    pub fn fill(&mut self, value: ElT) {
        for x in self.storage.as_mut_slice() {
            *x = value;
        }
    }

    /// Reshape the tensor (zero-copy view).
    ///
    /// # Errors
    ///
    /// Returns an error if the total number of elements doesn't match.
    ///
    /// # Example
    ///
    /// ```
    /// use tapegrad::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t3x2 = t.reshape(&[3, 2]).unwrap();
    /// assert_eq!(t3x2.shape(), &[3, 2]);
    /// assert!(t.shares_storage_with(&t3x2));
    /// ```
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self, TensorError> {
        let new_len: usize = new_shape.iter().product();
        if self.len() != new_len {
            return Err(TensorError::ShapeMismatch {
                expected: self.len(),
                actual: new_len,
            });
        }
        Ok(Self {
            storage: self.storage.view(),
            shape: new_shape.to_vec(),
            strides: compute_strides(new_shape),
            device: self.device,
            _phantom: PhantomData,
        })
    }

    /// Insert a size-1 axis at `dim` (zero-copy view).
    ///
    /// `dim` may equal `ndim()` to append a trailing axis.
    pub fn unsqueeze(&self, dim: usize) -> Result<Self, TensorError> {
        if dim > self.ndim() {
            return Err(TensorError::DimOutOfRange {
                dim,
                ndim: self.ndim(),
            });
        }
        let mut shape = self.shape.clone();
        shape.insert(dim, 1);
        self.reshape(&shape)
    }

    /// Check if this tensor shares storage with another tensor.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        self.storage.shares_storage_with(&other.storage)
    }

    /// Check if this tensor's storage is shared with other tensors.
    pub fn is_view(&self) -> bool {
        self.storage.is_shared()
    }

    /// Copy the elements into a freshly allocated buffer.
    pub fn deep_copy(&self) -> Self {
        Self {
            storage: StoreT::from_vec(self.data().to_vec()),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            device: self.device,
            _phantom: PhantomData,
        }
    }
}
