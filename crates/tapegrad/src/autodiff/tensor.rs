//! Traced - tensor with an optional tape handle.

use super::graph::TensorId;
use super::ops;
use crate::error::Result;
use crate::tensor::DenseTensor;
use std::fmt::Debug;

/// A tensor seen by a traced function.
///
/// Inputs of [`value_and_grad`](super::value_and_grad) and results of traced
/// operations carry a [`TensorId`]. Constants carry none and never receive
/// a gradient.
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::autodiff::Traced;
///
/// let c = Traced::constant(Tensor::ones(&[2, 3]));
/// assert!(!c.is_traced());
/// assert_eq!(c.shape(), &[2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Traced {
    tensor: DenseTensor<f64>,
    id: Option<TensorId>,
}

impl Traced {
    /// Wrap a tensor that is not differentiated.
    pub fn constant(tensor: DenseTensor<f64>) -> Self {
        Self { tensor, id: None }
    }

    pub(crate) fn tracked(tensor: DenseTensor<f64>, id: TensorId) -> Self {
        Self {
            tensor,
            id: Some(id),
        }
    }

    /// Get the underlying tensor.
    pub fn tensor(&self) -> &DenseTensor<f64> {
        &self.tensor
    }

    /// Consume and return the underlying tensor.
    pub fn into_tensor(self) -> DenseTensor<f64> {
        self.tensor
    }

    pub fn id(&self) -> Option<TensorId> {
        self.id
    }

    pub fn is_traced(&self) -> bool {
        self.id.is_some()
    }

    /// Same values, no handle.
    pub fn detach(&self) -> Self {
        Self::constant(self.tensor.clone())
    }

    pub fn shape(&self) -> &[usize] {
        self.tensor.shape()
    }

    pub fn ndim(&self) -> usize {
        self.tensor.ndim()
    }

    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        self.tensor.data()
    }

    pub fn item(&self) -> Option<f64> {
        self.tensor.item()
    }

    pub fn sum(&self, dim: Option<usize>, keepdim: bool) -> Result<Traced> {
        ops::sum(self, dim, keepdim)
    }

    pub fn mean(&self, dim: Option<usize>, keepdim: bool) -> Result<Traced> {
        ops::mean(self, dim, keepdim)
    }

    pub fn max(&self, dim: Option<usize>, keepdim: bool) -> Result<Traced> {
        ops::max(self, dim, keepdim)
    }

    pub fn add(&self, other: &Traced) -> Result<Traced> {
        ops::add(self, other)
    }

    pub fn sub(&self, other: &Traced) -> Result<Traced> {
        ops::sub(self, other)
    }

    pub fn mul(&self, other: &Traced) -> Result<Traced> {
        ops::mul(self, other)
    }

    pub fn div(&self, other: &Traced) -> Result<Traced> {
        ops::div(self, other)
    }

    pub fn neg(&self) -> Result<Traced> {
        ops::neg(self)
    }

    pub fn exp(&self) -> Result<Traced> {
        ops::exp(self)
    }

    pub fn ln(&self) -> Result<Traced> {
        ops::ln(self)
    }
}

/// Values a traced function may return.
///
/// Only values that expose a [`Traced`] tensor can be differentiated; the
/// others are implemented so that returning them is reported as an error
/// rather than rejected at compile time.
pub trait TensorLike: Debug {
    fn as_traced(&self) -> Option<&Traced>;
}

impl TensorLike for Traced {
    fn as_traced(&self) -> Option<&Traced> {
        Some(self)
    }
}

impl TensorLike for Option<Traced> {
    fn as_traced(&self) -> Option<&Traced> {
        self.as_ref()
    }
}

impl TensorLike for f64 {
    fn as_traced(&self) -> Option<&Traced> {
        None
    }
}

impl TensorLike for bool {
    fn as_traced(&self) -> Option<&Traced> {
        None
    }
}

impl TensorLike for () {
    fn as_traced(&self) -> Option<&Traced> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    #[test]
    fn test_constant() {
        let t = Traced::constant(Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap());
        assert!(t.id().is_none());
        assert_eq!(t.data(), &[1.0, 2.0]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_detach() {
        let t = Traced::tracked(Tensor::ones(&[2]), TensorId::new_for_test(3));
        let d = t.detach();
        assert!(t.is_traced());
        assert!(!d.is_traced());
        assert!(d.tensor().shares_storage_with(t.tensor()));
    }

    #[test]
    fn test_tensor_like() {
        let t = Traced::constant(Tensor::ones(&[1]));
        assert!(t.as_traced().is_some());
        assert!(Some(t.clone()).as_traced().is_some());
        assert!(None::<Traced>.as_traced().is_none());
        assert!(1.5f64.as_traced().is_none());
        assert!(true.as_traced().is_none());
        assert!(().as_traced().is_none());
    }

    #[test]
    fn test_method_without_tape() {
        let t = Traced::constant(Tensor::ones(&[2]));
        assert!(t.sum(None, false).is_err());
    }
}
