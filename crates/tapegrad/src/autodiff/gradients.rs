//! Gradient storage container.

use super::graph::TensorId;
use crate::error::Result;
use crate::operations::add_assign;
use crate::tensor::DenseTensor;
use std::collections::HashMap;

/// Container for accumulated gradients.
///
/// Stores gradients keyed by [`TensorId`], with in-place accumulation
/// for tensors with multiple downstream paths.
#[derive(Debug, Default)]
pub struct Gradients {
    grads: HashMap<TensorId, DenseTensor<f64>>,
}

impl Gradients {
    /// Create empty gradient container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate gradient for a tensor.
    ///
    /// If a gradient already exists, adds to it in place. With `safe`, the
    /// incoming gradient is copied into fresh storage first so the entry never
    /// shares a buffer with the caller's tensor.
    pub fn accumulate(&mut self, id: TensorId, grad: DenseTensor<f64>, safe: bool) -> Result<()> {
        let grad = if safe { grad.deep_copy() } else { grad };
        match self.grads.get_mut(&id) {
            Some(existing) => add_assign(existing, &grad),
            None => {
                self.grads.insert(id, grad);
                Ok(())
            }
        }
    }

    /// Get gradient for a tensor.
    pub fn get(&self, id: TensorId) -> Option<&DenseTensor<f64>> {
        self.grads.get(&id)
    }

    /// Remove and return gradient (for passing to backward functions).
    pub fn remove(&mut self, id: TensorId) -> Option<DenseTensor<f64>> {
        self.grads.remove(&id)
    }

    /// Check if gradient exists for a tensor.
    pub fn contains(&self, id: TensorId) -> bool {
        self.grads.contains_key(&id)
    }

    /// Number of stored gradients.
    pub fn len(&self) -> usize {
        self.grads.len()
    }

    /// Check if no gradients stored.
    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    #[test]
    fn test_gradients_new() {
        let grads = Gradients::new();
        assert!(grads.is_empty());
        assert_eq!(grads.len(), 0);
    }

    #[test]
    fn test_gradients_accumulate_multiple() {
        let mut grads = Gradients::new();
        let id = TensorId::new_for_test(0);
        let grad1: DenseTensor<f64> = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let grad2: DenseTensor<f64> = Tensor::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();

        grads.accumulate(id, grad1.clone(), false).unwrap();
        grads.accumulate(id, grad2, false).unwrap();

        assert_eq!(grads.get(id).unwrap().data(), &[5.0, 7.0, 9.0]);
        // the first gradient's buffer is copied before the in-place add
        assert_eq!(grad1.data(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_gradients_safe_copies() {
        let mut grads = Gradients::new();
        let id = TensorId::new_for_test(1);
        let grad: DenseTensor<f64> = Tensor::ones(&[2]);

        grads.accumulate(id, grad.clone(), true).unwrap();
        assert!(!grads.get(id).unwrap().shares_storage_with(&grad));

        let mut unsafe_grads = Gradients::new();
        unsafe_grads.accumulate(id, grad.clone(), false).unwrap();
        assert!(unsafe_grads.get(id).unwrap().shares_storage_with(&grad));
    }

    #[test]
    fn test_gradients_shape_mismatch() {
        let mut grads = Gradients::new();
        let id = TensorId::new_for_test(0);
        grads.accumulate(id, Tensor::ones(&[2]), false).unwrap();
        assert!(grads.accumulate(id, Tensor::ones(&[3]), false).is_err());
    }

    #[test]
    fn test_gradients_remove() {
        let mut grads = Gradients::new();
        let id = TensorId::new_for_test(0);
        grads.accumulate(id, Tensor::ones(&[3]), false).unwrap();

        let removed = grads.remove(id);
        assert!(removed.is_some());
        assert!(!grads.contains(id));
        assert!(grads.remove(id).is_none());
    }
}
