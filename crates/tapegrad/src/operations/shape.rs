//! Broadcasting.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::strides::broadcast_linear;
use crate::tensor::DenseTensor;

/// Broadcast `tensor` to `target`.
///
/// Shapes are right-aligned; every source axis must be 1 or equal to the
/// matching target axis, and missing leading axes are repeated.
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::operations::expand;
///
/// let col = Tensor::from_vec(vec![1.0, 2.0], &[2, 1]).unwrap();
/// let grid = expand(&col, &[2, 3]).unwrap();
/// assert_eq!(grid.data(), &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
/// ```
pub fn expand<ElT: Scalar>(
    tensor: &DenseTensor<ElT>,
    target: &[usize],
) -> Result<DenseTensor<ElT>, TensorError> {
    let source = tensor.shape();
    let mismatch = || TensorError::BroadcastMismatch {
        from: source.to_vec(),
        to: target.to_vec(),
    };
    if source.len() > target.len() {
        return Err(mismatch());
    }
    let offset = target.len() - source.len();
    for (axis, &size) in source.iter().enumerate() {
        if size != 1 && size != target[axis + offset] {
            return Err(mismatch());
        }
    }
    if source == target {
        return Ok(tensor.clone());
    }

    let mut out = DenseTensor::zeros(target).to_device(tensor.device());
    let src = tensor.data();
    for (linear, slot) in out.data_mut().iter_mut().enumerate() {
        *slot = src[broadcast_linear(linear, target, source)];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    #[test]
    fn test_expand_scalar() {
        let s: DenseTensor<f64> = Tensor::scalar(2.0);
        let e = expand(&s, &[2, 2]).unwrap();
        assert_eq!(e.shape(), &[2, 2]);
        assert!(e.data().iter().all(|&x| x == 2.0));
    }

    #[test]
    fn test_expand_row() {
        let row = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[1, 3]).unwrap();
        let e = expand(&row, &[2, 3]).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(e.get(&[i, j]), row.get(&[0, j]));
            }
        }
    }

    #[test]
    fn test_expand_missing_leading_axis() {
        let v = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let e = expand(&v, &[2, 3]).unwrap();
        assert_eq!(e.get(&[1, 2]), Some(&3.0));
    }

    #[test]
    fn test_expand_same_shape_is_view() {
        let v = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let e = expand(&v, &[2]).unwrap();
        assert!(e.shares_storage_with(&v));
    }

    #[test]
    fn test_expand_incompatible() {
        let v: DenseTensor<f64> = Tensor::zeros(&[2]);
        assert!(matches!(
            expand(&v, &[3]),
            Err(TensorError::BroadcastMismatch { .. })
        ));
        assert!(expand(&v, &[]).is_err());
    }
}
