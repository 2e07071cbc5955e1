//! Reductions over one axis or over the whole tensor.
//!
//! `dim = None` reduces every axis. With `keepdim` the reduced axes stay in
//! the result with size 1; without it they are removed, so a full reduction
//! yields a rank-0 tensor.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::strides::{reduced_linear, reduced_shape};
use crate::tensor::DenseTensor;

fn check_dim<ElT: Scalar>(
    tensor: &DenseTensor<ElT>,
    dim: Option<usize>,
) -> Result<(), TensorError> {
    match dim {
        Some(d) if d >= tensor.ndim() => Err(TensorError::DimOutOfRange {
            dim: d,
            ndim: tensor.ndim(),
        }),
        _ => Ok(()),
    }
}

/// Number of input elements folded into each output element.
///
/// `dim` must already be checked against `shape`.
pub(crate) fn reduced_count(shape: &[usize], dim: Option<usize>) -> usize {
    match dim {
        Some(d) => shape[d],
        None => shape.iter().product(),
    }
}

/// Folds every reduction group with `combine`. Groups with no elements
/// (a zero-length reduced axis) come back as `None`.
fn fold<ElT: Scalar>(
    tensor: &DenseTensor<ElT>,
    dim: Option<usize>,
    keepdim: bool,
    combine: impl Fn(ElT, ElT) -> ElT,
) -> Result<(Vec<Option<ElT>>, Vec<usize>), TensorError> {
    check_dim(tensor, dim)?;
    let out_shape = reduced_shape(tensor.shape(), dim, keepdim);
    let mut acc: Vec<Option<ElT>> = vec![None; out_shape.iter().product()];
    for (linear, &x) in tensor.data().iter().enumerate() {
        let slot = &mut acc[reduced_linear(linear, tensor.shape(), dim)];
        *slot = Some(match *slot {
            Some(current) => combine(current, x),
            None => x,
        });
    }
    Ok((acc, out_shape))
}

fn finish<ElT: Scalar>(
    tensor: &DenseTensor<ElT>,
    data: Vec<ElT>,
    shape: &[usize],
) -> Result<DenseTensor<ElT>, TensorError> {
    Ok(DenseTensor::from_vec(data, shape)?.to_device(tensor.device()))
}

/// Sum of elements.
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::operations::sum;
///
/// // column-major [[1, 3], [2, 4]]
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// assert_eq!(sum(&t, None, false).unwrap().item(), Some(10.0));
/// assert_eq!(sum(&t, Some(0), false).unwrap().data(), &[3.0, 7.0]);
/// assert_eq!(sum(&t, Some(1), true).unwrap().shape(), &[2, 1]);
/// ```
pub fn sum<ElT: Scalar>(
    tensor: &DenseTensor<ElT>,
    dim: Option<usize>,
    keepdim: bool,
) -> Result<DenseTensor<ElT>, TensorError> {
    let (acc, shape) = fold(tensor, dim, keepdim, |a, b| a + b)?;
    let data = acc.into_iter().map(|x| x.unwrap_or_else(ElT::zero)).collect();
    finish(tensor, data, &shape)
}

/// Arithmetic mean of elements.
///
/// An empty group divides zero by zero and yields NaN.
pub fn mean<ElT: Scalar>(
    tensor: &DenseTensor<ElT>,
    dim: Option<usize>,
    keepdim: bool,
) -> Result<DenseTensor<ElT>, TensorError> {
    let total = sum(tensor, dim, keepdim)?;
    let count = ElT::from_f64(reduced_count(tensor.shape(), dim) as f64);
    Ok(super::apply(&total, |x| x / count))
}

/// Maximum of elements.
///
/// NaN wins over every other value, so any NaN in a group makes that
/// group's maximum NaN.
///
/// # Errors
///
/// `InvalidOperation` when a group has no elements, since an empty maximum
/// is undefined.
pub fn max<ElT: Scalar + PartialOrd>(
    tensor: &DenseTensor<ElT>,
    dim: Option<usize>,
    keepdim: bool,
) -> Result<DenseTensor<ElT>, TensorError> {
    let (acc, shape) = fold(tensor, dim, keepdim, |a, b| {
        if !a.is_nan() && (b.is_nan() || b > a) { b } else { a }
    })?;
    let data = acc
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            TensorError::InvalidOperation(format!(
                "max over an empty axis of a tensor with shape {:?}",
                tensor.shape()
            ))
        })?;
    finish(tensor, data, &shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;

    fn grid() -> DenseTensor<f64> {
        // [[1, 5, 3],
        //  [4, 2, 6]]
        Tensor::from_vec(vec![1.0, 4.0, 5.0, 2.0, 3.0, 6.0], &[2, 3]).unwrap()
    }

    #[test]
    fn test_sum_all() {
        let s = sum(&grid(), None, false).unwrap();
        assert_eq!(s.shape(), &[] as &[usize]);
        assert_eq!(s.item(), Some(21.0));

        let k = sum(&grid(), None, true).unwrap();
        assert_eq!(k.shape(), &[1, 1]);
    }

    #[test]
    fn test_sum_axis() {
        assert_eq!(sum(&grid(), Some(0), false).unwrap().data(), &[5.0, 7.0, 9.0]);
        let rows = sum(&grid(), Some(1), true).unwrap();
        assert_eq!(rows.shape(), &[2, 1]);
        assert_eq!(rows.data(), &[9.0, 12.0]);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&grid(), None, false).unwrap().item(), Some(3.5));
        assert_eq!(mean(&grid(), Some(1), false).unwrap().data(), &[3.0, 4.0]);
    }

    #[test]
    fn test_max() {
        assert_eq!(max(&grid(), None, false).unwrap().item(), Some(6.0));
        assert_eq!(max(&grid(), Some(0), false).unwrap().data(), &[4.0, 5.0, 6.0]);
        assert_eq!(max(&grid(), Some(1), false).unwrap().data(), &[5.0, 6.0]);
    }

    #[test]
    fn test_max_negative_values() {
        let t = Tensor::from_vec(vec![-3.0, -1.0, -2.0], &[3]).unwrap();
        assert_eq!(max(&t, None, false).unwrap().item(), Some(-1.0));
    }

    #[test]
    fn test_dim_out_of_range() {
        assert_eq!(
            sum(&grid(), Some(2), false).unwrap_err(),
            TensorError::DimOutOfRange { dim: 2, ndim: 2 }
        );
    }

    #[test]
    fn test_reduced_count() {
        assert_eq!(reduced_count(&[2, 3], None), 6);
        assert_eq!(reduced_count(&[2, 3], Some(1)), 3);
    }

    fn empty_rows() -> DenseTensor<f64> {
        Tensor::zeros(&[2, 0])
    }

    #[test]
    fn test_sum_zero_length_axis() {
        assert_eq!(sum(&empty_rows(), None, false).unwrap().item(), Some(0.0));

        let cols = sum(&empty_rows(), Some(0), false).unwrap();
        assert_eq!(cols.shape(), &[0]);
        assert!(cols.is_empty());

        assert_eq!(sum(&empty_rows(), Some(1), false).unwrap().data(), &[0.0, 0.0]);
    }

    #[test]
    fn test_mean_zero_length_axis() {
        assert!(mean(&empty_rows(), None, false).unwrap().item().unwrap().is_nan());
        assert!(mean(&empty_rows(), Some(0), false).unwrap().is_empty());

        let rows = mean(&empty_rows(), Some(1), true).unwrap();
        assert_eq!(rows.shape(), &[2, 1]);
        assert!(rows.data().iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_max_zero_length_axis() {
        assert!(matches!(
            max(&empty_rows(), None, false),
            Err(TensorError::InvalidOperation(_))
        ));
        assert!(matches!(
            max(&empty_rows(), Some(1), false),
            Err(TensorError::InvalidOperation(_))
        ));
        // nothing to reduce in any output slot
        assert_eq!(max(&empty_rows(), Some(0), false).unwrap().shape(), &[0]);
    }

    #[test]
    fn test_max_propagates_nan() {
        let t = Tensor::from_vec(vec![1.0, f64::NAN, 3.0], &[3]).unwrap();
        assert!(max(&t, None, false).unwrap().item().unwrap().is_nan());

        let first = Tensor::from_vec(vec![f64::NAN, 5.0], &[2]).unwrap();
        assert!(max(&first, None, false).unwrap().item().unwrap().is_nan());

        // [[1, NaN], [4, 2]]: only the column holding NaN is affected
        let g = Tensor::from_vec(vec![1.0, 4.0, f64::NAN, 2.0], &[2, 2]).unwrap();
        let cols = max(&g, Some(0), false).unwrap();
        assert_eq!(cols.data()[0], 4.0);
        assert!(cols.data()[1].is_nan());
    }
}
