//! Element-wise tensor operations.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

fn check_same_shape<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<(), TensorError> {
    if a.shape() != b.shape() {
        return Err(TensorError::OperandShapes {
            lhs: a.shape().to_vec(),
            rhs: b.shape().to_vec(),
        });
    }
    Ok(())
}

fn with_data<ElT: Scalar>(like: &DenseTensor<ElT>, data: Vec<ElT>) -> DenseTensor<ElT> {
    // data.len() == like.len() at every call site
    let mut out = DenseTensor::zeros(like.shape()).to_device(like.device());
    out.data_mut().copy_from_slice(&data);
    out
}

/// Apply a function to each element, returning a new tensor.
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::operations::apply;
///
/// let t = Tensor::from_vec(vec![1.0, 4.0, 9.0], &[3]).unwrap();
/// let ts = apply(&t, |x: f64| x.sqrt());
/// assert_eq!(ts.data(), &[1.0, 2.0, 3.0]);
/// ```
pub fn apply<ElT: Scalar, F>(tensor: &DenseTensor<ElT>, f: F) -> DenseTensor<ElT>
where
    F: Fn(ElT) -> ElT,
{
    let data: Vec<ElT> = tensor.data().iter().map(|&x| f(x)).collect();
    with_data(tensor, data)
}

/// Combine two equally shaped tensors element-wise.
///
/// # Errors
///
/// `TensorError::OperandShapes` if the shapes differ.
pub fn apply_binary<ElT: Scalar, F>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
    f: F,
) -> Result<DenseTensor<ElT>, TensorError>
where
    F: Fn(ElT, ElT) -> ElT,
{
    check_same_shape(a, b)?;
    let data: Vec<ElT> = a
        .data()
        .iter()
        .zip(b.data().iter())
        .map(|(&x, &y)| f(x, y))
        .collect();
    Ok(with_data(a, data))
}

/// `a + b`.
pub fn add<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<DenseTensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x + y)
}

/// `a - b`.
pub fn sub<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<DenseTensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x - y)
}

/// `a * b`.
pub fn mul<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<DenseTensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x * y)
}

/// `a / b`.
pub fn div<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<DenseTensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| x / y)
}

/// `-t`.
pub fn neg<ElT: Scalar>(tensor: &DenseTensor<ElT>) -> DenseTensor<ElT> {
    apply(tensor, |x| -x)
}

/// Multiply all elements by a scalar.
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::operations::scale;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// assert_eq!(scale(&t, 2.0).data(), &[2.0, 4.0, 6.0]);
/// ```
pub fn scale<ElT: Scalar>(tensor: &DenseTensor<ElT>, alpha: ElT) -> DenseTensor<ElT> {
    apply(tensor, |x| x * alpha)
}

/// One where `a == b`, zero elsewhere. Two NaNs count as equal.
pub fn eq_mask<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<DenseTensor<ElT>, TensorError> {
    apply_binary(a, b, |x, y| {
        if x == y || (x.is_nan() && y.is_nan()) {
            ElT::one()
        } else {
            ElT::zero()
        }
    })
}

/// Element-wise natural exponential.
pub fn exp(tensor: &DenseTensor<f64>) -> DenseTensor<f64> {
    apply(tensor, f64::exp)
}

/// Element-wise natural logarithm.
pub fn ln(tensor: &DenseTensor<f64>) -> DenseTensor<f64> {
    apply(tensor, f64::ln)
}

/// `a += b` in place.
///
/// Copies `a`'s buffer first if it is shared with another tensor.
pub fn add_assign<ElT: Scalar>(
    a: &mut DenseTensor<ElT>,
    b: &DenseTensor<ElT>,
) -> Result<(), TensorError> {
    check_same_shape(a, b)?;
    for (x, &y) in a.data_mut().iter_mut().zip(b.data().iter()) {
        *x = *x + y;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;
    use crate::device::Device;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply() {
        let t = DenseTensor::from_vec(vec![1.0, 4.0, 9.0], &[3]).unwrap();
        let ts = apply(&t, |x: f64| x.sqrt());
        assert_relative_eq!(ts.data()[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(ts.data()[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_arithmetic() {
        let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();
        assert_eq!(add(&a, &b).unwrap().data(), &[5.0, 7.0, 9.0]);
        assert_eq!(sub(&a, &b).unwrap().data(), &[-3.0, -3.0, -3.0]);
        assert_eq!(mul(&a, &b).unwrap().data(), &[4.0, 10.0, 18.0]);
        assert_eq!(div(&b, &a).unwrap().data(), &[4.0, 2.5, 2.0]);
        assert_eq!(neg(&a).data(), &[-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_apply_binary_shape_mismatch() {
        let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![4.0, 5.0], &[2]).unwrap();
        assert_eq!(
            add(&a, &b).unwrap_err(),
            TensorError::OperandShapes {
                lhs: vec![3],
                rhs: vec![2]
            }
        );
    }

    #[test]
    fn test_exp_ln() {
        let t = DenseTensor::from_vec(vec![0.0, 1.0, 2.0], &[3]).unwrap();
        let back = ln(&exp(&t));
        for (x, y) in back.data().iter().zip(t.data()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eq_mask() {
        let a = DenseTensor::from_vec(vec![1.0, 3.0, 3.0, 2.0], &[4]).unwrap();
        let b = DenseTensor::full(&[4], 3.0);
        assert_eq!(eq_mask(&a, &b).unwrap().data(), &[0.0, 1.0, 1.0, 0.0]);

        let n = DenseTensor::from_vec(vec![f64::NAN, 1.0], &[2]).unwrap();
        let m = DenseTensor::full(&[2], f64::NAN);
        assert_eq!(eq_mask(&n, &m).unwrap().data(), &[1.0, 0.0]);
    }

    #[test]
    fn test_add_assign_copies_shared_buffer() {
        let mut a = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let alias = a.clone();
        let b = DenseTensor::from_vec(vec![10.0, 20.0], &[2]).unwrap();

        add_assign(&mut a, &b).unwrap();

        assert_eq!(a.data(), &[11.0, 22.0]);
        assert_eq!(alias.data(), &[1.0, 2.0]);
    }

    #[test]
    fn test_result_keeps_first_operand_device() {
        let a: DenseTensor<f64> = Tensor::ones(&[2]).to_device(Device::Accelerator(1));
        let b: DenseTensor<f64> = Tensor::ones(&[2]);
        assert_eq!(add(&a, &b).unwrap().device(), Device::Accelerator(1));
        assert_eq!(scale(&a, 2.0).device(), Device::Accelerator(1));
    }
}
