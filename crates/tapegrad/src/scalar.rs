//! Scalar trait for tensor element types.

use faer_traits::ComplexField;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for element types stored in a [`Tensor`](crate::Tensor).
///
/// Builds on faer's `ComplexField` and adds the operator bounds the
/// elementwise kernels and reductions rely on.
pub trait Scalar:
    ComplexField
    + Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::zero_impl()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self {
        Self::one_impl()
    }

    /// Embed a real number (used for element counts in `mean`).
    fn from_f64(value: f64) -> Self {
        Self::from_f64_impl(value)
    }

    /// Whether the value is NaN.
    fn is_nan(self) -> bool {
        Self::is_nan_impl(&self)
    }
}

impl Scalar for f64 {}
