//! Differentiable reductions.
//!
//! All three share the same gradient shape handling: when an axis was
//! reduced without `keepdim`, the incoming gradient is unsqueezed at that
//! axis first, then broadcast back to the input shape.

use super::unary;
use crate::autodiff::context::{OpContext, SavedValue};
use crate::autodiff::policy::{Backward, Op, Policy};
use crate::autodiff::tape::record;
use crate::autodiff::tensor::Traced;
use crate::error::Result;
use crate::operations;
use crate::tensor::DenseTensor;

fn restore_axis(
    grad: DenseTensor<f64>,
    dim: Option<usize>,
    keepdim: bool,
) -> Result<DenseTensor<f64>> {
    match dim {
        Some(d) if !keepdim => grad.unsqueeze(d),
        _ => Ok(grad),
    }
}

/// Sum over `dim`, or over everything when `dim` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum {
    pub dim: Option<usize>,
    pub keepdim: bool,
}

impl Policy for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let x = unary(self.name(), inputs)?;
        let out = operations::sum(x, self.dim, self.keepdim)?;
        ctx.save(vec![SavedValue::Shape(x.shape().to_vec())])?;
        Ok(out)
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let saved = ctx.release()?;
        let grad = restore_axis(grad, self.dim, self.keepdim)?;
        Ok(Backward::Single(operations::expand(&grad, saved.shape(0)?)?))
    }
}

/// Mean over `dim`, or over everything when `dim` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mean {
    pub dim: Option<usize>,
    pub keepdim: bool,
}

impl Policy for Mean {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let x = unary(self.name(), inputs)?;
        let out = operations::mean(x, self.dim, self.keepdim)?;
        ctx.save(vec![SavedValue::Shape(x.shape().to_vec())])?;
        Ok(out)
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let saved = ctx.release()?;
        let shape = saved.shape(0)?;
        let count = operations::reduced_count(shape, self.dim) as f64;
        let grad = restore_axis(grad, self.dim, self.keepdim)?;
        let spread = operations::expand(&grad, shape)?;
        Ok(Backward::Single(operations::scale(&spread, 1.0 / count)))
    }
}

/// Maximum over `dim`, or over everything when `dim` is `None`.
///
/// Every element equal to the maximum gets the full gradient, so ties are
/// not split. When the maximum is NaN the NaN elements get it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Max {
    pub dim: Option<usize>,
    pub keepdim: bool,
}

impl Policy for Max {
    fn name(&self) -> &'static str {
        "max"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let x = unary(self.name(), inputs)?;
        let out = operations::max(x, self.dim, self.keepdim)?;
        ctx.save(vec![SavedValue::tensor(x), SavedValue::tensor(&out)])?;
        Ok(out)
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let saved = ctx.release()?;
        let x = saved.tensor(0)?;
        let out = restore_axis(saved.tensor(1)?, self.dim, self.keepdim)?;
        let grad = restore_axis(grad, self.dim, self.keepdim)?;

        let mask = operations::eq_mask(&x, &operations::expand(&out, x.shape())?)?;
        let grad = operations::expand(&grad, x.shape())?;
        Ok(Backward::Single(operations::mul(&grad, &mask)?))
    }
}

/// Traced [`Sum`].
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::autodiff::{ops, value_and_grad};
///
/// let x = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// let (value, grad) = value_and_grad(|xs| ops::sum(&xs[0], None, false))
///     .call(&[x])
///     .unwrap();
/// assert_eq!(value.item(), Some(10.0));
/// assert!(grad.into_vec()[0].data().iter().all(|&g| g == 1.0));
/// ```
pub fn sum(x: &Traced, dim: Option<usize>, keepdim: bool) -> Result<Traced> {
    record(Op::Sum(Sum { dim, keepdim }), &[x])
}

/// Traced [`Mean`].
pub fn mean(x: &Traced, dim: Option<usize>, keepdim: bool) -> Result<Traced> {
    record(Op::Mean(Mean { dim, keepdim }), &[x])
}

/// Traced [`Max`].
pub fn max(x: &Traced, dim: Option<usize>, keepdim: bool) -> Result<Traced> {
    record(Op::Max(Max { dim, keepdim }), &[x])
}
