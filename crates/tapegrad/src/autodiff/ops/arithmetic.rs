//! Differentiable element-wise arithmetic.
//!
//! Binary operations require both operands to have the same shape; use
//! [`crate::operations::expand`] on constants beforehand when broadcasting
//! is needed.

use super::{binary, unary};
use crate::autodiff::context::{OpContext, SavedValue};
use crate::autodiff::policy::{Backward, Op, Policy};
use crate::autodiff::tape::record;
use crate::autodiff::tensor::Traced;
use crate::error::Result;
use crate::operations;
use crate::tensor::DenseTensor;

/// `a + b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Add;

impl Policy for Add {
    fn name(&self) -> &'static str {
        "add"
    }

    fn forward(
        &self,
        _ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let (a, b) = binary(self.name(), inputs)?;
        operations::add(a, b)
    }

    fn backward(&self, _ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        Ok(Backward::Tuple(vec![Some(grad.clone()), Some(grad)]))
    }
}

/// `a - b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sub;

impl Policy for Sub {
    fn name(&self) -> &'static str {
        "sub"
    }

    fn forward(
        &self,
        _ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let (a, b) = binary(self.name(), inputs)?;
        operations::sub(a, b)
    }

    fn backward(&self, _ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let neg = operations::neg(&grad);
        Ok(Backward::Tuple(vec![Some(grad), Some(neg)]))
    }
}

/// `a * b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mul;

impl Policy for Mul {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let (a, b) = binary(self.name(), inputs)?;
        let out = operations::mul(a, b)?;
        ctx.save(vec![SavedValue::tensor(a), SavedValue::tensor(b)])?;
        Ok(out)
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let saved = ctx.release()?;
        let (a, b) = (saved.tensor(0)?, saved.tensor(1)?);
        Ok(Backward::Tuple(vec![
            Some(operations::mul(&grad, &b)?),
            Some(operations::mul(&grad, &a)?),
        ]))
    }
}

/// `a / b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Div;

impl Policy for Div {
    fn name(&self) -> &'static str {
        "div"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let (a, b) = binary(self.name(), inputs)?;
        let out = operations::div(a, b)?;
        ctx.save(vec![SavedValue::tensor(a), SavedValue::tensor(b)])?;
        Ok(out)
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let saved = ctx.release()?;
        let (a, b) = (saved.tensor(0)?, saved.tensor(1)?);
        let grad_a = operations::div(&grad, &b)?;
        // -g * a / b^2
        let grad_b = operations::neg(&operations::div(&operations::mul(&grad_a, &a)?, &b)?);
        Ok(Backward::Tuple(vec![Some(grad_a), Some(grad_b)]))
    }
}

/// `-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neg;

impl Policy for Neg {
    fn name(&self) -> &'static str {
        "neg"
    }

    fn forward(
        &self,
        _ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        Ok(operations::neg(unary(self.name(), inputs)?))
    }

    fn backward(&self, _ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        Ok(Backward::Single(operations::neg(&grad)))
    }
}

/// `exp(x)`. Saves its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exp;

impl Policy for Exp {
    fn name(&self) -> &'static str {
        "exp"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let out = operations::exp(unary(self.name(), inputs)?);
        ctx.save(vec![SavedValue::tensor(&out)])?;
        Ok(out)
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let out = ctx.release()?.tensor(0)?;
        Ok(Backward::Single(operations::mul(&grad, &out)?))
    }
}

/// Natural logarithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ln;

impl Policy for Ln {
    fn name(&self) -> &'static str {
        "ln"
    }

    fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        let x = unary(self.name(), inputs)?;
        ctx.save(vec![SavedValue::tensor(x)])?;
        Ok(operations::ln(x))
    }

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        let x = ctx.release()?.tensor(0)?;
        Ok(Backward::Single(operations::div(&grad, &x)?))
    }
}

/// Traced [`Add`].
pub fn add(a: &Traced, b: &Traced) -> Result<Traced> {
    record(Op::Add(Add), &[a, b])
}

/// Traced [`Sub`].
pub fn sub(a: &Traced, b: &Traced) -> Result<Traced> {
    record(Op::Sub(Sub), &[a, b])
}

/// Traced [`Mul`].
pub fn mul(a: &Traced, b: &Traced) -> Result<Traced> {
    record(Op::Mul(Mul), &[a, b])
}

/// Traced [`Div`].
pub fn div(a: &Traced, b: &Traced) -> Result<Traced> {
    record(Op::Div(Div), &[a, b])
}

/// Traced [`Neg`].
pub fn neg(x: &Traced) -> Result<Traced> {
    record(Op::Neg(Neg), &[x])
}

/// Traced [`Exp`].
pub fn exp(x: &Traced) -> Result<Traced> {
    record(Op::Exp(Exp), &[x])
}

/// Traced [`Ln`].
pub fn ln(x: &Traced) -> Result<Traced> {
    record(Op::Ln(Ln), &[x])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;
    use approx::assert_relative_eq;

    fn pair(policy: &dyn Policy, a: &DenseTensor<f64>, b: &DenseTensor<f64>) -> Vec<DenseTensor<f64>> {
        let mut ctx = OpContext::new();
        let out = policy.forward(&mut ctx, &[a, b]).unwrap();
        policy
            .backward(&mut ctx, out.ones_like())
            .unwrap()
            .into_per_parent(2)
            .into_iter()
            .map(|g| g.unwrap())
            .collect()
    }

    #[test]
    fn test_add_sub_backward() {
        let a = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let b = Tensor::from_vec(vec![3.0, 4.0], &[2]).unwrap();

        let g = pair(&Add, &a, &b);
        assert_eq!(g[0].data(), &[1.0, 1.0]);
        assert_eq!(g[1].data(), &[1.0, 1.0]);

        let g = pair(&Sub, &a, &b);
        assert_eq!(g[0].data(), &[1.0, 1.0]);
        assert_eq!(g[1].data(), &[-1.0, -1.0]);
    }

    #[test]
    fn test_mul_div_backward() {
        let a = Tensor::from_vec(vec![2.0, 3.0], &[2]).unwrap();
        let b = Tensor::from_vec(vec![4.0, 5.0], &[2]).unwrap();

        let g = pair(&Mul, &a, &b);
        assert_eq!(g[0].data(), b.data());
        assert_eq!(g[1].data(), a.data());

        let g = pair(&Div, &a, &b);
        assert_relative_eq!(g[0].data()[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(g[1].data()[0], -2.0 / 16.0, epsilon = 1e-12);
        assert_relative_eq!(g[1].data()[1], -3.0 / 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exp_ln_backward() {
        let x = Tensor::from_vec(vec![0.5, 2.0], &[2]).unwrap();

        let mut ctx = OpContext::new();
        let out = Exp.forward(&mut ctx, &[&x]).unwrap();
        let Backward::Single(g) = Exp.backward(&mut ctx, out.ones_like()).unwrap() else {
            panic!("exp should return a single gradient");
        };
        assert_relative_eq!(g.data()[1], 2.0f64.exp(), epsilon = 1e-12);
        assert!(ctx.is_released());

        let mut ctx = OpContext::new();
        let out = Ln.forward(&mut ctx, &[&x]).unwrap();
        let Backward::Single(g) = Ln.backward(&mut ctx, out.ones_like()).unwrap() else {
            panic!("ln should return a single gradient");
        };
        assert_relative_eq!(g.data()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_binary_shape_mismatch() {
        let a: DenseTensor<f64> = Tensor::ones(&[2]);
        let b: DenseTensor<f64> = Tensor::ones(&[3]);
        let mut ctx = OpContext::new();
        assert!(Mul.forward(&mut ctx, &[&a, &b]).is_err());
    }
}
