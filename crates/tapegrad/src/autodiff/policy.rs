//! Forward/backward rule pairs and the tagged record the tape stores.

use super::context::OpContext;
use super::ops::{Add, Div, Exp, Ln, Max, Mean, Mul, Neg, Sub, Sum};
use crate::error::Result;
use crate::tensor::DenseTensor;
use std::fmt::Debug;

/// Gradients produced by one backward step.
#[derive(Debug, Clone)]
pub enum Backward {
    /// No gradient flows to any input.
    None,
    /// Gradient for the first input only.
    Single(DenseTensor<f64>),
    /// One entry per positional input. May be shorter than the input count.
    Tuple(Vec<Option<DenseTensor<f64>>>),
}

impl Backward {
    /// One optional gradient per parent, padded with `None` or truncated to `arity`.
    pub fn into_per_parent(self, arity: usize) -> Vec<Option<DenseTensor<f64>>> {
        let mut grads = match self {
            Backward::None => Vec::new(),
            Backward::Single(g) => vec![Some(g)],
            Backward::Tuple(gs) => gs,
        };
        grads.resize(arity, None);
        grads
    }
}

/// Numeric rule of a differentiable operation.
///
/// Non-tensor arguments (axis, keepdim, ...) live on the implementing type.
/// `forward` may stash values in the context; `backward` receives the same
/// context and the gradient of the output.
pub trait Policy: Debug {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    fn forward(&self, ctx: &mut OpContext, inputs: &[&DenseTensor<f64>])
    -> Result<DenseTensor<f64>>;

    fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward>;
}

/// Policy record stored in a graph node.
#[derive(Debug)]
pub enum Op {
    Sum(Sum),
    Mean(Mean),
    Max(Max),
    Add(Add),
    Sub(Sub),
    Mul(Mul),
    Div(Div),
    Neg(Neg),
    Exp(Exp),
    Ln(Ln),
    Custom(Box<dyn Policy>),
}

impl Op {
    /// Wrap a user-defined policy.
    pub fn custom<P: Policy + 'static>(policy: P) -> Self {
        Op::Custom(Box::new(policy))
    }

    fn policy(&self) -> &dyn Policy {
        match self {
            Op::Sum(p) => p,
            Op::Mean(p) => p,
            Op::Max(p) => p,
            Op::Add(p) => p,
            Op::Sub(p) => p,
            Op::Mul(p) => p,
            Op::Div(p) => p,
            Op::Neg(p) => p,
            Op::Exp(p) => p,
            Op::Ln(p) => p,
            Op::Custom(p) => p.as_ref(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.policy().name()
    }

    pub fn forward(
        &self,
        ctx: &mut OpContext,
        inputs: &[&DenseTensor<f64>],
    ) -> Result<DenseTensor<f64>> {
        self.policy().forward(ctx, inputs)
    }

    pub fn backward(&self, ctx: &mut OpContext, grad: DenseTensor<f64>) -> Result<Backward> {
        self.policy().backward(ctx, grad)
    }
}
