//! Differentiable operations.

mod arithmetic;
mod reductions;

pub use arithmetic::{Add, Div, Exp, Ln, Mul, Neg, Sub, add, div, exp, ln, mul, neg, sub};
pub use reductions::{Max, Mean, Sum, max, mean, sum};

use crate::error::{Result, TensorError};
use crate::tensor::DenseTensor;

fn unary<'a>(name: &str, inputs: &[&'a DenseTensor<f64>]) -> Result<&'a DenseTensor<f64>> {
    match inputs {
        &[x] => Ok(x),
        _ => Err(arity(name, 1, inputs.len())),
    }
}

fn binary<'a>(
    name: &str,
    inputs: &[&'a DenseTensor<f64>],
) -> Result<(&'a DenseTensor<f64>, &'a DenseTensor<f64>)> {
    match inputs {
        &[a, b] => Ok((a, b)),
        _ => Err(arity(name, 2, inputs.len())),
    }
}

fn arity(name: &str, expected: usize, actual: usize) -> TensorError {
    TensorError::InvalidOperation(format!(
        "{name} takes {expected} tensor input(s), got {actual}"
    ))
}
