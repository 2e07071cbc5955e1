//! Reverse pass: run a traced function and return its value and gradients.

use super::config::GradConfig;
use super::gradients::Gradients;
use super::graph::Tape;
use super::tape::TapeGuard;
use super::tensor::{TensorLike, Traced};
use crate::device::release_device_cache;
use crate::error::{Result, TensorError};
use crate::tensor::DenseTensor;
use log::{debug, trace, warn};

/// Gradients with respect to the inputs of a traced call.
#[derive(Debug, Clone, PartialEq)]
pub enum GradOutput {
    /// Exactly one input received a gradient.
    Single(DenseTensor<f64>),
    /// Gradients in input order, skipping inputs that received none.
    Multiple(Vec<DenseTensor<f64>>),
}

impl GradOutput {
    fn from_vec(mut grads: Vec<DenseTensor<f64>>) -> Self {
        if grads.len() == 1 {
            GradOutput::Single(grads.remove(0))
        } else {
            GradOutput::Multiple(grads)
        }
    }

    /// Gradients in input order.
    pub fn into_vec(self) -> Vec<DenseTensor<f64>> {
        match self {
            GradOutput::Single(g) => vec![g],
            GradOutput::Multiple(gs) => gs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            GradOutput::Single(_) => 1,
            GradOutput::Multiple(gs) => gs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The gradient when exactly one input received one.
    pub fn single(&self) -> Option<&DenseTensor<f64>> {
        match self {
            GradOutput::Single(g) => Some(g),
            GradOutput::Multiple(_) => None,
        }
    }
}

/// Differentiable wrapper around a traced function. See [`value_and_grad`].
#[derive(Debug, Clone)]
pub struct ValueAndGrad<F> {
    f: F,
    config: GradConfig,
}

/// Wrap `f` so that calling it also returns gradients of its result with
/// respect to every input.
///
/// The dense tensor layer tracks nothing by itself, so the tape built here is
/// the only record of the computation.
///
/// # Example
///
/// ```
/// use tapegrad::Tensor;
/// use tapegrad::autodiff::{GradOutput, value_and_grad};
///
/// let x = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
/// let y = Tensor::from_vec(vec![3.0, 4.0], &[2]).unwrap();
///
/// // f(x, y) = sum(x * y)
/// let f = value_and_grad(|xs| xs[0].mul(&xs[1])?.sum(None, false));
/// let (value, grads) = f.call(&[x.clone(), y.clone()]).unwrap();
///
/// assert_eq!(value.item(), Some(11.0));
/// let GradOutput::Multiple(grads) = grads else { unreachable!() };
/// assert_eq!(grads[0].data(), y.data());
/// assert_eq!(grads[1].data(), x.data());
/// ```
pub fn value_and_grad<F, R>(f: F) -> ValueAndGrad<F>
where
    F: Fn(&[Traced]) -> Result<R>,
    R: TensorLike,
{
    ValueAndGrad {
        f,
        config: GradConfig::default(),
    }
}

impl<F> ValueAndGrad<F> {
    /// Copy every gradient before accumulating it.
    pub fn safe(mut self, safe: bool) -> Self {
        self.config.safe = safe;
        self
    }

    pub fn with_config(mut self, config: GradConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GradConfig {
        &self.config
    }

    /// Run the function on `inputs` and differentiate its result.
    ///
    /// # Errors
    ///
    /// - errors returned by the traced function or by a backward rule
    /// - `NotTensorLike` if the result exposes no tensor
    ///
    /// Any error aborts the call; no partial gradients are returned.
    pub fn call<R>(&self, inputs: &[DenseTensor<f64>]) -> Result<(DenseTensor<f64>, GradOutput)>
    where
        F: Fn(&[Traced]) -> Result<R>,
        R: TensorLike,
    {
        debug!("value_and_grad: tracing {} input(s)", inputs.len());

        let mut tape = Tape::new();
        let leaves: Vec<Traced> = inputs
            .iter()
            .map(|t| Traced::tracked(t.clone(), tape.register_leaf()))
            .collect();

        let guard = TapeGuard::new(tape);
        let result = (self.f)(&leaves)?;
        let output = match result.as_traced() {
            Some(t) => t.clone(),
            None => {
                return Err(TensorError::NotTensorLike {
                    type_name: std::any::type_name::<R>(),
                    value: format!("{:?}", result),
                });
            }
        };
        drop(result);
        let tape = guard.finish().ok_or_else(|| {
            TensorError::InvalidOperation("tape stack emptied during tracing".to_string())
        })?;

        let mut grads = Gradients::new();
        if let Some(id) = output.id() {
            grads.accumulate(id, output.tensor().ones_like(), false)?;
        }

        let mut nodes = tape.into_nodes();
        let node_count = nodes.len();
        let mut saw_accelerator = false;
        while let Some(node) = nodes.pop() {
            let (out_id, parents, op, mut ctx) = node.into_parts();
            let Some(grad) = grads.remove(out_id) else {
                trace!("skip {} {:?}: no gradient", op.name(), out_id);
                continue;
            };
            trace!("backward {} {:?}", op.name(), out_id);

            let per_parent = op.backward(&mut ctx, grad)?.into_per_parent(parents.len());
            for (parent, grad) in parents.iter().zip(per_parent) {
                if let (Some(id), Some(grad)) = (parent, grad) {
                    saw_accelerator |= grad.is_accelerator();
                    grads.accumulate(*id, grad, self.config.safe)?;
                }
            }
        }

        let collected: Vec<DenseTensor<f64>> = leaves
            .iter()
            .filter_map(|leaf| leaf.id().and_then(|id| grads.remove(id)))
            .collect();
        saw_accelerator |= collected.iter().any(DenseTensor::is_accelerator);

        debug!(
            "value_and_grad: {} node(s), {} gradient(s)",
            node_count,
            collected.len()
        );

        if saw_accelerator && self.config.release_device_cache {
            if release_device_cache() {
                debug!("value_and_grad: released device cache");
            } else {
                warn!("accelerator gradients produced but no cache-release hook is installed");
            }
        }

        Ok((output.into_tensor(), GradOutput::from_vec(collected)))
    }
}
