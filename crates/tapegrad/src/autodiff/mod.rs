//! Tape-based reverse-mode automatic differentiation.
//!
//! [`value_and_grad`] wraps a function of [`Traced`] tensors. Each call
//! pushes a fresh [`Tape`] on a thread-local stack, runs the function (every
//! traced operation appends a [`Node`]), pops the tape and walks it backwards.
//!
//! # Architecture
//!
//! ```text
//! value_and_grad(f).call(&inputs)
//!        │
//!        ├─ Tape::new + register_leaf per input ──► TapeGuard (thread_local stack)
//!        │
//!        ├─ f(&[Traced]) ── ops::sum / mul / ... ──► tape::record
//!        │                                             │
//!        │                                Node { output, parents, Op, OpContext }
//!        │                                             │
//!        │                                  Policy::forward (saves into OpContext)
//!        │
//!        └─ reverse walk: pop node, Policy::backward, Gradients::accumulate,
//!                         drop node
//! ```
//!
//! # Example
//!
//! ```
//! use tapegrad::Tensor;
//! use tapegrad::autodiff::value_and_grad;
//!
//! let x = Tensor::full(&[2, 2], 4.0);
//! let (value, grad) = value_and_grad(|xs| xs[0].mean(None, false))
//!     .call(&[x])
//!     .unwrap();
//!
//! assert_eq!(value.item(), Some(4.0));
//! assert!(grad.single().unwrap().data().iter().all(|&g| g == 0.25));
//! ```
//!
//! # Design Notes
//!
//! - Thread-local tape stack (no `Arc`, saved tensors use `Rc`)
//! - Nodes are dropped as soon as their reverse step completes
//! - A traced operation with no active tape is an error, not a silent no-op

mod config;
mod context;
mod gradients;
mod graph;
pub mod ops;
mod policy;
mod saved_tensor;
pub mod tape;
mod tensor;
mod value_and_grad;

pub use config::GradConfig;
pub use context::{OpContext, SavedValue, SavedValues};
pub use gradients::Gradients;
pub use graph::{Node, Parents, Tape, TensorId};
pub use policy::{Backward, Op, Policy};
pub use saved_tensor::SavedTensor;
pub use tape::{TapeGuard, record};
pub use tensor::{TensorLike, Traced};
pub use value_and_grad::{GradOutput, ValueAndGrad, value_and_grad};

/// Record a user-defined policy on the active tape.
pub fn apply_policy<P: Policy + 'static>(policy: P, inputs: &[&Traced]) -> crate::Result<Traced> {
    record(Op::custom(policy), inputs)
}
