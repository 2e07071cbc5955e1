//! Thread-local stack of active tapes.
//!
//! The top of the stack is the tape traced operations record into. Each
//! thread has its own stack.

use super::context::OpContext;
use super::graph::{Parents, Tape};
use super::policy::Op;
use super::tensor::Traced;
use crate::error::{Result, TensorError};
use crate::tensor::DenseTensor;
use log::trace;
use std::cell::RefCell;

thread_local! {
    static TAPES: RefCell<Vec<Tape>> = const { RefCell::new(Vec::new()) };
}

/// Make `tape` the active tape.
pub fn push(tape: Tape) {
    TAPES.with(|s| s.borrow_mut().push(tape));
}

/// Remove and return the active tape.
pub fn pop() -> Option<Tape> {
    TAPES.with(|s| s.borrow_mut().pop())
}

/// Number of tapes on this thread's stack.
pub fn depth() -> usize {
    TAPES.with(|s| s.borrow().len())
}

/// Whether traced operations would be recorded right now.
pub fn is_tracing() -> bool {
    depth() > 0
}

/// Keeps a tape on the stack for as long as it lives.
///
/// Pops on drop, so an early return or a panic inside the traced function
/// still leaves the stack as it was.
#[derive(Debug)]
pub struct TapeGuard {
    active: bool,
}

impl TapeGuard {
    /// Push `tape` and return the guard owning that push.
    pub fn new(tape: Tape) -> Self {
        push(tape);
        Self { active: true }
    }

    /// Pop the tape and hand it back.
    pub fn finish(mut self) -> Option<Tape> {
        self.active = false;
        pop()
    }
}

impl Drop for TapeGuard {
    fn drop(&mut self) {
        if self.active {
            pop();
        }
    }
}

/// Run `op` on `inputs` and record it on the active tape.
///
/// # Errors
///
/// `NoActiveTape` if nothing is being traced, checked before any
/// computation. Otherwise whatever the policy's forward returns.
pub fn record(op: Op, inputs: &[&Traced]) -> Result<Traced> {
    if !is_tracing() {
        return Err(TensorError::NoActiveTape { op: op.name() });
    }

    let mut ctx = OpContext::new();
    let tensors: Vec<&DenseTensor<f64>> = inputs.iter().map(|t| t.tensor()).collect();
    let output = op.forward(&mut ctx, &tensors)?;
    let parents: Parents = inputs.iter().map(|t| t.id()).collect();

    let name = op.name();
    let id = TAPES
        .with(|s| {
            s.borrow_mut()
                .last_mut()
                .map(|tape| tape.push_node(op, ctx, parents))
        })
        .ok_or(TensorError::NoActiveTape { op: name })?;
    trace!("recorded {} -> {:?}", name, id);

    Ok(Traced::tracked(output, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;
    use crate::autodiff::ops::Neg;

    #[test]
    fn test_guard_pops_on_drop() {
        assert_eq!(depth(), 0);
        {
            let _guard = TapeGuard::new(Tape::new());
            assert!(is_tracing());
            assert_eq!(depth(), 1);
        }
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_guard_finish_returns_tape() {
        let guard = TapeGuard::new(Tape::new());
        let tape = guard.finish();
        assert!(tape.is_some());
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_nested_records_into_innermost() {
        let outer = TapeGuard::new(Tape::new());
        let inner = TapeGuard::new(Tape::new());
        let x = Traced::constant(Tensor::ones(&[2]));
        record(Op::Neg(Neg), &[&x]).unwrap();

        let inner_tape = inner.finish().unwrap();
        let outer_tape = outer.finish().unwrap();
        assert_eq!(inner_tape.len(), 1);
        assert!(outer_tape.is_empty());
    }

    #[test]
    fn test_record_without_tape() {
        let x = Traced::constant(Tensor::ones(&[2]));
        assert_eq!(
            record(Op::Neg(Neg), &[&x]).unwrap_err(),
            TensorError::NoActiveTape { op: "neg" }
        );
    }

    #[test]
    fn test_record_constant_parent() {
        let mut tape = Tape::new();
        let leaf = tape.register_leaf();
        let guard = TapeGuard::new(tape);

        let x = Traced::tracked(Tensor::ones(&[2]), leaf);
        let c = Traced::constant(Tensor::ones(&[2]));
        let y = record(Op::Add(crate::autodiff::ops::Add), &[&x, &c]).unwrap();
        assert!(y.is_traced());

        let tape = guard.finish().unwrap();
        assert_eq!(tape.nodes()[0].parents(), &[Some(leaf), None]);
    }
}
