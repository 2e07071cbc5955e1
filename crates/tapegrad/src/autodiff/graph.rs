//! Tape of recorded operations for reverse-mode automatic differentiation.

use super::context::OpContext;
use super::policy::Op;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cell::Cell;
use std::fmt::Debug;

/// Handle of a tensor produced or registered on a tape.
///
/// `generation` identifies the tape that issued the handle, `index` its
/// position in that tape's arena. Handles from different tapes never compare
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TensorId {
    generation: u64,
    index: usize,
}

impl TensorId {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get the internal index.
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(index: usize) -> Self {
        Self {
            generation: 0,
            index,
        }
    }
}

/// Parent handles of a node, one per positional tensor input.
///
/// `None` marks an untraced constant.
pub type Parents = SmallVec<[Option<TensorId>; 2]>;

/// A recorded operation.
#[derive(Debug)]
pub struct Node {
    output: TensorId,
    parents: Parents,
    op: Op,
    ctx: OpContext,
}

impl Node {
    /// Handle of the produced tensor.
    pub fn output(&self) -> TensorId {
        self.output
    }

    pub fn parents(&self) -> &[Option<TensorId>] {
        &self.parents
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    /// Split the node into its parts, consuming it.
    pub fn into_parts(self) -> (TensorId, Parents, Op, OpContext) {
        (self.output, self.parents, self.op, self.ctx)
    }
}

thread_local! {
    static NEXT_GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Ordered, append-only record of one traced forward pass.
pub struct Tape {
    generation: u64,
    next_index: usize,
    nodes: Vec<Node>,
}

impl Tape {
    /// Create an empty tape with a fresh generation.
    pub fn new() -> Self {
        let generation = NEXT_GENERATION.with(|g| {
            let current = g.get();
            g.set(current + 1);
            current
        });
        Self {
            generation,
            next_index: 0,
            nodes: Vec::new(),
        }
    }

    fn alloc_id(&mut self) -> TensorId {
        let id = TensorId {
            generation: self.generation,
            index: self.next_index,
        };
        self.next_index += 1;
        id
    }

    /// Allocate a handle for an input tensor (no producing node).
    pub fn register_leaf(&mut self) -> TensorId {
        self.alloc_id()
    }

    /// Append a node and return the handle of its output.
    pub fn push_node(&mut self, op: Op, ctx: OpContext, parents: Parents) -> TensorId {
        let output = self.alloc_id();
        self.nodes.push(Node {
            output,
            parents,
            op,
            ctx,
        });
        output
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recorded nodes in execution order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tape is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Tape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tape")
            .field("generation", &self.generation)
            .field("num_nodes", &self.nodes.len())
            .field("next_index", &self.next_index)
            .finish()
    }
}
