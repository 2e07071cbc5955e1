//! Error types for tapegrad.

use thiserror::Error;

/// Errors raised by the tensor layer and the autodiff engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    /// Shape mismatch between data length and expected size.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two operands of an elementwise operation have different shapes.
    #[error("operand shapes differ: {lhs:?} vs {rhs:?}")]
    OperandShapes { lhs: Vec<usize>, rhs: Vec<usize> },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Axis argument does not name a dimension of the tensor.
    #[error("dimension {dim} out of range for tensor of rank {ndim}")]
    DimOutOfRange { dim: usize, ndim: usize },

    /// Source shape cannot be broadcast to the target shape.
    #[error("cannot broadcast shape {from:?} to {to:?}")]
    BroadcastMismatch { from: Vec<usize>, to: Vec<usize> },

    /// Generic invalid operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The traced function returned something that is not tensor-like.
    #[error(
        "value_and_grad expected the traced function to return a tensor-like value, \
         but got {type_name}: {value}"
    )]
    NotTensorLike {
        type_name: &'static str,
        value: String,
    },

    /// A traced operation ran while no tape was being recorded.
    #[error("traced operation `{op}` executed with no active tape")]
    NoActiveTape { op: &'static str },

    /// `save` was called twice on the same operation context.
    #[error("operation context already holds saved values")]
    ContextAlreadySaved,

    /// `release` was called on a context that was already released.
    #[error("operation context was already released")]
    ContextReleased,

    /// `release` was called on a context that never saved anything.
    #[error("operation context has nothing saved")]
    ContextEmpty,

    /// A saved value was read back with the wrong position or kind.
    #[error("saved value {index} is not a {expected}")]
    SavedValueMismatch {
        index: usize,
        expected: &'static str,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TensorError>;
