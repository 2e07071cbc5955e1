//! Per-operation scratch storage between forward and backward.

use super::saved_tensor::SavedTensor;
use crate::error::{Result, TensorError};
use crate::tensor::DenseTensor;

/// One value an operation keeps for its backward rule.
#[derive(Debug, Clone)]
pub enum SavedValue {
    Tensor(SavedTensor),
    Axis(Option<usize>),
    Flag(bool),
    Scalar(f64),
    Shape(Vec<usize>),
}

impl SavedValue {
    /// Save a tensor, sharing its buffer.
    pub fn tensor(tensor: &DenseTensor<f64>) -> Self {
        SavedValue::Tensor(SavedTensor::new(tensor.clone()))
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Empty,
    Saved(Vec<SavedValue>),
    Released,
}

/// Operation context.
///
/// Moves through `Empty → Saved → Released`. `save` and `release` are each
/// valid once; after release the context holds nothing.
#[derive(Debug, Default)]
pub struct OpContext {
    state: State,
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store values for the backward rule.
    ///
    /// # Errors
    ///
    /// `ContextAlreadySaved` if called a second time, `ContextReleased` if the
    /// context was already consumed.
    pub fn save(&mut self, values: Vec<SavedValue>) -> Result<()> {
        match self.state {
            State::Empty => {
                self.state = State::Saved(values);
                Ok(())
            }
            State::Saved(_) => Err(TensorError::ContextAlreadySaved),
            State::Released => Err(TensorError::ContextReleased),
        }
    }

    /// Take the saved values out of the context.
    ///
    /// # Errors
    ///
    /// `ContextReleased` on a second release, `ContextEmpty` if nothing was
    /// ever saved.
    pub fn release(&mut self) -> Result<SavedValues> {
        match std::mem::replace(&mut self.state, State::Released) {
            State::Saved(values) => Ok(SavedValues { values }),
            State::Released => Err(TensorError::ContextReleased),
            State::Empty => {
                self.state = State::Empty;
                Err(TensorError::ContextEmpty)
            }
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.state, State::Saved(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self.state, State::Released)
    }
}

/// Values returned by [`OpContext::release`], read back by position.
#[derive(Debug)]
pub struct SavedValues {
    values: Vec<SavedValue>,
}

impl SavedValues {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn get(&self, index: usize) -> Option<&SavedValue> {
        self.values.get(index)
    }

    /// Saved tensor at `index`, sharing its buffer.
    pub fn tensor(&self, index: usize) -> Result<DenseTensor<f64>> {
        self.saved_tensor(index).map(SavedTensor::materialize)
    }

    /// The [`SavedTensor`] handle itself at `index`.
    pub fn saved_tensor(&self, index: usize) -> Result<&SavedTensor> {
        match self.get(index) {
            Some(SavedValue::Tensor(t)) => Ok(t),
            _ => Err(mismatch(index, "tensor")),
        }
    }

    pub fn axis(&self, index: usize) -> Result<Option<usize>> {
        match self.get(index) {
            Some(SavedValue::Axis(a)) => Ok(*a),
            _ => Err(mismatch(index, "axis")),
        }
    }

    pub fn flag(&self, index: usize) -> Result<bool> {
        match self.get(index) {
            Some(SavedValue::Flag(f)) => Ok(*f),
            _ => Err(mismatch(index, "flag")),
        }
    }

    pub fn scalar(&self, index: usize) -> Result<f64> {
        match self.get(index) {
            Some(SavedValue::Scalar(s)) => Ok(*s),
            _ => Err(mismatch(index, "scalar")),
        }
    }

    pub fn shape(&self, index: usize) -> Result<&[usize]> {
        match self.get(index) {
            Some(SavedValue::Shape(s)) => Ok(s),
            _ => Err(mismatch(index, "shape")),
        }
    }
}

fn mismatch(index: usize, expected: &'static str) -> TensorError {
    TensorError::SavedValueMismatch { index, expected }
}
