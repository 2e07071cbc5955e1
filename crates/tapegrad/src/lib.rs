//! tapegrad - tape-based reverse-mode automatic differentiation
//!
//! A small dense tensor layer plus an engine that records operations on a
//! thread-local tape and replays them backwards to compute gradients.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Differentiation (autodiff module)
//!     → value_and_grad, Traced, Policy / Op, tape stack
//!
//! Level 2: Tensor operations (operations module)
//!     → elementwise, sum / mean / max, expand
//!
//! Level 3: Dense tensor and storage
//!     → Tensor, Dense (Arc-backed, copy-on-write), Device
//! ```
//!
//! # Example
//!
//! ```
//! use tapegrad::{DenseTensor, Tensor};
//! use tapegrad::autodiff::value_and_grad;
//!
//! // Column-major data
//! let x: DenseTensor<f64> = Tensor::from_vec(vec![1.0, 3.0, 3.0, 2.0], &[4]).unwrap();
//!
//! let (value, grad) = value_and_grad(|xs| xs[0].max(None, false))
//!     .call(&[x])
//!     .unwrap();
//!
//! assert_eq!(value.item(), Some(3.0));
//! assert_eq!(grad.single().unwrap().data(), &[0.0, 1.0, 1.0, 0.0]);
//! ```

pub mod autodiff;
pub mod device;
pub mod error;
pub mod operations;
pub mod random;
pub mod scalar;
pub mod storage;
pub mod strides;
pub mod tensor;

pub use device::Device;
pub use error::{Result, TensorError};
pub use scalar::Scalar;
pub use storage::{Dense, TensorStorage};
pub use tensor::{DenseTensor, Tensor};
