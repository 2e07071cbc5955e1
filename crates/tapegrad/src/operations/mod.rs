//! Tensor operations the autodiff engine is built on.
//!
//! ```text
//! elementwise  → apply, apply_binary, add/sub/mul/div, neg, exp, ln, scale, eq_mask, add_assign
//! reduce       → sum, mean, max   (over one axis or all, with keepdim)
//! shape        → expand           (right-aligned broadcasting)
//! ```
//!
//! Every operation returns a new tensor placed on the device of its first
//! operand. None of them record anything for differentiation; that is the
//! job of [`crate::autodiff`].

mod elementwise;
mod reduce;
mod shape;

pub use elementwise::{
    add, add_assign, apply, apply_binary, div, eq_mask, exp, ln, mul, neg, scale, sub,
};
pub(crate) use reduce::reduced_count;
pub use reduce::{max, mean, sum};
pub use shape::expand;
