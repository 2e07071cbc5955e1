//! Stride and index arithmetic for column-major tensors.
//!
//! All tensors in this crate are stored in column-major (Fortran) order:
//! the first index varies fastest.

/// Compute column-major strides from shape.
///
/// For shape [d0, d1, d2, ...], returns strides [1, d0, d0*d1, ...].
///
/// # Examples
///
/// ```
/// use tapegrad::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![1, 3, 12]);
/// assert_eq!(compute_strides(&[5]), vec![1]);
/// assert_eq!(compute_strides(&[]), vec![]);
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut stride = 1;
    for &dim in shape {
        strides.push(stride);
        stride *= dim;
    }
    strides
}

/// Convert cartesian indices to a linear index.
#[inline]
pub fn cartesian_to_linear(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Convert a linear index to cartesian indices.
pub fn linear_to_cartesian(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = Vec::with_capacity(shape.len());
    for &dim in shape {
        indices.push(linear % dim);
        linear /= dim;
    }
    indices
}

/// Shape left after reducing `shape` over `dim`.
///
/// With `keepdim` the reduced axis stays with size 1, otherwise it is removed.
/// `dim = None` reduces over every axis.
pub fn reduced_shape(shape: &[usize], dim: Option<usize>, keepdim: bool) -> Vec<usize> {
    match (dim, keepdim) {
        (None, false) => Vec::new(),
        (None, true) => vec![1; shape.len()],
        (Some(d), true) => {
            let mut out = shape.to_vec();
            out[d] = 1;
            out
        }
        (Some(d), false) => shape
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != d)
            .map(|(_, &s)| s)
            .collect(),
    }
}

/// Linear index in the reduced tensor that input element `linear` folds into.
///
/// The result is the same for `keepdim` true or false: dropping a size-1 axis
/// does not move any element in column-major order.
pub fn reduced_linear(linear: usize, shape: &[usize], dim: Option<usize>) -> usize {
    let Some(d) = dim else {
        return 0;
    };
    let mut out = 0;
    let mut out_stride = 1;
    let mut rest = linear;
    for (axis, &size) in shape.iter().enumerate() {
        let idx = rest % size;
        rest /= size;
        if axis != d {
            out += idx * out_stride;
            out_stride *= size;
        }
    }
    out
}

/// Linear index in a broadcast source for element `linear` of `target`.
///
/// `source` is right-aligned against `target` (missing leading axes act as
/// size 1) and every source axis of size 1 repeats along the target axis.
pub fn broadcast_linear(linear: usize, target: &[usize], source: &[usize]) -> usize {
    let offset = target.len() - source.len();
    let mut out = 0;
    let mut src_stride = 1;
    let mut rest = linear;
    for (axis, &size) in target.iter().enumerate() {
        let idx = rest % size;
        rest /= size;
        if axis >= offset {
            let src_size = source[axis - offset];
            if src_size != 1 {
                out += idx * src_stride;
            }
            src_stride *= src_size;
        }
    }
    out
}
