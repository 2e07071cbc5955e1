//! Random tensor construction.
//!
//! Used to build test inputs and initial parameters; the autodiff engine
//! itself never draws random numbers.

use rand::Rng;
use rand::distr::StandardUniform;
use rand_distr::StandardNormal;

use crate::scalar::Scalar;
use crate::storage::Dense;
use crate::tensor::Tensor;

/// Element types that can be drawn from a distribution.
pub trait RandomScalar: Scalar {
    /// Sample from the uniform distribution on [0, 1).
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self;

    /// Sample from the standard normal distribution.
    fn sample_normal<R: Rng>(rng: &mut R) -> Self;
}

impl RandomScalar for f64 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }

    fn sample_normal<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl<ElT: RandomScalar> Tensor<ElT, Dense<ElT>> {
    /// Uniform random values in [0, 1) from the thread RNG.
    pub fn random(shape: &[usize]) -> Self {
        Self::random_with_rng(shape, &mut rand::rng())
    }

    /// Uniform random values in [0, 1) from `rng`.
    ///
    /// # Example
    ///
    /// ```
    /// use tapegrad::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let t1: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(42));
    /// let t2: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut StdRng::seed_from_u64(42));
    /// assert_eq!(t1.data(), t2.data());
    /// ```
    pub fn random_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        Self::sampled(shape, || ElT::sample_uniform(&mut *rng))
    }

    /// Standard normal values from the thread RNG.
    pub fn randn(shape: &[usize]) -> Self {
        Self::randn_with_rng(shape, &mut rand::rng())
    }

    /// Standard normal values from `rng`.
    pub fn randn_with_rng<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        Self::sampled(shape, || ElT::sample_normal(&mut *rng))
    }

    fn sampled(shape: &[usize], mut draw: impl FnMut() -> ElT) -> Self {
        let mut t = Self::zeros(shape);
        for slot in t.data_mut() {
            *slot = draw();
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_f64_range() {
        let t: Tensor<f64> = Tensor::random(&[2, 3]);
        assert_eq!(t.shape(), &[2, 3]);
        for &v in t.data() {
            assert!((0.0..1.0).contains(&v), "value {} not in [0, 1)", v);
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let t1: Tensor<f64> = Tensor::randn_with_rng(&[3, 4], &mut StdRng::seed_from_u64(54321));
        let t2: Tensor<f64> = Tensor::randn_with_rng(&[3, 4], &mut StdRng::seed_from_u64(54321));
        assert_eq!(t1.data(), t2.data());
    }

    #[test]
    fn test_randn_moments() {
        let t: Tensor<f64> = Tensor::randn_with_rng(&[400], &mut StdRng::seed_from_u64(7));
        let mean = t.data().iter().sum::<f64>() / 400.0;
        let var = t.data().iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 400.0;
        assert!(mean.abs() < 0.3, "mean {} too far from 0", mean);
        assert!(var > 0.5 && var < 1.5, "variance {} too far from 1", var);
    }

    #[test]
    fn test_random_scalar_tensor() {
        let t: Tensor<f64> = Tensor::random(&[]);
        assert_eq!(t.shape(), &[] as &[usize]);
        assert_eq!(t.len(), 1);
    }
}
