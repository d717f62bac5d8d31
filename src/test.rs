//! Assertions for validating bases and fits in unit tests.
//!
//! # Features
//!
//! ## Float comparison
//!
//! ### [`crate::assert_close`]
//! Asserts that two floating-point values are approximately equal.
//! - Without a tolerance, uses a few machine epsilons, scaled by the magnitude of the values.
//! - With `tol = <value>`, uses that absolute tolerance instead.
//! - `assert_eq!` equivalent for floats.
//!
//! ### [`crate::assert_all_close`]
//! Element-wise [`crate::assert_close`] over two slices, with the same optional tolerance.
//!
//! ## Fit quality assertions
//! These are designed to be used in unit tests to validate fit quality.
//!
//! ### [`crate::assert_r_squared`]
//! Asserts that a fit's r² value relative to its source data is above a certain threshold.
//! This is a measure of how well the fit explains the variation in the targets.
//! See [`crate::statistics::r_squared`] for more details.
//!
//! ### [`crate::assert_max_residual`]
//! Asserts that all residuals (the differences between the observed and predicted values) of a
//! fit are below a certain threshold.
//!
//! ## Synthetic data
//! [`synthesize`] evaluates a basis with known coefficients, so a test can check that a fit
//! recovers them. The crate's own tests pair it with seeded `random_samples`.

#[cfg(test)]
pub mod basis_assertions;

mod assertions;

use crate::{basis::Basis, value::Value};

/// Default tolerance used by [`crate::assert_close`] when none is given.
///
/// A few machine epsilons, relative to the larger magnitude of `a` and `b` (or 1).
#[must_use]
pub fn default_tolerance<T: Value>(a: T, b: T) -> T {
    let scale = nalgebra::RealField::max(
        T::one(),
        nalgebra::RealField::max(Value::abs(a), Value::abs(b)),
    );
    T::epsilon() * T::from_positive_int(8) * scale
}

/// Generates `n` reproducible samples, with every coordinate drawn uniformly from `range`.
///
/// The same `seed` always produces the same samples.
#[cfg(test)]
#[must_use]
pub fn random_samples(n: usize, dimensions: usize, range: (f64, f64), seed: u64) -> Vec<Vec<f64>> {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            (0..dimensions)
                .map(|_| rng.random_range(range.0..=range.1))
                .collect()
        })
        .collect()
}

/// Evaluates the linear combination `Σ coefficients[j] · basis_j(sample)` at each sample.
///
/// # Panics
/// Panics if the samples cannot be expanded, or `coefficients` does not have one value per term.
#[must_use]
pub fn synthesize<B: Basis<T>, T: Value, S: AsRef<[T]>>(
    basis: &B,
    samples: &[S],
    coefficients: &[T],
) -> Vec<T> {
    assert_eq!(coefficients.len(), basis.k(), "one coefficient per basis term");

    let design = match basis.expand(samples) {
        Ok(design) => design,
        Err(e) => panic!("Failed to expand samples: {e}"),
    };
    let coefficients = nalgebra::DVector::from_column_slice(coefficients);
    (design.matrix() * coefficients).iter().copied().collect()
}
