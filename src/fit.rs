//! Linear least-squares solves over a [`DesignMatrix`].
//!
//! [`LeastSquaresFitter`] finds the coefficients minimizing `‖targets - A·coefficients‖²` for a
//! design matrix `A`, using the singular value decomposition of `A`:
//! - No normal equations and no explicit inverse, so ill-conditioned designs (high-degree
//!   monomials, near-collinear columns) stay accurate.
//! - Singular values below `ε · max(N, K) · σ_max` are treated as zero, which gives the
//!   least-norm solution when the design is rank-deficient.
//!
//! Multi-channel data (e.g. the red, green and blue channels of an image) is fit with
//! [`LeastSquaresFitter::fit_channels`]: one decomposition, one independent solve per channel.
use std::borrow::Cow;

use nalgebra::{DMatrix, DVector, SVD};

use crate::{
    basis::{DesignMatrix, TermLabel},
    config::{FitConfig, Underdetermined},
    error::{Error, Result},
    value::Value,
};

/// Fitted coefficients, one per term, bundled with the term labels.
///
/// `values()[j]` multiplies the basis function `labels()[j]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coefficients<T: Value = f64> {
    values: Vec<T>,
    labels: Vec<TermLabel>,
}
impl<T: Value> Coefficients<T> {
    /// Pairs coefficient values with their term labels.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if the lengths differ.
    pub fn new(values: Vec<T>, labels: Vec<TermLabel>) -> Result<Self> {
        if values.len() != labels.len() {
            return Err(Error::DimensionMismatch {
                what: "coefficient labels",
                expected: values.len(),
                got: labels.len(),
            });
        }

        Ok(Self { values, labels })
    }

    /// Coefficient values, in term order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Term labels, in term order.
    #[must_use]
    pub fn labels(&self) -> &[TermLabel] {
        &self.labels
    }

    /// Number of coefficients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no coefficients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The coefficient of a given term, if present.
    #[must_use]
    pub fn get(&self, label: &TermLabel) -> Option<T> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|j| self.values[j])
    }

    /// The coefficient of the implicit intercept column, if the fit added one.
    #[must_use]
    pub fn intercept(&self) -> Option<T> {
        self.get(&TermLabel::Intercept)
    }

    /// Iterates over `(label, coefficient)` pairs in term order.
    pub fn iter(&self) -> impl Iterator<Item = (&TermLabel, T)> + '_ {
        self.labels.iter().zip(self.values.iter().copied())
    }

    /// Splits into values and labels.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Vec<TermLabel>) {
        (self.values, self.labels)
    }
}

/// Numerical health of a solve.
///
/// None of these conditions is an error; they describe how much the coefficients can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitDiagnostics<T: Value = f64> {
    /// Number of singular values above the truncation threshold.
    pub rank: usize,

    /// `σ_max / σ_min` of the design matrix; infinite when it is rank-deficient.
    pub condition_number: T,

    /// True if `condition_number` exceeded [`FitConfig::condition_warning`].
    pub ill_conditioned: bool,

    /// True if there were more terms than samples and the least-norm solution was returned.
    pub underdetermined: bool,
}

/// Coefficients of one solve, with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresSolution<T: Value = f64> {
    /// The fitted coefficients.
    pub coefficients: Coefficients<T>,

    /// Numerical health of the solve.
    pub diagnostics: FitDiagnostics<T>,
}

/// Ordinary least-squares solver over design matrices.
///
/// # Example
/// ```
/// use basisfit::{basis::{Basis, MonomialBasis}, config::{DegreeRange, FitConfig}, LeastSquaresFitter};
///
/// let basis = MonomialBasis::<f64>::new(1, 2, DegreeRange::CURVE).unwrap();
/// let design = basis.expand(&[[1.0], [2.0], [3.0], [4.0], [5.0]]).unwrap();
///
/// let fitter = LeastSquaresFitter::new(FitConfig::default());
/// let coefficients = fitter.fit(&design, &[5.0, 3.9, 2.0, 8.5, 18.2], false).unwrap();
/// assert_eq!(coefficients.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeastSquaresFitter {
    config: FitConfig,
}
impl LeastSquaresFitter {
    /// Creates a fitter with the given settings.
    #[must_use]
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    /// The settings this fitter uses.
    #[must_use]
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fits one target vector, returning only the coefficients.
    ///
    /// If `fit_intercept` is set and no term of the design is constant, a column of ones is
    /// appended and its coefficient is labelled [`TermLabel::Intercept`]. Otherwise the
    /// coefficients line up one-to-one with the design labels.
    ///
    /// # Errors
    /// See [`LeastSquaresFitter::solve`].
    pub fn fit<T: Value>(
        &self,
        design: &DesignMatrix<T>,
        targets: &[T],
        fit_intercept: bool,
    ) -> Result<Coefficients<T>> {
        self.solve(design, targets, fit_intercept)
            .map(|solution| solution.coefficients)
    }

    /// Fits one target vector, returning the coefficients and solve diagnostics.
    ///
    /// # Errors
    /// - [`Error::NoData`] if the design has no rows.
    /// - [`Error::DimensionMismatch`] if `targets.len()` differs from the number of rows.
    /// - [`Error::InsufficientSamples`] if there are more terms than samples, and the config
    ///   rejects underdetermined systems.
    /// - [`Error::Algebra`] if the solve produced non-finite coefficients.
    pub fn solve<T: Value>(
        &self,
        design: &DesignMatrix<T>,
        targets: &[T],
        fit_intercept: bool,
    ) -> Result<LeastSquaresSolution<T>> {
        let mut solutions = self.fit_channels(design, &[targets], fit_intercept)?;
        solutions.pop().ok_or(Error::NoData)
    }

    /// Fits several independent target vectors against the same design matrix.
    ///
    /// The design is decomposed once; each channel is then solved on its own, sharing
    /// nothing but the decomposition. With the `parallel` feature, channels are solved on the
    /// rayon thread pool.
    ///
    /// # Errors
    /// See [`LeastSquaresFitter::solve`]. Fails if any channel fails.
    pub fn fit_channels<T: Value, C: AsRef<[T]> + Sync>(
        &self,
        design: &DesignMatrix<T>,
        channels: &[C],
        fit_intercept: bool,
    ) -> Result<Vec<LeastSquaresSolution<T>>> {
        let design = if fit_intercept && !design.has_constant_term() {
            Cow::Owned(design.with_intercept())
        } else {
            Cow::Borrowed(design)
        };

        let (n, k) = (design.n_samples(), design.n_terms());
        if n == 0 || k == 0 {
            return Err(Error::NoData);
        }

        for channel in channels {
            let got = channel.as_ref().len();
            if got != n {
                return Err(Error::DimensionMismatch {
                    what: "targets",
                    expected: n,
                    got,
                });
            }
        }

        let underdetermined = k > n;
        if underdetermined {
            match self.config.underdetermined {
                Underdetermined::Reject => return Err(Error::InsufficientSamples { n, k }),
                Underdetermined::LeastNorm => {
                    tracing::debug!(samples = n, terms = k, "underdetermined fit, using least-norm solution");
                }
            }
        }

        let decomp = Decomposition::new(design.matrix().clone())?;
        let diagnostics = FitDiagnostics {
            rank: decomp.rank,
            condition_number: decomp.condition_number,
            ill_conditioned: decomp.condition_number > T::try_cast(self.config.condition_warning)?,
            underdetermined,
        };

        if diagnostics.ill_conditioned {
            tracing::warn!(
                condition_number = %diagnostics.condition_number,
                threshold = self.config.condition_warning,
                rank = diagnostics.rank,
                terms = k,
                "design matrix is ill-conditioned; coefficients may be unreliable"
            );
        }
        tracing::debug!(
            samples = n,
            terms = k,
            rank = diagnostics.rank,
            channels = channels.len(),
            "solving least squares"
        );

        let solve_one = |channel: &C| -> Result<LeastSquaresSolution<T>> {
            let values = decomp.solve(channel.as_ref())?;
            Ok(LeastSquaresSolution {
                coefficients: Coefficients::new(values, design.labels().to_vec())?,
                diagnostics,
            })
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if channels.len() > 1 {
                return channels.par_iter().map(solve_one).collect();
            }
        }

        channels.iter().map(solve_one).collect()
    }
}

/// Iteration budget of the SVD, per column of the design matrix.
const SVD_ITERATIONS_PER_TERM: usize = 100;

/// SVD of a design matrix, with its truncation threshold.
struct Decomposition<T: Value> {
    svd: SVD<T, nalgebra::Dyn, nalgebra::Dyn>,
    epsilon: T,
    rank: usize,
    condition_number: T,
}
impl<T: Value> Decomposition<T> {
    fn new(matrix: DMatrix<T>) -> Result<Self> {
        let (n, k) = matrix.shape();

        // An overflowed or NaN entry never converges
        if matrix
            .iter()
            .any(|&v| !num_traits::float::FloatCore::is_finite(v))
        {
            return Err(Error::Algebra("non-finite design matrix"));
        }

        // Calculate the singular value decomposition of the matrix
        let max_iterations = SVD_ITERATIONS_PER_TERM * k.max(10);
        let svd = SVD::try_new(matrix, true, true, T::epsilon(), max_iterations)
            .ok_or(Error::Algebra("singular value decomposition did not converge"))?;

        // Calculate epsilon value
        // ~= machine_epsilon * max(size) * max_singular
        let sigma_max = svd.singular_values.max();
        let epsilon = T::epsilon() * T::try_cast(n.max(k))? * sigma_max;

        let rank = svd.singular_values.iter().filter(|&&s| s > epsilon).count();
        let condition_number = if rank < k {
            T::infinity()
        } else {
            sigma_max / svd.singular_values.min()
        };

        Ok(Self {
            svd,
            epsilon,
            rank,
            condition_number,
        })
    }

    /// Solves for X in `SVD * X = b`
    fn solve(&self, targets: &[T]) -> Result<Vec<T>> {
        let b = DVector::from_column_slice(targets);
        let x = self.svd.solve(&b, self.epsilon).map_err(Error::Algebra)?;
        let coefficients: Vec<T> = x.iter().copied().collect();

        // Make sure the coefficients are valid
        if coefficients
            .iter()
            .any(|&c| !num_traits::float::FloatCore::is_finite(c))
        {
            return Err(Error::Algebra("non-finite coefficients"));
        }

        Ok(coefficients)
    }
}
