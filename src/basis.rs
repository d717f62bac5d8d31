//! Basis functions for linear least-squares fitting
//!
//! This module defines the [`Basis`] trait, which abstracts a family of basis
//! functions over D-dimensional coordinates, and [`DesignMatrix`], the
//! sample-by-term matrix of basis evaluations that every fit consumes.
//!
//! # Provided Bases
//! - [`MonomialBasis`]: products of coordinate powers `x^a·y^b·…` with total degree up to a bound.
//!   Simple, but can become numerically unstable for high degrees.
//! - [`SphericalHarmonicBasis`]: real spherical harmonics `Y_l^m(θ, φ)` up to a maximum degree `L`.
//!   Orthonormal on the sphere, evaluated with a stable recurrence.
//!
//! # Term order
//! The order of [`Basis::labels`] *is* the column order of the design matrix, and therefore
//! the order of the fitted coefficients. A [`DesignMatrix`] carries its labels with it, and
//! [`crate::fit::Coefficients`] carry the same labels, so prediction and formatting never
//! re-derive the order on their own.
//!
//! # Rolling Your Own
//! To implement a custom basis:
//! 1. Implement `Basis<T>` for your type.
//! 2. Enumerate your terms in `labels`, in the order you want the columns.
//! 3. Define how to populate a row of the design matrix in `fill_matrix_row`.
use nalgebra::{DMatrix, MatrixViewMut};

use crate::{
    error::{Error, Result},
    value::Value,
};

pub(crate) mod monomial;
pub use monomial::{term_count, MonomialBasis};

pub(crate) mod spherical;
pub use spherical::SphericalHarmonicBasis;

/// Identifies a single basis term, and therefore a single column of a design matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TermLabel {
    /// A product of coordinate powers; `exponents[d]` is the power of dimension `d`.
    ///
    /// All-zero exponents is the constant (bias) term.
    Monomial(Vec<u32>),

    /// A real spherical harmonic of degree `l` and order `m`, with `-l <= m <= l`.
    Harmonic {
        /// Degree
        l: u32,
        /// Order
        m: i32,
    },

    /// Constant column of ones, added by the fitter when asked to fit an intercept
    /// for a basis that has no constant term of its own.
    Intercept,
}
impl TermLabel {
    /// Returns true if this term does not depend on the coordinates.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            TermLabel::Monomial(exponents) => exponents.iter().all(|&e| e == 0),
            TermLabel::Harmonic { l, .. } => *l == 0,
            TermLabel::Intercept => true,
        }
    }

    /// Total degree of the term.
    ///
    /// Sum of exponents for monomials, `l` for harmonics, and 0 for the intercept.
    #[must_use]
    pub fn degree(&self) -> u32 {
        match self {
            TermLabel::Monomial(exponents) => exponents.iter().sum(),
            TermLabel::Harmonic { l, .. } => *l,
            TermLabel::Intercept => 0,
        }
    }
}
impl std::fmt::Display for TermLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermLabel::Monomial(exponents) => {
                let mut wrote = false;
                for (d, &e) in exponents.iter().enumerate() {
                    if e == 0 {
                        continue;
                    }
                    if wrote {
                        write!(f, "*")?;
                    }
                    write!(f, "x{d}")?;
                    if e > 1 {
                        write!(f, "^{e}")?;
                    }
                    wrote = true;
                }
                if !wrote {
                    write!(f, "1")?;
                }
                Ok(())
            }
            TermLabel::Harmonic { l, m } => write!(f, "Y_{l}^{m}"),
            TermLabel::Intercept => write!(f, "intercept"),
        }
    }
}

/// An `N x K` matrix of basis evaluations, bundled with the `K` term labels.
///
/// Column `j` holds the evaluation of `labels()[j]` at every sample. The pairing is
/// checked on construction and never changes afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix<T: Value = f64> {
    matrix: DMatrix<T>,
    labels: Vec<TermLabel>,
}
impl<T: Value> DesignMatrix<T> {
    /// Pairs a matrix with the labels of its columns.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if the label count differs from the column count.
    pub fn new(matrix: DMatrix<T>, labels: Vec<TermLabel>) -> Result<Self> {
        if matrix.ncols() != labels.len() {
            return Err(Error::DimensionMismatch {
                what: "design matrix columns",
                expected: labels.len(),
                got: matrix.ncols(),
            });
        }

        Ok(Self { matrix, labels })
    }

    /// The raw `N x K` matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<T> {
        &self.matrix
    }

    /// Labels of each column, in column order.
    #[must_use]
    pub fn labels(&self) -> &[TermLabel] {
        &self.labels
    }

    /// Number of samples (rows), `N`.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of basis terms (columns), `K`.
    #[must_use]
    pub fn n_terms(&self) -> usize {
        self.matrix.ncols()
    }

    /// Returns true if any column is constant, i.e. the basis already models a bias.
    #[must_use]
    pub fn has_constant_term(&self) -> bool {
        self.labels.iter().any(TermLabel::is_constant)
    }

    /// Returns a copy with a trailing column of ones labelled [`TermLabel::Intercept`].
    #[must_use]
    pub fn with_intercept(&self) -> Self {
        let k = self.n_terms();
        let matrix = self.matrix.clone().insert_column(k, T::one());

        let mut labels = self.labels.clone();
        labels.push(TermLabel::Intercept);
        Self { matrix, labels }
    }

    /// Splits the design matrix into its parts.
    #[must_use]
    pub fn into_parts(self) -> (DMatrix<T>, Vec<TermLabel>) {
        (self.matrix, self.labels)
    }
}

/// A family of basis functions over D-dimensional coordinates.
///
/// Most of the time, you want to use a built-in basis type, such as [`MonomialBasis`] or
/// [`SphericalHarmonicBasis`].
///
/// A basis is fully configured on construction (dimensions, degree); [`Basis::expand`] then turns
/// any set of samples into a [`DesignMatrix`]. The same basis value must be used to expand the
/// reconstruction grid, so the columns line up with the fitted coefficients.
///
/// # Type Parameters
/// - `T`: The numeric type used for coordinates and evaluation (e.g., `f64`).
pub trait Basis<T: Value>: Clone + std::fmt::Debug + Send + Sync {
    /// Number of coordinates each sample must have.
    fn dimensions(&self) -> usize;

    /// The degree bound this basis was built with.
    fn degree(&self) -> u32;

    /// Term labels, in column order.
    fn labels(&self) -> Vec<TermLabel>;

    /// Number of basis functions, `K`.
    fn k(&self) -> usize {
        self.labels().len()
    }

    /// Populates one row of the design matrix with every basis function evaluated at `coords`.
    ///
    /// `coords` has exactly [`Basis::dimensions`] entries, and `row` exactly [`Basis::k`] columns;
    /// callers are responsible for both.
    fn fill_matrix_row<R: nalgebra::Dim, C: nalgebra::Dim, RS: nalgebra::Dim, CS: nalgebra::Dim>(
        &self,
        coords: &[T],
        row: MatrixViewMut<T, R, C, RS, CS>,
    );

    /// Builds the design matrix for a set of samples.
    ///
    /// Each sample is one row; its coordinates are given in dimension order.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `samples` is empty.
    /// - [`Error::DimensionMismatch`] if any sample has the wrong number of coordinates.
    fn expand<S: AsRef<[T]>>(&self, samples: &[S]) -> Result<DesignMatrix<T>> {
        self.expand_bounded(samples, None)
    }

    /// Builds the design matrix, refusing to allocate more than `max_cells` entries.
    ///
    /// # Errors
    /// Same as [`Basis::expand`], plus [`Error::CapacityExceeded`] if `N * K > max_cells`.
    fn expand_bounded<S: AsRef<[T]>>(
        &self,
        samples: &[S],
        max_cells: Option<usize>,
    ) -> Result<DesignMatrix<T>> {
        if samples.is_empty() {
            return Err(Error::NoData);
        }

        let labels = self.labels();
        let (n, k) = (samples.len(), labels.len());
        if let Some(limit) = max_cells {
            let cells = n.saturating_mul(k);
            if cells > limit {
                return Err(Error::CapacityExceeded { cells, limit });
            }
        }

        let d = self.dimensions();
        let mut matrix = DMatrix::zeros(n, k);
        for (row, sample) in matrix.row_iter_mut().zip(samples) {
            let coords = sample.as_ref();
            if coords.len() != d {
                return Err(Error::DimensionMismatch {
                    what: "sample coordinates",
                    expected: d,
                    got: coords.len(),
                });
            }

            self.fill_matrix_row(coords, row);
        }

        tracing::debug!(samples = n, terms = k, degree = self.degree(), "expanded basis");
        DesignMatrix::new(matrix, labels)
    }
}
