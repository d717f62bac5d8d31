//! Error types for basis expansion, fitting and reconstruction
//!
//! This module defines the failure modes of the fitting pipeline, along with a
//! convenient `Result` alias. Every error is reported synchronously to the caller;
//! none of them are retried internally.

/// Errors that can occur while expanding, fitting or reconstructing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Cannot perform a fit because there is no data.
    #[error("No data available for fitting")]
    NoData,

    /// The requested degree is outside the declared allowed range.
    ///
    /// Degrees are never clamped into range; fix the input and try again.
    #[error("Degree {degree} is outside the allowed range {min}..={max}")]
    InvalidDegree {
        /// The rejected degree
        degree: u32,
        /// Smallest allowed degree
        min: u32,
        /// Largest allowed degree
        max: u32,
    },

    /// There are more basis terms than samples, and the fit is configured to reject
    /// underdetermined systems.
    ///
    /// Lower the degree, add samples, or opt into
    /// [`crate::config::Underdetermined::LeastNorm`].
    #[error("Fit is underdetermined: {k} basis terms for only {n} samples")]
    InsufficientSamples {
        /// Number of samples
        n: usize,
        /// Number of basis terms
        k: usize,
    },

    /// A flat prediction does not fit the declared raster shape.
    #[error("Cannot reshape {got} values into a {height}x{width} grid ({expected} values)")]
    ShapeMismatch {
        /// Declared grid height
        height: usize,
        /// Declared grid width
        width: usize,
        /// Values required by the grid
        expected: usize,
        /// Values actually provided
        got: usize,
    },

    /// Inputs disagree on a dimension (coordinate width, target length, channel count...).
    #[error("Dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which input was wrong
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },

    /// Coefficients were applied to a design matrix built from a different basis.
    #[error("Coefficient terms do not match the design matrix terms")]
    LabelMismatch,

    /// The design matrix would exceed the configured capacity.
    #[error("Design matrix of {cells} cells exceeds the configured limit of {limit}")]
    CapacityExceeded {
        /// Cells the design matrix would need (samples * terms)
        cells: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// A range was empty, inverted, or not finite.
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    /// A numeric value could not be cast to the target type.
    #[error("Failed to cast value to target type")]
    CastFailed,

    /// Failed to solve the algebraic system during fitting.
    ///
    /// Contains a static string describing the solver error.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),
}

/// Result type for the fitting pipeline
pub type Result<T> = std::result::Result<T, Error>;
