//! Configuration for basis construction and least-squares solves.
//!
//! The design matrix grows as `samples x terms`, and the number of terms grows
//! combinatorially with degree and dimensionality. Rather than guessing a safe size
//! internally, the crate surfaces the limits as configuration:
//! - [`DegreeRange`] bounds the degree a basis will accept.
//! - [`FitConfig::max_design_cells`] bounds the size of an expanded design matrix.
//!
//! Both types serialize with serde, so they can live in a caller's settings file.
use crate::{
    error::{Error, Result},
    value::Value,
};

/// Inclusive range of degrees a basis accepts.
///
/// A degree outside the range is rejected with [`Error::InvalidDegree`]; it is never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DegreeRange {
    /// Smallest allowed degree
    pub min: u32,

    /// Largest allowed degree
    pub max: u32,
}
impl DegreeRange {
    /// Degrees offered for fitting clicked 1D points: `1..=10`
    pub const CURVE: Self = Self::new(1, 10);

    /// Degrees offered for fitting image channels over `(u, v)`: `1..=6`
    pub const IMAGE: Self = Self::new(1, 6);

    /// Degrees offered for spherical-harmonic image fits: `0..=5`
    pub const SPHERICAL: Self = Self::new(0, 5);

    /// Creates a new inclusive degree range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Returns true if `degree` is inside the range.
    #[must_use]
    pub fn contains(&self, degree: u32) -> bool {
        (self.min..=self.max).contains(&degree)
    }

    /// Validates a degree against this range.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDegree`] if `degree` is outside the range.
    pub fn check(&self, degree: u32) -> Result<u32> {
        if self.contains(degree) {
            Ok(degree)
        } else {
            Err(Error::InvalidDegree {
                degree,
                min: self.min,
                max: self.max,
            })
        }
    }
}
impl Default for DegreeRange {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// What to do when a fit has more basis terms than samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Underdetermined {
    /// Refuse to fit, with [`Error::InsufficientSamples`].
    #[default]
    Reject,

    /// Solve anyway, returning the minimum-norm solution among the exact fits.
    LeastNorm,
}

/// Settings shared by every solve in a fit.
///
/// # Default Values
/// - `underdetermined`: [`Underdetermined::Reject`]
/// - `condition_warning`: `1e12`
/// - `max_design_cells`: `None` (unbounded)
/// - `clamp`: `None`
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Policy for systems with more terms than samples.
    pub underdetermined: Underdetermined,

    /// Condition number above which a fit is reported as ill-conditioned.
    ///
    /// Ill-conditioned fits still succeed; they are flagged in
    /// [`crate::fit::FitDiagnostics`] and logged at `warn` level.
    pub condition_warning: f64,

    /// Ceiling on `samples * terms` for a single design matrix.
    pub max_design_cells: Option<usize>,

    /// Range predictions are clamped to, e.g. `(0.0, 1.0)` for normalized intensities.
    pub clamp: Option<(f64, f64)>,
}
impl Default for FitConfig {
    fn default() -> Self {
        Self {
            underdetermined: Underdetermined::Reject,
            condition_warning: 1e12,
            max_design_cells: None,
            clamp: None,
        }
    }
}
impl FitConfig {
    /// Sets the policy for underdetermined systems.
    #[must_use]
    pub fn with_underdetermined(mut self, policy: Underdetermined) -> Self {
        self.underdetermined = policy;
        self
    }

    /// Sets the condition number above which fits are flagged.
    #[must_use]
    pub fn with_condition_warning(mut self, threshold: f64) -> Self {
        self.condition_warning = threshold;
        self
    }

    /// Sets the ceiling on design matrix size.
    #[must_use]
    pub fn with_max_design_cells(mut self, cells: usize) -> Self {
        self.max_design_cells = Some(cells);
        self
    }

    /// Clamps predictions to `lo..=hi`.
    #[must_use]
    pub fn with_clamp(mut self, lo: f64, hi: f64) -> Self {
        self.clamp = Some((lo, hi));
        self
    }

    /// The clamp range cast to `T`, validated.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if the range is inverted or not finite, or
    /// [`Error::CastFailed`] if the bounds cannot be represented in `T`.
    pub fn clamp_range<T: Value>(&self) -> Result<Option<(T, T)>> {
        let Some((lo, hi)) = self.clamp else {
            return Ok(None);
        };

        if !lo.is_finite() || !hi.is_finite() {
            return Err(Error::InvalidRange("clamp bounds must be finite"));
        } else if lo > hi {
            return Err(Error::InvalidRange("clamp lower bound exceeds upper bound"));
        }

        Ok(Some((T::try_cast(lo)?, T::try_cast(hi)?)))
    }
}
