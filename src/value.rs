//! Numeric types used throughout the fitting pipeline.
//!
//! This module defines the [`Value`] trait, which abstracts the numeric
//! types that can be used for coordinates, targets and coefficients, ensuring
//! compatibility with nalgebra, floating-point operations, and formatting.
//!
//! # Traits
//!
//! - [`Value`]: Extends `FloatCore`, `Scalar`, and `RealField` to provide:
//!   - A canonical `two()` constant.
//!   - `try_cast` for safe type conversion with error handling.
//!   - `powi` for integer exponentiation.
//!
//! # Example
//!
//! ```rust
//! use basisfit::value::Value;
//!
//! let two = f64::two();
//! let squared = Value::powi(two, 2);
//! let three = f64::try_cast(3_usize).unwrap();
//! assert_eq!(squared + three, 7.0);
//! ```
use crate::error::Error;

/// Numeric type for coordinates, targets and coefficients
pub trait Value:
    nalgebra::Scalar
    + nalgebra::ComplexField<RealField = Self>
    + nalgebra::RealField
    + num_traits::float::FloatCore
    + std::fmt::LowerExp
    + std::fmt::Display
{
    /// Returns the value 2.0
    #[must_use]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    /// Tries to cast a value to the target type
    ///
    /// # Errors
    /// Returns an error if the cast fails
    fn try_cast<U: num_traits::NumCast>(n: U) -> Result<Self, Error> {
        num_traits::cast(n).ok_or(Error::CastFailed)
    }

    /// Raises the value to the power of an integer
    #[must_use]
    fn powi(self, n: i32) -> Self {
        nalgebra::ComplexField::powi(self, n)
    }

    /// Get the absolute value for a numeric type
    #[must_use]
    fn abs(self) -> Self {
        nalgebra::ComplexField::abs(self)
    }

    /// Returns the absolute difference between two values.
    #[must_use]
    fn abs_sub(self, other: Self) -> Self {
        nalgebra::ComplexField::abs(self - other)
    }

    /// Check if the value is negative
    fn is_sign_negative(&self) -> bool {
        self < &Self::zero()
    }

    /// Converts a `usize` to the target numeric type.
    ///
    /// Results in `infinity` if the value is out of range.
    #[must_use]
    fn from_positive_int(n: usize) -> Self {
        Self::try_cast(n).unwrap_or(Self::infinity())
    }
}

impl<T> Value for T where
    T: nalgebra::Scalar
        + nalgebra::ComplexField<RealField = Self>
        + nalgebra::RealField
        + num_traits::float::FloatCore
        + std::fmt::LowerExp
        + std::fmt::Display
{
}
