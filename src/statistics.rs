//! Functions for evaluating how well a basis fit explains its data
//!
//! Every function works on iterators of observed values `y` and fitted values `y_fit`, so they
//! apply equally to a single channel, a slice of a raster, or a fit over scattered points.
//!
//! # Model Fit
//! - [`r_squared`]: Proportion of variance explained by the model. Higher is better (0 to 1).
//! - [`adjusted_r_squared`]: R² adjusted for the number of basis terms. Use to compare degrees.
//! - [`residual_variance`]: Unbiased estimate of the variance of the errors after fitting.
//!
//! # Error Metrics
//! - [`mean_absolute_error`]: Average absolute difference between observed and predicted values.
//! - [`mean_squared_error`]: Average squared difference between observed and predicted values.
//! - [`root_mean_squared_error`]: Square root of MSE, in the same units as the observed values.
//!
//! # Descriptive Statistics
//! - [`mean`]: Arithmetic mean of a dataset.
//!
//! Empty inputs have no meaningful statistics; the functions return NaN for them rather than
//! panicking.
use crate::value::Value;

/// Computes the arithmetic mean of a sequence of values.
///
/// ```math
/// Mean = (Σ x_i) / N
/// ```
///
/// Returns NaN if the iterator yields no elements.
///
/// # Examples
/// ```rust
/// let values = vec![1.0, 2.0, 3.0];
/// let m = basisfit::statistics::mean(values.into_iter());
/// assert_eq!(m, 2.0);
/// ```
pub fn mean<T: Value>(data: impl Iterator<Item = T>) -> T {
    let mut sum = T::zero();
    let mut count = T::zero();
    for value in data {
        sum += value;
        count += T::one();
    }
    sum / count
}

/// Calculate the residual variance of a model fit.
///
/// This is an unbiased estimate of the noise left after fitting `k` basis terms:
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// s² = Σ (y_i - y_fit_i)² / (N - k)
/// ```
/// When `N == k` the fit interpolates the data exactly and the variance is reported as zero.
/// </div>
///
/// # Parameters
/// - `y`: Iterator over the observed (actual) values.
/// - `y_fit`: Iterator over the predicted values from the model.
/// - `k`: Number of model parameters (basis terms).
///
/// # Example
/// ```rust
/// # use basisfit::statistics::residual_variance;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![0.9, 2.1, 2.95];
/// let variance = residual_variance(y.into_iter(), y_fit.into_iter(), 2.0);
/// assert!(variance < 0.03);
/// ```
pub fn residual_variance<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
    k: T,
) -> T {
    let mut ss_residual = T::zero();
    let mut n = T::zero();
    for (y, y_fit) in y.zip(y_fit) {
        ss_residual += Value::powi(y - y_fit, 2);
        n += T::one();
    }

    if n == k {
        return T::zero();
    }
    ss_residual / (n - k)
}

/// Calculate the R-squared value for a set of data.
///
/// R-squared tells you how well the model explains the data:
/// - `0` means the model explains none of the variation.
/// - `1` means the model explains all the variation.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// R² = 1 - (SS_res / SS_tot)
/// where
///   SS_res = Σ (y_i - y_fit_i)²
///   SS_tot = Σ (y_i - y_mean)²
/// ```
/// A constant `y` has no variance to explain: the result is `1` if the fit is exact, and
/// `0` otherwise.
/// </div>
///
/// # Example
/// ```rust
/// # use basisfit::statistics::r_squared;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.1, 1.9, 3.05];
/// let r2 = r_squared(y.into_iter(), y_fit.into_iter());
/// assert!(r2 > 0.98);
/// ```
pub fn r_squared<T: Value>(y: impl Iterator<Item = T>, y_fit: impl Iterator<Item = T>) -> T {
    let (r2, _) = r_squared_with_n(y, y_fit);
    r2
}

/// Calculate the adjusted R-squared value for a model with `k` coefficients, the constant
/// term included.
///
/// Unlike [`r_squared`], this penalizes extra terms, so it can be compared between fits of
/// different degrees over the same data.
///
/// ```math
/// R²_adj = 1 - (1 - R²) * (N - 1) / (N - k)
/// ```
///
/// Returns NaN when `N == k`.
pub fn adjusted_r_squared<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
    k: T,
) -> T {
    let (r2, n) = r_squared_with_n(y, y_fit);
    if n == k {
        return T::nan();
    }
    T::one() - (T::one() - r2) * (n - T::one()) / (n - k)
}

/// Returns (R², n)
fn r_squared_with_n<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
) -> (T, T) {
    let y: Vec<T> = y.collect();
    let y_mean = mean(y.iter().copied());

    let mut ss_total = T::zero();
    let mut ss_residual = T::zero();
    let mut n = T::zero();
    for (y, y_fit) in y.into_iter().zip(y_fit) {
        ss_total += Value::powi(y - y_mean, 2);
        ss_residual += Value::powi(y - y_fit, 2);
        n += T::one();
    }

    if ss_total.is_zero() {
        let r2 = if ss_residual.is_zero() {
            T::one()
        } else {
            T::zero()
        };
        return (r2, n);
    }

    (T::one() - ss_residual / ss_total, n)
}

/// Computes the mean absolute error (MAE) between two sets of values.
///
/// ```math
/// MAE = (Σ |y_i - y_fit_i|) / N
/// ```
///
/// # Example
/// ```rust
/// # use basisfit::statistics::mean_absolute_error;
/// let y: Vec<f64> = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.5, 2.0, 2.5];
/// let mae = mean_absolute_error(y.into_iter(), y_fit.into_iter());
/// assert!((mae - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn mean_absolute_error<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
) -> T {
    let mut total = T::zero();
    let mut n = T::zero();
    for (y, y_fit) in y.zip(y_fit) {
        total += Value::abs(y - y_fit);
        n += T::one();
    }
    total / n
}

/// Computes the root mean squared error (RMSE) between two sets of values.
///
/// RMSE is the square root of the mean squared error, giving the error
/// in the same units as the observed values. Lower values indicate a better fit.
///
/// # Example
/// ```
/// # use basisfit::statistics::root_mean_squared_error;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.1, 1.9, 3.05];
/// let rmse = root_mean_squared_error(y.into_iter(), y_fit.into_iter());
/// ```
pub fn root_mean_squared_error<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
) -> T {
    mean_squared_error(y, y_fit).sqrt()
}

/// Computes the mean squared error (MSE) between two sets of values.
///
/// For comparing fits of different degrees, prefer [`adjusted_r_squared`].
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// MSE = (Σ (y_i - y_fit_i)²) / N
/// ```
/// This is the quantity the least-squares fitter minimizes.
/// </div>
///
/// # Example
/// ```
/// # use basisfit::statistics::mean_squared_error;
/// let y = vec![1.0, 2.0, 3.0];
/// let y_fit = vec![1.0, 2.0, 5.0];
/// let mse = mean_squared_error(y.into_iter(), y_fit.into_iter());
/// assert_eq!(mse, 4.0 / 3.0);
/// ```
pub fn mean_squared_error<T: Value>(
    y: impl Iterator<Item = T>,
    y_fit: impl Iterator<Item = T>,
) -> T {
    let mut total = T::zero();
    let mut n = T::zero();
    for (y, y_fit) in y.zip(y_fit) {
        total += Value::powi(y - y_fit, 2);
        n += T::one();
    }
    total / n
}
