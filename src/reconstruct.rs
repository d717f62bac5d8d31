//! Turning coefficients back into values.
//!
//! [`Reconstructor`] evaluates fitted coefficients over a design matrix, usually one built from a
//! dense reconstruction grid rather than the fit samples, and optionally clamps the result.
//! [`Raster`] reshapes the flat predictions back into a `height x width` image.
use nalgebra::DVector;

use crate::{
    basis::{DesignMatrix, TermLabel},
    config::FitConfig,
    error::{Error, Result},
    fit::Coefficients,
    grid::GridShape,
    value::Value,
};

/// Evaluates coefficients over a design matrix.
///
/// # Example
/// ```
/// use basisfit::{basis::TermLabel, fit::Coefficients, reconstruct::Reconstructor};
/// # use basisfit::basis::DesignMatrix;
/// # use basisfit::nalgebra::DMatrix;
/// let labels = vec![TermLabel::Monomial(vec![0]), TermLabel::Monomial(vec![1])];
/// let design = DesignMatrix::new(DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 2.0]), labels.clone()).unwrap();
/// let coefficients = Coefficients::new(vec![0.5, 1.0], labels).unwrap();
///
/// let values = Reconstructor::new().with_clamp(0.0, 1.0).unwrap().predict(&design, &coefficients).unwrap();
/// assert_eq!(values, vec![0.5, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reconstructor<T: Value = f64> {
    clamp: Option<(T, T)>,
}
impl<T: Value> Reconstructor<T> {
    /// A reconstructor that does not clamp.
    #[must_use]
    pub fn new() -> Self {
        Self { clamp: None }
    }

    /// A reconstructor using the clamp range of a [`FitConfig`].
    ///
    /// # Errors
    /// See [`FitConfig::clamp_range`].
    pub fn from_config(config: &FitConfig) -> Result<Self> {
        Ok(Self {
            clamp: config.clamp_range()?,
        })
    }

    /// Clamps every prediction to `lo..=hi`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `lo > hi` or either bound is NaN.
    pub fn with_clamp(mut self, lo: T, hi: T) -> Result<Self> {
        if lo.is_nan() || hi.is_nan() {
            return Err(Error::InvalidRange("clamp bounds must not be NaN"));
        } else if lo > hi {
            return Err(Error::InvalidRange("clamp lower bound exceeds upper bound"));
        }

        self.clamp = Some((lo, hi));
        Ok(self)
    }

    /// The configured clamp range, if any.
    #[must_use]
    pub fn clamp_range(&self) -> Option<(T, T)> {
        self.clamp
    }

    /// Computes `design · coefficients`, clamped if configured.
    ///
    /// The coefficient labels must match the design labels term for term. A trailing
    /// [`TermLabel::Intercept`] coefficient that the design does not carry is applied as a
    /// constant offset to every value.
    ///
    /// Predicting is a pure function of its inputs: the same call always gives the same values.
    ///
    /// # Errors
    /// Returns [`Error::LabelMismatch`] if the coefficients were not fit against this basis.
    pub fn predict(&self, design: &DesignMatrix<T>, coefficients: &Coefficients<T>) -> Result<Vec<T>> {
        let labels = design.labels();
        let (values, offset) = match coefficients.labels() {
            l if l == labels => (coefficients.values(), T::zero()),
            [rest @ .., TermLabel::Intercept] if rest == labels => {
                let (intercept, values) = coefficients
                    .values()
                    .split_last()
                    .ok_or(Error::LabelMismatch)?;
                (values, *intercept)
            }
            _ => return Err(Error::LabelMismatch),
        };

        let coefficients = DVector::from_column_slice(values);
        let mut predicted = design.matrix() * coefficients;
        if offset != T::zero() {
            predicted.add_scalar_mut(offset);
        }

        let mut predicted: Vec<T> = predicted.iter().copied().collect();
        self.clamp(&mut predicted);
        Ok(predicted)
    }

    /// Clamps values in place to the configured range, if any.
    pub fn clamp(&self, values: &mut [T]) {
        if let Some((lo, hi)) = self.clamp {
            for v in values {
                *v = nalgebra::RealField::clamp(*v, lo, hi);
            }
        }
    }

    /// Reshapes a flat, row-major prediction into a single-channel raster.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `values.len() != shape.height * shape.width`.
    pub fn to_raster(&self, values: Vec<T>, shape: GridShape) -> Result<Raster<T>> {
        Raster::new(shape, 1, values)
    }
}

/// A row-major `height x width` grid of values, with one or more interleaved channels.
///
/// The value of channel `c` at `(row, col)` is at `data[(row * width + col) * channels + c]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Raster<T: Value = f64> {
    shape: GridShape,
    channels: usize,
    data: Vec<T>,
}
impl<T: Value> Raster<T> {
    /// Wraps interleaved data in a raster.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if `data.len() != height * width * channels`.
    pub fn new(shape: GridShape, channels: usize, data: Vec<T>) -> Result<Self> {
        let expected = shape.len() * channels;
        if data.len() != expected || channels == 0 {
            return Err(Error::ShapeMismatch {
                height: shape.height,
                width: shape.width,
                expected,
                got: data.len(),
            });
        }

        Ok(Self {
            shape,
            channels,
            data,
        })
    }

    /// Interleaves separately-predicted channels into one raster.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `channels` is empty.
    /// - [`Error::ShapeMismatch`] if any channel does not have exactly `height * width` values.
    pub fn from_channels<C: AsRef<[T]>>(shape: GridShape, channels: &[C]) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::NoData);
        }

        let pixels = shape.len();
        for channel in channels {
            let got = channel.as_ref().len();
            if got != pixels {
                return Err(Error::ShapeMismatch {
                    height: shape.height,
                    width: shape.width,
                    expected: pixels,
                    got,
                });
            }
        }

        let mut data = Vec::with_capacity(pixels * channels.len());
        for i in 0..pixels {
            data.extend(channels.iter().map(|c| c.as_ref()[i]));
        }

        Self::new(shape, channels.len(), data)
    }

    /// The grid shape.
    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of interleaved channels.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The raw interleaved data, row-major.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the raster, returning the raw data.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Value of `channel` at `(row, col)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<T> {
        if row >= self.shape.height || col >= self.shape.width || channel >= self.channels {
            return None;
        }

        self.data
            .get((row * self.shape.width + col) * self.channels + channel)
            .copied()
    }

    /// All values of one row, channels interleaved.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[T]> {
        let stride = self.shape.width * self.channels;
        self.data.get(row * stride..(row + 1) * stride)
    }

    /// Extracts a single channel, row-major.
    #[must_use]
    pub fn channel(&self, channel: usize) -> Option<Vec<T>> {
        if channel >= self.channels {
            return None;
        }

        Some(
            self.data
                .iter()
                .skip(channel)
                .step_by(self.channels)
                .copied()
                .collect(),
        )
    }
}
