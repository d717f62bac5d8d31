//! Coordinate grids for fitting and reconstruction.
//!
//! Every grid is row-major: sample `row * width + col` is pixel `(row, col)`, so a flat
//! prediction over the grid reshapes directly into a [`crate::reconstruct::Raster`] of the same
//! [`GridShape`].
//!
//! # Provided grids
//! - [`unit_square`]: `(u, v)` in `[0, 1]²`, u across the width, v down the height.
//! - [`spherical`]: `(θ, φ)` with `θ = v·π` and `φ = u·2π`, the equirectangular mapping.
//! - [`pixel_grid`]: raw `(col, row)` pixel indices.
//! - [`mesh`]: any axis-aligned rectangle, e.g. the [`extent`] of scattered samples.
use crate::{
    error::{Error, Result},
    value::Value,
};

/// Raster layout of a grid: `height` rows of `width` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridShape {
    /// Number of rows
    pub height: usize,

    /// Number of columns
    pub width: usize,
}
impl GridShape {
    /// Creates a new grid shape.
    #[must_use]
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Number of samples in the grid.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.height * self.width
    }

    /// Returns true if the grid has no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Iterator over `n` evenly spaced values from `start` to `end`, both included.
///
/// With `n == 1`, yields only `start`.
#[derive(Debug, Clone)]
pub struct Linspace<T: Value> {
    start: T,
    step: T,
    index: usize,
    n: usize,
    end: T,
}
impl<T: Value> Linspace<T> {
    /// Creates the iterator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if either bound is not finite.
    pub fn new(start: T, end: T, n: usize) -> Result<Self> {
        if !num_traits::float::FloatCore::is_finite(start)
            || !num_traits::float::FloatCore::is_finite(end)
        {
            return Err(Error::InvalidRange("grid bounds must be finite"));
        }

        let step = if n > 1 {
            (end - start) / T::try_cast(n - 1)?
        } else {
            T::zero()
        };

        Ok(Self {
            start,
            step,
            index: 0,
            n,
            end,
        })
    }
}
impl<T: Value> Iterator for Linspace<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.n {
            return None;
        }

        // Land exactly on the end point instead of accumulating rounding error
        let value = if self.index + 1 == self.n && self.n > 1 {
            self.end
        } else {
            self.start + T::from_positive_int(self.index) * self.step
        };

        self.index += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n - self.index;
        (remaining, Some(remaining))
    }
}
impl<T: Value> ExactSizeIterator for Linspace<T> {}

/// `n` evenly spaced values from `start` to `end`, both included.
///
/// # Errors
/// Returns [`Error::InvalidRange`] if either bound is not finite.
pub fn linspace<T: Value>(start: T, end: T, n: usize) -> Result<Vec<T>> {
    Ok(Linspace::new(start, end, n)?.collect())
}

/// Row-major grid over a rectangle: u spans `u_range` across the width, v spans `v_range`
/// down the height. Samples are `[u, v]`.
///
/// # Errors
/// Returns [`Error::InvalidRange`] if any bound is not finite.
pub fn mesh<T: Value>(u_range: (T, T), v_range: (T, T), shape: GridShape) -> Result<Vec<[T; 2]>> {
    let us = linspace(u_range.0, u_range.1, shape.width)?;
    let vs = linspace(v_range.0, v_range.1, shape.height)?;

    let mut samples = Vec::with_capacity(shape.len());
    for &v in &vs {
        samples.extend(us.iter().map(|&u| [u, v]));
    }
    Ok(samples)
}

/// Row-major `(u, v)` grid over the unit square.
///
/// Pixel `(row, col)` maps to `u = col / (width - 1)`, `v = row / (height - 1)`, so the
/// corners of the image land exactly on the corners of the square.
///
/// # Errors
/// Returns [`Error::CastFailed`] if the grid size cannot be represented in `T`.
///
/// # Example
/// ```
/// use basisfit::grid::{unit_square, GridShape};
/// let samples = unit_square::<f64>(GridShape::new(2, 3)).unwrap();
/// assert_eq!(samples[1], [0.5, 0.0]);
/// assert_eq!(samples[5], [1.0, 1.0]);
/// ```
pub fn unit_square<T: Value>(shape: GridShape) -> Result<Vec<[T; 2]>> {
    mesh((T::zero(), T::one()), (T::zero(), T::one()), shape)
}

/// Row-major `(θ, φ)` grid for equirectangular images.
///
/// Each unit-square sample `(u, v)` maps to polar angle `θ = v·π` and azimuth `φ = u·2π`: the
/// top row is the north pole and the columns sweep once around the sphere.
///
/// # Errors
/// Returns [`Error::CastFailed`] if the grid size cannot be represented in `T`.
pub fn spherical<T: Value>(shape: GridShape) -> Result<Vec<[T; 2]>> {
    let two_pi = T::two() * T::pi();
    Ok(unit_square::<T>(shape)?
        .into_iter()
        .map(|[u, v]| [v * T::pi(), u * two_pi])
        .collect())
}

/// Row-major grid of raw pixel indices, as `[col, row]`.
///
/// # Errors
/// Returns [`Error::CastFailed`] if an index cannot be represented in `T`.
pub fn pixel_grid<T: Value>(shape: GridShape) -> Result<Vec<[T; 2]>> {
    let last = |n: usize| -> Result<T> { T::try_cast(n.saturating_sub(1)) };
    mesh(
        (T::zero(), last(shape.width)?),
        (T::zero(), last(shape.height)?),
        shape,
    )
}

/// Per-dimension `(min, max)` of a set of samples.
///
/// Use it to reconstruct over the region the data covers, e.g.
/// `mesh(extent[0], extent[1], shape)` for 2D points.
///
/// # Errors
/// - [`Error::NoData`] if `samples` is empty.
/// - [`Error::DimensionMismatch`] if the samples do not all have the same width.
/// - [`Error::InvalidRange`] if any coordinate is not finite.
pub fn extent<T: Value, S: AsRef<[T]>>(samples: &[S]) -> Result<Vec<(T, T)>> {
    let first = samples.first().ok_or(Error::NoData)?.as_ref();
    let mut bounds: Vec<(T, T)> = first.iter().map(|&x| (x, x)).collect();

    for sample in samples {
        let coords = sample.as_ref();
        if coords.len() != bounds.len() {
            return Err(Error::DimensionMismatch {
                what: "sample coordinates",
                expected: bounds.len(),
                got: coords.len(),
            });
        }

        for (&x, (lo, hi)) in coords.iter().zip(bounds.iter_mut()) {
            if !num_traits::float::FloatCore::is_finite(x) {
                return Err(Error::InvalidRange("sample coordinates must be finite"));
            }
            *lo = nalgebra::RealField::min(*lo, x);
            *hi = nalgebra::RealField::max(*hi, x);
        }
    }

    Ok(bounds)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::assert_all_close;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5).unwrap(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 2.0, 3).unwrap(), vec![2.0, 2.0, 2.0]);
        assert_eq!(linspace(3.0, 9.0, 1).unwrap(), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).unwrap().is_empty());
        assert_eq!(linspace(1.0, -1.0, 3).unwrap(), vec![1.0, 0.0, -1.0]);

        let values = linspace(0.0, 0.3, 4).unwrap();
        assert_all_close!(values, [0.0, 0.1, 0.2, 0.3]);
        assert_eq!(values[3], 0.3);

        assert_eq!(Linspace::new(0.0, 1.0, 7).unwrap().len(), 7);
        assert!(matches!(linspace(0.0, f64::INFINITY, 3), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn test_unit_square() {
        let shape = GridShape::new(3, 2);
        let samples = unit_square::<f64>(shape).unwrap();
        assert_eq!(samples.len(), shape.len());
        assert_eq!(
            samples,
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.5], [1.0, 0.5], [0.0, 1.0], [1.0, 1.0]]
        );

        assert!(unit_square::<f64>(GridShape::new(0, 4)).unwrap().is_empty());
        assert_eq!(unit_square::<f64>(GridShape::new(1, 1)).unwrap(), vec![[0.0, 0.0]]);
    }

    #[test]
    fn test_spherical_grid() {
        let samples = spherical::<f64>(GridShape::new(3, 5)).unwrap();
        assert_eq!(samples.len(), 15);

        // Top-left: north pole, φ = 0; bottom-right: south pole, φ = 2π
        assert_eq!(samples[0], [0.0, 0.0]);
        assert_all_close!(samples[14], [std::f64::consts::PI, std::f64::consts::TAU]);

        // Middle row is the equator, columns step a quarter turn
        assert_all_close!(samples[6], [std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2]);
    }

    #[test]
    fn test_pixel_grid() {
        let samples = pixel_grid::<f64>(GridShape::new(2, 3)).unwrap();
        assert_eq!(
            samples,
            vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 1.0]]
        );
    }

    #[test]
    fn test_extent_and_mesh() {
        let points = [[1.0, -2.0], [3.0, 0.5], [-1.0, 4.0]];
        let bounds = extent(&points).unwrap();
        assert_eq!(bounds, vec![(-1.0, 3.0), (-2.0, 4.0)]);

        let samples = mesh(bounds[0], bounds[1], GridShape::new(2, 2)).unwrap();
        assert_eq!(samples, vec![[-1.0, -2.0], [3.0, -2.0], [-1.0, 4.0], [3.0, 4.0]]);

        let empty: &[[f64; 2]] = &[];
        assert_eq!(extent(empty), Err(Error::NoData));
        assert!(matches!(
            extent(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(extent(&[[f64::NAN]]).is_err());
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(GridShape::new(480, 640).to_string(), "480x640");
        assert!(GridShape::new(0, 3).is_empty());
    }
}
