use nalgebra::MatrixViewMut;

use crate::{
    basis::{Basis, TermLabel},
    config::DegreeRange,
    error::Result,
    value::Value,
};

/// Real spherical harmonics `Y_l^m(θ, φ)` for `l = 0..=L`, `m = -l..=l`.
///
/// Samples are `(θ, φ)` pairs: polar angle θ in `[0, π]` measured from the +z axis, and
/// azimuth φ in `[0, 2π)`. Angles outside those ranges are evaluated as-is.
///
/// The real harmonics are built from the orthonormal complex harmonics (with the
/// Condon-Shortley phase) as:
/// ```text
/// m > 0:  √2 · (-1)^m · Re(Y_l^|m|)
/// m < 0:  √2 · (-1)^m · Im(Y_l^|m|)
/// m = 0:  Y_l^0
/// ```
///
/// Which makes them orthonormal over the unit sphere:
/// `∫ Y_l^m · Y_l'^m' dΩ = δ_ll' · δ_mm'`
///
/// Associated Legendre values are computed with the fully-normalized upward recurrence, so
/// there are no factorials anywhere and high degrees stay finite. Every coefficient of the
/// recurrence is computed once, on construction.
///
/// Terms are ordered by `l` ascending, then `m` ascending, giving `(L+1)²` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalHarmonicBasis<T: Value = f64> {
    max_degree: u32,

    /// `1/√(4π)`, the value of `P̄_0^0`
    seed: T,

    /// `√((2m+1)/(2m))`, indexed by m; seeds `P̄_m^m` from `P̄_(m-1)^(m-1)`
    sectoral: Vec<T>,

    /// `√((4l²-1)/(l²-m²))` for `m < l`, packed by [`packed`]
    recurrence: Vec<T>,

    /// `√2`, applied to every `m != 0` term
    root_two: T,
}
impl<T: Value> SphericalHarmonicBasis<T> {
    /// Creates a basis with every harmonic up to degree `max_degree`.
    ///
    /// # Errors
    /// - [`crate::error::Error::InvalidDegree`] if `max_degree` is outside `range`.
    /// - [`crate::error::Error::CastFailed`] if the recurrence constants do not fit in `T`.
    ///
    /// # Example
    /// ```rust
    /// use basisfit::{basis::{Basis, SphericalHarmonicBasis}, config::DegreeRange};
    /// let basis = SphericalHarmonicBasis::<f64>::new(2, DegreeRange::SPHERICAL).unwrap();
    /// assert_eq!(basis.k(), 9);
    /// ```
    pub fn new(max_degree: u32, range: DegreeRange) -> Result<Self> {
        range.check(max_degree)?;
        let l_max = max_degree as usize;

        let four_pi = T::two() * T::two() * T::pi();
        let seed = T::one() / four_pi.sqrt();

        let mut sectoral = vec![T::zero(); l_max + 1];
        for m in 1..=l_max {
            sectoral[m] = (T::try_cast(2 * m + 1)? / T::try_cast(2 * m)?).sqrt();
        }

        let mut recurrence = vec![T::zero(); packed(l_max, l_max) + 1];
        for l in 1..=l_max {
            for m in 0..l {
                let num = T::try_cast(4 * l * l - 1)?;
                let den = T::try_cast(l * l - m * m)?;
                recurrence[packed(l, m)] = (num / den).sqrt();
            }
        }

        Ok(Self {
            max_degree,
            seed,
            sectoral,
            recurrence,
            root_two: T::two().sqrt(),
        })
    }

    /// The maximum degree `L`.
    #[must_use]
    pub fn max_degree(&self) -> u32 {
        self.max_degree
    }

    /// Column index of `Y_l^m`, or `None` if the term is not part of this basis.
    #[must_use]
    pub fn column_of(&self, l: u32, m: i32) -> Option<usize> {
        if l > self.max_degree || m.unsigned_abs() > l {
            return None;
        }

        let l = l as usize;
        let offset = l * l + l;
        Some(if m < 0 {
            offset - m.unsigned_abs() as usize
        } else {
            offset + m.unsigned_abs() as usize
        })
    }

    /// Evaluates a single real harmonic at `(theta, phi)`.
    ///
    /// Returns `None` if `(l, m)` is not part of this basis.
    #[must_use]
    pub fn solve_function(&self, l: u32, m: i32, theta: T, phi: T) -> Option<T> {
        let j = self.column_of(l, m)?;
        let mut row = nalgebra::DMatrix::zeros(1, self.k());
        self.fill_matrix_row(&[theta, phi], row.row_mut(0));
        Some(row[(0, j)])
    }

    /// Fully-normalized associated Legendre values `P̄_l^m(cos θ)` for all `m <= l <= L`,
    /// packed by [`packed`]. Includes the Condon-Shortley phase.
    fn legendre(&self, theta: T) -> Vec<T> {
        let l_max = self.max_degree as usize;
        let x = theta.cos();
        let s = Value::abs(theta.sin());

        let mut p = vec![T::zero(); packed(l_max, l_max) + 1];
        let mut p_mm = self.seed;
        for m in 0..=l_max {
            if m > 0 {
                p_mm = -self.sectoral[m] * s * p_mm;
            }
            p[packed(m, m)] = p_mm;

            if m == l_max {
                break;
            }
            p[packed(m + 1, m)] = self.recurrence[packed(m + 1, m)] * x * p_mm;

            for l in m + 2..=l_max {
                let a = self.recurrence[packed(l, m)];
                let a_prev = self.recurrence[packed(l - 1, m)];
                p[packed(l, m)] = a * (x * p[packed(l - 1, m)] - p[packed(l - 2, m)] / a_prev);
            }
        }

        p
    }
}
impl<T: Value> Basis<T> for SphericalHarmonicBasis<T> {
    fn dimensions(&self) -> usize {
        2
    }

    fn degree(&self) -> u32 {
        self.max_degree
    }

    fn labels(&self) -> Vec<TermLabel> {
        (0..=self.max_degree)
            .flat_map(|l| {
                let li = i32::try_from(l).unwrap_or(i32::MAX);
                (-li..=li).map(move |m| TermLabel::Harmonic { l, m })
            })
            .collect()
    }

    fn k(&self) -> usize {
        let n = self.max_degree as usize + 1;
        n * n
    }

    fn fill_matrix_row<R: nalgebra::Dim, C: nalgebra::Dim, RS: nalgebra::Dim, CS: nalgebra::Dim>(
        &self,
        coords: &[T],
        mut row: MatrixViewMut<T, R, C, RS, CS>,
    ) {
        let (theta, phi) = (coords[0], coords[1]);
        let p = self.legendre(theta);

        for l in 0..=self.max_degree as usize {
            let offset = l * l + l;
            row[offset] = p[packed(l, 0)];

            for m in 1..=l {
                let mut scaled = self.root_two * p[packed(l, m)];
                if m % 2 == 1 {
                    scaled = -scaled;
                }

                let angle = T::from_positive_int(m) * phi;
                row[offset + m] = scaled * angle.cos();
                row[offset - m] = scaled * angle.sin();
            }
        }
    }
}

/// Index of `(l, m)`, `m <= l`, in a triangular table stored row by row.
fn packed(l: usize, m: usize) -> usize {
    l * (l + 1) / 2 + m
}
