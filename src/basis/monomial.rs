use nalgebra::MatrixViewMut;

use crate::{
    basis::{Basis, TermLabel},
    config::DegreeRange,
    error::{Error, Result},
    value::Value,
};

/// Total-degree monomial basis over D-dimensional coordinates.
///
/// The basis contains every product of coordinate powers whose exponents sum to at most
/// `degree`, including the constant term:
///
/// ```text
/// D = 1, degree = 3:  1, x, x², x³
/// D = 2, degree = 2:  1, x, y, x², x·y, y²
/// ```
///
/// Terms are graded: all terms of total degree 0, then 1, and so on. Within one total degree,
/// terms with a higher power of the first dimension come first, then the second, etc.
///
/// The basis is **not normalized**, so high degrees over large coordinates produce
/// badly-conditioned design matrices. Map coordinates to a unit range first
/// (see [`crate::grid::unit_square`]) when fitting images.
#[derive(Debug, Clone, PartialEq)]
pub struct MonomialBasis<T: Value = f64> {
    dimensions: usize,
    degree: u32,
    exponents: Vec<Vec<u32>>,
    _marker: std::marker::PhantomData<T>,
}
impl<T: Value> MonomialBasis<T> {
    /// Creates a monomial basis of the given dimensionality and total degree.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `degree` is outside `range`.
    /// - [`Error::DimensionMismatch`] if `dimensions` is 0.
    ///
    /// # Example
    /// ```rust
    /// use basisfit::{basis::{Basis, MonomialBasis}, config::DegreeRange};
    /// let basis = MonomialBasis::<f64>::new(2, 2, DegreeRange::IMAGE).unwrap();
    /// assert_eq!(basis.k(), 6);
    /// ```
    pub fn new(dimensions: usize, degree: u32, range: DegreeRange) -> Result<Self> {
        range.check(degree)?;
        if dimensions == 0 {
            return Err(Error::DimensionMismatch {
                what: "basis dimensions",
                expected: 1,
                got: 0,
            });
        }

        let exponents = (0..=degree)
            .flat_map(|total| exponents_of_degree(dimensions, total))
            .collect();

        Ok(Self {
            dimensions,
            degree,
            exponents,
            _marker: std::marker::PhantomData,
        })
    }

    /// Exponent tuples of each term, in column order.
    #[must_use]
    pub fn exponents(&self) -> &[Vec<u32>] {
        &self.exponents
    }

    /// Evaluates the jth basis function at `coords`.
    ///
    /// Returns `None` if `j` is not a term of this basis.
    #[must_use]
    pub fn solve_function(&self, j: usize, coords: &[T]) -> Option<T> {
        let exponents = self.exponents.get(j)?;
        let mut value = T::one();
        for (&x, &e) in coords.iter().zip(exponents) {
            value *= match e {
                0 => T::one(),
                1 => x,
                _ => Value::powi(x, i32::try_from(e).unwrap_or(i32::MAX)),
            };
        }
        Some(value)
    }
}
impl<T: Value> Basis<T> for MonomialBasis<T> {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn degree(&self) -> u32 {
        self.degree
    }

    fn labels(&self) -> Vec<TermLabel> {
        self.exponents.iter().cloned().map(TermLabel::Monomial).collect()
    }

    fn k(&self) -> usize {
        self.exponents.len()
    }

    fn fill_matrix_row<R: nalgebra::Dim, C: nalgebra::Dim, RS: nalgebra::Dim, CS: nalgebra::Dim>(
        &self,
        coords: &[T],
        mut row: MatrixViewMut<T, R, C, RS, CS>,
    ) {
        // powers[d][e] = coords[d]^e, built by repeated multiplication
        let degree = self.degree as usize;
        let powers: Vec<Vec<T>> = coords
            .iter()
            .map(|&x| {
                let mut column = Vec::with_capacity(degree + 1);
                let mut p = T::one();
                for _ in 0..=degree {
                    column.push(p);
                    p *= x;
                }
                column
            })
            .collect();

        for (j, exponents) in self.exponents.iter().enumerate() {
            let mut value = T::one();
            for (d, &e) in exponents.iter().enumerate() {
                value *= powers[d][e as usize];
            }
            row[j] = value;
        }
    }
}

/// All exponent tuples over `dimensions` coordinates that sum to exactly `total`.
///
/// Ordered with the first exponent descending, then the second, and so on, which is the
/// order of choosing `total` dimensions with replacement.
fn exponents_of_degree(dimensions: usize, total: u32) -> Vec<Vec<u32>> {
    if dimensions == 1 {
        return vec![vec![total]];
    }

    let mut out = Vec::new();
    for first in (0..=total).rev() {
        for mut rest in exponents_of_degree(dimensions - 1, total - first) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}

/// Number of monomials in `dimensions` variables with total degree at most `degree`.
///
/// This is the binomial coefficient `C(dimensions + degree, dimensions)`.
#[must_use]
pub fn term_count(dimensions: usize, degree: u32) -> usize {
    let n = dimensions + degree as usize;
    let k = dimensions.min(degree as usize);
    let mut count = 1usize;
    for i in 0..k {
        count = count * (n - i) / (i + 1);
    }
    count
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::test::basis_assertions::{assert_basis_matrix_row, assert_term_count};

    use super::*;

    const ANY: DegreeRange = DegreeRange::new(0, 12);

    fn labels(dimensions: usize, degree: u32) -> Vec<TermLabel> {
        MonomialBasis::<f64>::new(dimensions, degree, ANY)
            .unwrap()
            .labels()
    }

    #[test]
    fn test_monomial_1d() {
        let basis = MonomialBasis::<f64>::new(1, 3, ANY).unwrap();
        assert_basis_matrix_row(&basis, &[2.0], &[1.0, 2.0, 4.0, 8.0]);
        assert_basis_matrix_row(&basis, &[0.5], &[1.0, 0.5, 0.25, 0.125]);
        assert_eq!(basis.solve_function(3, &[2.0]), Some(8.0));
        assert_eq!(basis.solve_function(4, &[2.0]), None);
    }

    #[test]
    fn test_monomial_2d_order() {
        let expected: Vec<TermLabel> = [[0, 0], [1, 0], [0, 1], [2, 0], [1, 1], [0, 2]]
            .iter()
            .map(|e| TermLabel::Monomial(e.to_vec()))
            .collect();
        assert_eq!(labels(2, 2), expected);

        let basis = MonomialBasis::<f64>::new(2, 2, ANY).unwrap();
        assert_basis_matrix_row(&basis, &[1.0, 2.0], &[1.0, 1.0, 2.0, 1.0, 2.0, 4.0]);
        assert_basis_matrix_row(&basis, &[3.0, 4.0], &[1.0, 3.0, 4.0, 9.0, 12.0, 16.0]);
    }

    #[test]
    fn test_monomial_3d_order() {
        // 1, x, y, z, x², xy, xz, y², yz, z²
        let basis = MonomialBasis::<f64>::new(3, 2, ANY).unwrap();
        assert_basis_matrix_row(
            &basis,
            &[1.0, 2.0, 3.0],
            &[1.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0, 6.0, 9.0],
        );
        assert_basis_matrix_row(
            &basis,
            &[4.0, 5.0, 6.0],
            &[1.0, 4.0, 5.0, 6.0, 16.0, 20.0, 24.0, 25.0, 30.0, 36.0],
        );
    }

    #[test]
    fn test_monomial_graded() {
        let labels = labels(3, 4);
        let degrees: Vec<u32> = labels.iter().map(TermLabel::degree).collect();
        assert!(degrees.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(labels[0], TermLabel::Monomial(vec![0, 0, 0]));
    }

    #[test]
    fn test_monomial_term_counts() {
        for dimensions in 1..=4 {
            for degree in 0..=6 {
                let basis = MonomialBasis::<f64>::new(dimensions, degree, ANY).unwrap();
                assert_term_count(&basis, term_count(dimensions, degree));
            }
        }

        assert_eq!(term_count(2, 2), 6);
        assert_eq!(term_count(1, 5), 6);
        assert_eq!(term_count(3, 2), 10);
        assert_eq!(term_count(2, 0), 1);
    }

    #[test]
    fn test_monomial_degree_zero() {
        let basis = MonomialBasis::<f64>::new(2, 0, ANY).unwrap();
        assert_eq!(basis.labels(), vec![TermLabel::Monomial(vec![0, 0])]);
        assert_basis_matrix_row(&basis, &[7.0, -3.0], &[1.0]);
    }

    #[test]
    fn test_monomial_validation() {
        assert_eq!(
            MonomialBasis::<f64>::new(2, 7, DegreeRange::IMAGE),
            Err(Error::InvalidDegree {
                degree: 7,
                min: 1,
                max: 6
            })
        );
        assert!(MonomialBasis::<f64>::new(2, 0, DegreeRange::IMAGE).is_err());
        assert!(matches!(
            MonomialBasis::<f64>::new(0, 2, ANY),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_monomial_expand() {
        let basis = MonomialBasis::<f64>::new(2, 1, ANY).unwrap();
        let design = basis.expand(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        assert_eq!(design.n_samples(), 3);
        assert_eq!(design.n_terms(), 3);
        assert_eq!(design.matrix()[(2, 1)], 5.0);
        assert_eq!(design.matrix()[(2, 2)], 6.0);

        let bad = basis.expand(&[vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            bad,
            Err(Error::DimensionMismatch {
                what: "sample coordinates",
                expected: 2,
                got: 1
            })
        );

        let empty: &[[f64; 2]] = &[];
        assert_eq!(basis.expand(empty), Err(Error::NoData));

        let capped = basis.expand_bounded(&[[1.0, 2.0], [3.0, 4.0]], Some(5));
        assert_eq!(capped, Err(Error::CapacityExceeded { cells: 6, limit: 5 }));
    }
}
