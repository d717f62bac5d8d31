//! A set of functions for testing bases.
use std::collections::HashSet;

use crate::{assert_close, basis::Basis, value::Value};

/// Asserts that a basis correctly fills a matrix row with expected values.
///
/// The row is filled into the middle of a 3-row matrix, so the strided view is exercised and
/// the neighbouring rows must come back untouched.
///
/// # Parameters
/// - `basis`: The basis instance to test (must implement [`crate::basis::Basis`]).
/// - `coords`: The point at which to evaluate the basis functions.
/// - `expected`: Slice of expected values corresponding to each basis function.
///
/// # Panics
/// Panics if the term count differs, or any filled matrix value deviates from the expected value.
pub fn assert_basis_matrix_row<B: Basis<T>, T: Value>(basis: &B, coords: &[T], expected: &[T]) {
    assert_eq!(basis.k(), expected.len(), "Expected one value per term");
    assert_eq!(basis.dimensions(), coords.len(), "Expected one coordinate per dimension");

    let mut matrix = nalgebra::DMatrix::<T>::zeros(3, expected.len());
    basis.fill_matrix_row(coords, matrix.row_mut(1));

    for i in 0..expected.len() {
        assert_eq!(matrix[(0, i)], T::zero(), "Row 0 col {i} should be zero");
        assert_eq!(matrix[(2, i)], T::zero(), "Row 2 col {i} should be zero");
        assert_close!(matrix[(1, i)], expected[i], "Matrix col {i}");
    }
}

/// Asserts that a basis has the expected number of terms, all distinct.
///
/// # Panics
/// Panics if [`Basis::k`] or the label count is wrong, or any label repeats.
pub fn assert_term_count<B: Basis<T>, T: Value>(basis: &B, expected: usize) {
    let labels = basis.labels();
    assert_eq!(basis.k(), expected, "Basis::k");
    assert_eq!(labels.len(), expected, "Basis::labels");

    let unique: HashSet<_> = labels.iter().collect();
    assert_eq!(unique.len(), expected, "Duplicate labels in {labels:?}");
}

/// Tests that a basis is orthonormal under a weighted quadrature rule.
///
/// Builds the Gram matrix `Aᵀ·W·A` from the design matrix of `samples`, and checks:
/// - Diagonal elements are 1 within `tol`.
/// - Off-diagonal elements are 0 within `tol`.
///
/// On failure, prints the Gram matrix for debugging.
///
/// # Parameters
/// - `basis`: The basis instance to test.
/// - `samples`: Quadrature nodes.
/// - `weights`: Quadrature weight of each node.
/// - `tol`: Tolerance for orthonormality checks.
///
/// # Panics
/// Panics if the orthonormality conditions are not met.
pub fn assert_basis_orthonormal<B, T, S>(basis: &B, samples: &[S], weights: &[T], tol: T)
where
    T: Value,
    B: Basis<T>,
    S: AsRef<[T]>,
{
    assert_eq!(samples.len(), weights.len(), "need one weight per node");

    let design = match basis.expand(samples) {
        Ok(design) => design,
        Err(e) => panic!("Failed to expand quadrature nodes: {e}"),
    };
    let a = design.matrix();

    let mut weighted = a.clone();
    for (mut row, &w) in weighted.row_iter_mut().zip(weights) {
        row *= w;
    }
    let gram_matrix = a.transpose() * weighted;

    let k = basis.k();
    for i in 0..k {
        for j in i..k {
            let val = gram_matrix[(i, j)];
            let expected = if i == j { T::one() } else { T::zero() };
            let err = Value::abs(val - expected);
            assert!(
                err <= tol,
                "gram[{i},{j}] : {val:?} != {expected:?} ; {err:?} > {tol:?}\n{gram_matrix}"
            );
        }
    }
}
