//! Structural predicates on dense matrices.
//!
//! All tolerances are absolute and compared against element moduli converted
//! to `f64`, so the same [`Tolerance`](crate::config::Tolerance) value works
//! for every scalar type. A NaN element never satisfies a tolerance.

use crate::traits::LinalgScalar;

use super::DenseMatrix;

#[inline]
fn diff<T: LinalgScalar>(a: T, b: T) -> f64 {
    T::real_to_f64((a - b).modulus())
}

#[inline]
fn size<T: LinalgScalar>(a: T) -> f64 {
    T::real_to_f64(a.modulus())
}

/// `x <= tol`, false for NaN.
#[inline]
fn within(x: f64, tol: f64) -> bool {
    x <= tol
}

/// Same shape and every element within `tol`.
pub fn is_identical<T: LinalgScalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>, tol: f64) -> bool {
    if a.shape() != b.shape() {
        return false;
    }
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .all(|(&x, &y)| within(diff(x, y), tol))
}

/// Columns are orthonormal: `Q^H Q = I` within `tol`.
///
/// Requires `nrows >= ncols`; a wide matrix cannot have orthonormal columns.
pub fn is_orthogonal<T: LinalgScalar>(q: &DenseMatrix<T>, tol: f64) -> bool {
    let (m, n) = q.shape();
    if m < n {
        return false;
    }
    for i in 0..n {
        for j in i..n {
            let mut dot = T::zero();
            for k in 0..m {
                dot = dot + q[(k, i)].conj() * q[(k, j)];
            }
            let expected = if i == j { T::one() } else { T::zero() };
            if !within(diff(dot, expected), tol) {
                return false;
            }
        }
    }
    true
}

/// Square and `A[i,j] == conj(A[j,i])` within `tol`.
pub fn is_hermitian<T: LinalgScalar>(a: &DenseMatrix<T>, tol: f64) -> bool {
    if !a.is_square() {
        return false;
    }
    let n = a.nrows();
    for i in 0..n {
        for j in i..n {
            if !within(diff(a[(i, j)], a[(j, i)].conj()), tol) {
                return false;
            }
        }
    }
    true
}

/// Every element below the main diagonal is within `tol` of zero.
pub fn is_upper_triangle<T: LinalgScalar>(a: &DenseMatrix<T>, tol: f64) -> bool {
    for i in 0..a.nrows() {
        for j in 0..i.min(a.ncols()) {
            if !within(size(a[(i, j)]), tol) {
                return false;
            }
        }
    }
    true
}

/// Every element above the main diagonal is within `tol` of zero.
pub fn is_lower_triangle<T: LinalgScalar>(a: &DenseMatrix<T>, tol: f64) -> bool {
    for i in 0..a.nrows() {
        for j in (i + 1)..a.ncols() {
            if !within(size(a[(i, j)]), tol) {
                return false;
            }
        }
    }
    true
}

/// Square and zero outside the main diagonal and the two adjacent ones.
pub fn is_tridiagonal<T: LinalgScalar>(a: &DenseMatrix<T>, tol: f64) -> bool {
    if !a.is_square() {
        return false;
    }
    let n = a.nrows();
    for i in 0..n {
        for j in 0..n {
            if i.abs_diff(j) > 1 && !within(size(a[(i, j)]), tol) {
                return false;
            }
        }
    }
    true
}

/// Identity within `tol` (rectangular allowed: ones on the main diagonal).
pub fn is_identity<T: LinalgScalar>(a: &DenseMatrix<T>, tol: f64) -> bool {
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            let expected = if i == j { T::one() } else { T::zero() };
            if !within(diff(a[(i, j)], expected), tol) {
                return false;
            }
        }
    }
    true
}

/// Largest element-wise difference, or `None` when the shapes differ.
///
/// Any NaN difference makes the result NaN.
pub fn max_difference<T: LinalgScalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> Option<f64> {
    if a.shape() != b.shape() {
        return None;
    }
    Some(
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(&x, &y)| diff(x, y))
            .fold(0.0, |acc: f64, d| {
                if acc.is_nan() || d.is_nan() {
                    f64::NAN
                } else {
                    acc.max(d)
                }
            }),
    )
}
