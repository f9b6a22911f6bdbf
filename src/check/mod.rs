//! Algorithm-agnostic correctness checks for the decomposition traits.
//!
//! Each check builds its own random inputs from the supplied generator,
//! drives a decomposition through the public trait surface only, and returns
//! `Ok(())` or a [`CheckError`] describing the first violated property. Any
//! implementation of [`QrDecomposition`](crate::linalg::QrDecomposition),
//! [`CholeskyDecomposition`](crate::linalg::CholeskyDecomposition) or
//! [`TridiagonalDecomposition`](crate::linalg::TridiagonalDecomposition) can
//! be run through them for any scalar type:
//!
//! ```
//! use densela::check;
//! use densela::config::Tolerance;
//! use densela::linalg::QrHouseholder;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(0xff);
//! check::check_qr_shapes(QrHouseholder::<f64>::new, &mut rng, Tolerance::F64).unwrap();
//! ```

mod cholesky;
mod qr;
mod tridiagonal;

pub use cholesky::{
    check_cholesky_definition, check_cholesky_determinant, check_cholesky_not_positive_definite,
    check_cholesky_null_versus_not, check_cholesky_zeros,
};
pub use qr::{
    check_qr_compact_format, check_qr_null_versus_not, check_qr_r_input_size, check_qr_shapes,
    check_qr_transpose,
};
pub use tridiagonal::{
    check_tridiagonal_diagonal, check_tridiagonal_full, check_tridiagonal_householder_vectors,
    check_tridiagonal_null_versus_not, check_tridiagonal_transpose_q,
};

use thiserror::Error;
use tracing::debug;

use crate::dense::features::max_difference;
use crate::dense::DenseMatrix;
use crate::linalg::{Decomposition, LinalgError};
use crate::traits::LinalgScalar;

/// A violated property.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// `decompose` returned `false` on an input it should accept.
    #[error("{check}: decomposition of a {}x{} matrix failed", .shape.0, .shape.1)]
    DecompositionFailed {
        check: &'static str,
        shape: (usize, usize),
    },
    /// `decompose` returned `true` on an input it should reject.
    #[error("{check}: decomposition of a {}x{} matrix should have failed", .shape.0, .shape.1)]
    UnexpectedSuccess {
        check: &'static str,
        shape: (usize, usize),
    },
    /// Two quantities differ by more than the tolerance.
    #[error("{check}: {what} differs by {error:e} (tolerance {tol:e})")]
    Tolerance {
        check: &'static str,
        what: String,
        error: f64,
        tol: f64,
    },
    #[error("{check}: {detail}")]
    Property { check: &'static str, detail: String },
    /// An extractor or solver returned an error the check did not expect.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Compare two matrices element-wise.
pub(crate) fn ensure_close<T: LinalgScalar>(
    check: &'static str,
    what: &str,
    expected: &DenseMatrix<T>,
    found: &DenseMatrix<T>,
    tol: f64,
) -> Result<(), CheckError> {
    match max_difference(expected, found) {
        None => Err(CheckError::Property {
            check,
            detail: format!(
                "{}: shape {:?} does not match {:?}",
                what,
                found.shape(),
                expected.shape()
            ),
        }),
        Some(error) if error <= tol => Ok(()),
        Some(error) => Err(CheckError::Tolerance {
            check,
            what: what.to_string(),
            error,
            tol,
        }),
    }
}

pub(crate) fn ensure(
    check: &'static str,
    cond: bool,
    detail: impl FnOnce() -> String,
) -> Result<(), CheckError> {
    if cond {
        Ok(())
    } else {
        Err(CheckError::Property {
            check,
            detail: detail(),
        })
    }
}

/// Decompose a copy of `a`, failing the check if the decomposition fails.
pub(crate) fn decompose_copy<T: LinalgScalar, D: Decomposition<T>>(
    check: &'static str,
    decomp: &mut D,
    a: &DenseMatrix<T>,
) -> Result<(), CheckError> {
    if decomp.decompose(&mut a.clone()) {
        Ok(())
    } else {
        debug!(check, rows = a.nrows(), cols = a.ncols(), "decomposition failed");
        Err(CheckError::DecompositionFailed {
            check,
            shape: a.shape(),
        })
    }
}

/// Matrix with every entry set to a recognizable non-zero value, for
/// verifying that extractors overwrite caller buffers completely.
pub(crate) fn garbage<T: LinalgScalar>(nrows: usize, ncols: usize) -> DenseMatrix<T> {
    DenseMatrix::fill(nrows, ncols, T::from_f64_parts(7.5, -2.25))
}

/// `decompose` leaves `a` untouched exactly when
/// [`input_modified`](Decomposition::input_modified) is `false`.
///
/// `a` must be a matrix the decomposition accepts and whose factorization
/// differs from `a` itself.
pub fn check_modified_input<T, D>(decomp: &mut D, a: &DenseMatrix<T>) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: Decomposition<T>,
{
    const CHECK: &str = "modified_input";
    let mut work = a.clone();
    if !decomp.decompose(&mut work) {
        return Err(CheckError::DecompositionFailed {
            check: CHECK,
            shape: a.shape(),
        });
    }
    let changed = work != *a;
    ensure(CHECK, changed == decomp.input_modified(), || {
        format!(
            "input_modified() is {} but the input was {}",
            decomp.input_modified(),
            if changed { "modified" } else { "left untouched" }
        )
    })
}
