pub(crate) mod cholesky;
pub(crate) mod evd;
pub(crate) mod householder;
pub(crate) mod ldl;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod symmetric_qr;
pub(crate) mod tridiagonal;

pub use cholesky::{cholesky_lower_in_place, cholesky_upper_in_place, CholeskyInner};
pub use evd::{EvdOptions, SymmetricEvd};
pub use householder::{apply_left, apply_right, make_reflector, reflector_matrix, Reflector};
pub use ldl::{ldl_in_place, CholeskyLdl};
pub use lu::{lu_in_place, lu_solve, LuDecomposition};
pub use qr::{qr_in_place, QrHouseholder};
pub use symmetric_qr::{symmetric_qr, DEFAULT_MAX_ITERATIONS};
pub use tridiagonal::{tridiagonalize_in_place, TridiagonalHouseholder};

use num_complex::Complex;
use thiserror::Error;

use crate::dense::DenseMatrix;
use crate::traits::LinalgScalar;

/// Errors from linear algebra operations.
///
/// Decompositions report numerical failure through the `bool` returned by
/// [`Decomposition::decompose`]; everything else (extractors, solvers, the
/// function registry) returns one of these.
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::{LinalgError, LuDecomposition};
///
/// let singular = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// assert_eq!(LuDecomposition::new(&singular).unwrap_err(), LinalgError::Singular);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// Matrix is singular or nearly singular.
    #[error("matrix is singular")]
    Singular,
    /// Matrix is not positive definite (required for Cholesky).
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
    /// Iterative algorithm did not converge within the iteration budget.
    #[error("iterative algorithm did not converge")]
    ConvergenceFailure,
    /// A matrix argument or caller buffer has the wrong shape.
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .got.0, .got.1)]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// A flat buffer has the wrong number of elements.
    #[error("invalid length: expected {expected} elements, got {got}")]
    InvalidLength { expected: usize, got: usize },
    /// An extractor or solver was used before a successful decomposition.
    #[error("no successful decomposition available")]
    NotDecomposed,
    /// The operation requires a square matrix.
    #[error("matrix is not square")]
    NotSquare,
    /// The function registry has no entry with this name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ── Decomposition contracts ─────────────────────────────────────────

/// Common contract for every matrix decomposition.
///
/// A decomposition object owns its working storage and can be reused across
/// inputs. `decompose` returns `false` on numerical failure (rank deficiency,
/// a non-positive pivot, non-finite input); extractors then report
/// [`LinalgError::NotDecomposed`] until the next successful call.
pub trait Decomposition<T: LinalgScalar> {
    /// Factor `a`. The buffer is only written when
    /// [`input_modified`](Self::input_modified) is `true`.
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> bool;

    /// Whether `decompose` overwrites the caller's matrix.
    fn input_modified(&self) -> bool;

    /// Shape of the last successfully decomposed matrix.
    fn dims(&self) -> Option<(usize, usize)>;
}

/// Householder QR, `A = Q·R`.
///
/// With `compact`, Q is `m x min(m,n)` and R is `min(m,n) x n`; otherwise Q is
/// `m x m` and R is `m x n`.
pub trait QrDecomposition<T: LinalgScalar>: Decomposition<T> {
    fn get_q_into(&self, out: &mut DenseMatrix<T>, compact: bool) -> Result<(), LinalgError>;

    /// Conjugate transpose of Q.
    fn get_qt_into(&self, out: &mut DenseMatrix<T>, compact: bool) -> Result<(), LinalgError>;

    fn get_r_into(&self, out: &mut DenseMatrix<T>, compact: bool) -> Result<(), LinalgError>;

    fn get_q(&self, compact: bool) -> Result<DenseMatrix<T>, LinalgError> {
        let (m, n) = self.dims().ok_or(LinalgError::NotDecomposed)?;
        let mut out = DenseMatrix::zeros(m, if compact { m.min(n) } else { m });
        self.get_q_into(&mut out, compact)?;
        Ok(out)
    }

    fn get_qt(&self, compact: bool) -> Result<DenseMatrix<T>, LinalgError> {
        let (m, n) = self.dims().ok_or(LinalgError::NotDecomposed)?;
        let mut out = DenseMatrix::zeros(if compact { m.min(n) } else { m }, m);
        self.get_qt_into(&mut out, compact)?;
        Ok(out)
    }

    fn get_r(&self, compact: bool) -> Result<DenseMatrix<T>, LinalgError> {
        let (m, n) = self.dims().ok_or(LinalgError::NotDecomposed)?;
        let mut out = DenseMatrix::zeros(if compact { m.min(n) } else { m }, n);
        self.get_r_into(&mut out, compact)?;
        Ok(out)
    }
}

/// Cholesky-type factorization of a Hermitian positive-definite matrix.
///
/// Lower orientation: `T·T^H = A`. Upper orientation: `T^H·T = A`.
pub trait CholeskyDecomposition<T: LinalgScalar>: Decomposition<T> {
    /// Whether this implementation can produce a lower factor.
    const SUPPORTS_LOWER: bool;
    /// Whether this implementation can produce an upper factor.
    const SUPPORTS_UPPER: bool;

    fn is_lower(&self) -> bool;

    /// Write the triangular factor into `out` (`n x n`).
    fn get_t_into(&self, out: &mut DenseMatrix<T>) -> Result<(), LinalgError>;

    fn get_t(&self) -> Result<DenseMatrix<T>, LinalgError> {
        let (n, _) = self.dims().ok_or(LinalgError::NotDecomposed)?;
        let mut out = DenseMatrix::zeros(n, n);
        self.get_t_into(&mut out)?;
        Ok(out)
    }

    /// Determinant of the decomposed matrix.
    fn compute_determinant(&self) -> Result<Complex<T::Real>, LinalgError>;
}

/// Similarity reduction of a Hermitian matrix to tridiagonal form,
/// `A = Q·T·Q^H`.
pub trait TridiagonalDecomposition<T: LinalgScalar>: Decomposition<T> {
    /// Write Q (or `Q^H` when `transpose`) into `out` (`n x n`).
    fn get_q_into(&self, out: &mut DenseMatrix<T>, transpose: bool) -> Result<(), LinalgError>;

    fn get_t_into(&self, out: &mut DenseMatrix<T>) -> Result<(), LinalgError>;

    /// `diag[i] = T[i,i]` and `off[i] = T[i,i+1]`.
    fn get_diagonal(&self, diag: &mut [T], off: &mut [T]) -> Result<(), LinalgError>;

    /// Scale factor of each stored reflector.
    fn gammas(&self) -> &[T::Real];

    /// Full-length vector `u` of reflector `k` (1 at `k+1`, zeros above).
    fn householder_vector(&self, k: usize) -> Result<Vec<T>, LinalgError>;

    fn get_q(&self, transpose: bool) -> Result<DenseMatrix<T>, LinalgError> {
        let (n, _) = self.dims().ok_or(LinalgError::NotDecomposed)?;
        let mut out = DenseMatrix::zeros(n, n);
        self.get_q_into(&mut out, transpose)?;
        Ok(out)
    }

    fn get_t(&self) -> Result<DenseMatrix<T>, LinalgError> {
        let (n, _) = self.dims().ok_or(LinalgError::NotDecomposed)?;
        let mut out = DenseMatrix::zeros(n, n);
        self.get_t_into(&mut out)?;
        Ok(out)
    }
}
