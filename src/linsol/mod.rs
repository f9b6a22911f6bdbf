//! Linear solvers built on the Cholesky-type decompositions.
//!
//! A solver is configured once with [`LinearSolver::set_a`] and then used for
//! any number of [`solve`](LinearSolver::solve) and
//! [`invert`](LinearSolver::invert) calls. Solvers keep their own copy of the
//! factor: `set_a` never writes to `A` and `solve` never writes to `B`, so the
//! matrix passed to `set_a` may itself be reused as the output of `invert`.

mod chol;
mod ldl;

pub use chol::LinearSolverChol;
pub use ldl::LinearSolverLdl;

use crate::dense::DenseMatrix;
use crate::linalg::LinalgError;
use crate::traits::LinalgScalar;

/// Solver for `A * X = B` with a fixed square `A`.
pub trait LinearSolver<T: LinalgScalar> {
    /// Factor `A`. Returns `false` if the factorization fails.
    fn set_a(&mut self, a: &DenseMatrix<T>) -> bool;

    /// Solve `A * X = B`, writing `X` into `x` (same shape as `b`).
    fn solve(&self, b: &DenseMatrix<T>, x: &mut DenseMatrix<T>) -> Result<(), LinalgError>;

    /// Write `A^-1` into `a_inv` (`n x n`).
    fn invert(&self, a_inv: &mut DenseMatrix<T>) -> Result<(), LinalgError>;

    /// Conditioning estimate in `[0, 1]`; small values mean nearly singular.
    fn quality(&self) -> T::Real;

    /// Whether `set_a` writes to its argument.
    fn modifies_a(&self) -> bool;

    /// Whether `solve` writes to `b`.
    fn modifies_b(&self) -> bool;
}

/// Check `b` and `x` against an `n x n` system.
pub(crate) fn check_solve_shapes<T>(
    n: usize,
    b: &DenseMatrix<T>,
    x: &DenseMatrix<T>,
) -> Result<(), LinalgError> {
    if b.nrows() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: (n, b.ncols()),
            got: b.shape(),
        });
    }
    x.ensure_shape(n, b.ncols())
}

/// `min / max` over a set of non-negative magnitudes; zero when empty.
pub(crate) fn ratio_quality<R: num_traits::Float>(values: impl Iterator<Item = R>) -> R {
    let mut min = R::infinity();
    let mut max = R::zero();
    let mut any = false;
    for v in values {
        any = true;
        min = min.min(v);
        max = max.max(v);
    }
    if !any || max == R::zero() {
        R::zero()
    } else {
        min / max
    }
}
