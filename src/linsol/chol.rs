use tracing::debug;

use crate::dense::DenseMatrix;
use crate::linalg::cholesky::{back_substitute_lt, forward_substitute};
use crate::linalg::{CholeskyDecomposition, CholeskyInner, Decomposition, LinalgError};
use crate::traits::LinalgScalar;

use super::{check_solve_shapes, ratio_quality, LinearSolver};

/// Linear solver for Hermitian positive-definite systems over
/// [`CholeskyInner`], in either orientation.
///
/// `invert` forms the inverse of the triangular factor and multiplies it by
/// its conjugate transpose.
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linsol::{LinearSolver, LinearSolverChol};
///
/// let a = DenseMatrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let mut solver = LinearSolverChol::new(true);
/// assert!(solver.set_a(&a));
/// let b = DenseMatrix::column(&[8.0, 7.0]);
/// let mut x = DenseMatrix::zeros(2, 1);
/// solver.solve(&b, &mut x).unwrap();
/// assert!((x[(0, 0)] - 1.25).abs() < 1e-12);
/// assert!((x[(1, 0)] - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearSolverChol<T: LinalgScalar> {
    chol: CholeskyInner<T>,
    scratch: DenseMatrix<T>,
    /// Lower factor `L` with `A = L * L^H`, whatever the orientation.
    l: DenseMatrix<T>,
    ready: bool,
}

impl<T: LinalgScalar> LinearSolverChol<T> {
    pub fn new(lower: bool) -> Self {
        Self::from_decomposition(CholeskyInner::new(lower))
    }

    pub fn from_decomposition(chol: CholeskyInner<T>) -> Self {
        Self {
            chol,
            scratch: DenseMatrix::zeros(0, 0),
            l: DenseMatrix::zeros(0, 0),
            ready: false,
        }
    }

    pub fn decomposition(&self) -> &CholeskyInner<T> {
        &self.chol
    }

    fn factor(&self) -> Result<&DenseMatrix<T>, LinalgError> {
        if self.ready {
            Ok(&self.l)
        } else {
            Err(LinalgError::NotDecomposed)
        }
    }
}

impl<T: LinalgScalar> LinearSolver<T> for LinearSolverChol<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> bool {
        self.ready = false;
        if !a.is_square() {
            debug!(rows = a.nrows(), cols = a.ncols(), "solver input is not square");
            return false;
        }
        self.scratch.set_from(a);
        if !self.chol.decompose(&mut self.scratch) {
            return false;
        }
        let Ok(t) = self.chol.factor() else {
            return false;
        };
        if self.chol.is_lower() {
            self.l.set_from(t);
        } else {
            let lt = t.conj_transpose();
            self.l.set_from(&lt);
        }
        self.ready = true;
        true
    }

    fn solve(&self, b: &DenseMatrix<T>, x: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let l = self.factor()?;
        let n = l.nrows();
        check_solve_shapes(n, b, x)?;

        let mut col = vec![T::zero(); n];
        let mut y = vec![T::zero(); n];
        let mut out = vec![T::zero(); n];
        for c in 0..b.ncols() {
            for i in 0..n {
                col[i] = b[(i, c)];
            }
            forward_substitute(l, &col, &mut y);
            back_substitute_lt(l, &y, &mut out);
            for i in 0..n {
                x[(i, c)] = out[i];
            }
        }
        Ok(())
    }

    fn invert(&self, a_inv: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let l = self.factor()?;
        let n = l.nrows();
        a_inv.ensure_shape(n, n)?;

        // L^-1 column by column; it stays lower triangular
        let mut linv = DenseMatrix::zeros(n, n);
        for j in 0..n {
            linv[(j, j)] = T::one() / l[(j, j)];
            for i in (j + 1)..n {
                let mut sum = T::zero();
                for k in j..i {
                    sum = sum + l[(i, k)] * linv[(k, j)];
                }
                linv[(i, j)] = (T::zero() - sum) / l[(i, i)];
            }
        }

        // A^-1 = L^-H * L^-1
        for i in 0..n {
            for j in 0..n {
                let mut sum = T::zero();
                for k in i.max(j)..n {
                    sum = sum + linv[(k, i)].conj() * linv[(k, j)];
                }
                a_inv[(i, j)] = sum;
            }
        }
        Ok(())
    }

    /// Ratio of the smallest to the largest diagonal entry of the factor.
    fn quality(&self) -> T::Real {
        match self.factor() {
            Ok(l) => ratio_quality((0..l.nrows()).map(|i| l[(i, i)].modulus())),
            Err(_) => <T::Real as num_traits::Zero>::zero(),
        }
    }

    fn modifies_a(&self) -> bool {
        false
    }

    fn modifies_b(&self) -> bool {
        false
    }
}
