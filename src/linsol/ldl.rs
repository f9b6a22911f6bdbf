use num_traits::Zero;
use tracing::debug;

use crate::dense::DenseMatrix;
use crate::linalg::{CholeskyLdl, Decomposition, LinalgError};
use crate::traits::LinalgScalar;

use super::{check_solve_shapes, ratio_quality, LinearSolver};

/// Linear solver over the [`CholeskyLdl`] decomposition.
///
/// `invert` substitutes against the columns of the identity.
#[derive(Debug, Clone)]
pub struct LinearSolverLdl<T: LinalgScalar> {
    ldl: CholeskyLdl<T>,
    scratch: DenseMatrix<T>,
    ready: bool,
}

impl<T: LinalgScalar> Default for LinearSolverLdl<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LinalgScalar> LinearSolverLdl<T> {
    pub fn new() -> Self {
        Self {
            ldl: CholeskyLdl::new(),
            scratch: DenseMatrix::zeros(0, 0),
            ready: false,
        }
    }

    pub fn decomposition(&self) -> &CholeskyLdl<T> {
        &self.ldl
    }

    /// `L * D * L^H * x = b` for one column, `b` in `x` on entry.
    fn substitute(l: &DenseMatrix<T>, d: &[T::Real], x: &mut [T]) {
        let n = l.nrows();
        for i in 0..n {
            let mut sum = x[i];
            for k in 0..i {
                sum = sum - l[(i, k)] * x[k];
            }
            x[i] = sum;
        }
        for i in 0..n {
            x[i] = x[i] / T::from_real(d[i]);
        }
        for i in (0..n).rev() {
            let mut sum = x[i];
            for k in (i + 1)..n {
                sum = sum - l[(k, i)].conj() * x[k];
            }
            x[i] = sum;
        }
    }

    fn parts(&self) -> Result<(&DenseMatrix<T>, &[T::Real]), LinalgError> {
        if !self.ready {
            return Err(LinalgError::NotDecomposed);
        }
        Ok((self.ldl.factor()?, self.ldl.diagonal()))
    }
}

impl<T: LinalgScalar> LinearSolver<T> for LinearSolverLdl<T> {
    fn set_a(&mut self, a: &DenseMatrix<T>) -> bool {
        self.ready = false;
        if !a.is_square() {
            debug!(rows = a.nrows(), cols = a.ncols(), "solver input is not square");
            return false;
        }
        self.scratch.set_from(a);
        self.ready = self.ldl.decompose(&mut self.scratch);
        self.ready
    }

    fn solve(&self, b: &DenseMatrix<T>, x: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let (l, d) = self.parts()?;
        let n = l.nrows();
        check_solve_shapes(n, b, x)?;

        let mut col = vec![T::zero(); n];
        for c in 0..b.ncols() {
            for i in 0..n {
                col[i] = b[(i, c)];
            }
            Self::substitute(l, d, &mut col);
            for i in 0..n {
                x[(i, c)] = col[i];
            }
        }
        Ok(())
    }

    fn invert(&self, a_inv: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let (l, d) = self.parts()?;
        let n = l.nrows();
        a_inv.ensure_shape(n, n)?;

        let mut col = vec![T::zero(); n];
        for c in 0..n {
            for (i, x) in col.iter_mut().enumerate() {
                *x = if i == c { T::one() } else { T::zero() };
            }
            Self::substitute(l, d, &mut col);
            for i in 0..n {
                a_inv[(i, c)] = col[i];
            }
        }
        Ok(())
    }

    /// Ratio of the smallest to the largest pivot of D.
    fn quality(&self) -> T::Real {
        match self.parts() {
            Ok((_, d)) => ratio_quality(d.iter().map(|&v| v.modulus())),
            Err(_) => <T::Real as Zero>::zero(),
        }
    }

    fn modifies_a(&self) -> bool {
        false
    }

    fn modifies_b(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::features::is_identical;

    #[test]
    fn solves_multiple_columns() {
        let a = DenseMatrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
        let b = DenseMatrix::from_rows(2, 2, &[8.0, 4.0, 7.0, 2.0]);
        let mut solver = LinearSolverLdl::new();
        assert!(solver.set_a(&a));
        let mut x = DenseMatrix::zeros(2, 2);
        solver.solve(&b, &mut x).unwrap();
        assert!(is_identical(&(&a * &x), &b, 1e-12));
    }

    #[test]
    fn rejects_indefinite() {
        let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, -1.0, -1.0, -2.0]);
        let mut solver = LinearSolverLdl::new();
        assert!(!solver.set_a(&a));
        assert!(solver.invert(&mut DenseMatrix::zeros(2, 2)).is_err());
        assert_eq!(solver.quality(), 0.0);
    }

    #[test]
    fn quality_is_pivot_ratio() {
        let a = DenseMatrix::from_rows(2, 2, &[4.0_f64, 0.0, 0.0, 1.0]);
        let mut solver = LinearSolverLdl::new();
        assert!(solver.set_a(&a));
        assert!((solver.quality() - 0.25).abs() < 1e-15);
    }
}
