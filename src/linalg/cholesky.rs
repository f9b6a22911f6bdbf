use num_complex::Complex;
use num_traits::{One, Zero};
use tracing::debug;

use crate::dense::DenseMatrix;
use crate::linalg::{CholeskyDecomposition, Decomposition, LinalgError};
use crate::traits::{LinalgScalar, MatrixMut, MatrixRef};

// ---------------------------------------------------------------------------
// In-place kernels
// ---------------------------------------------------------------------------

/// Validate a pivot sum and return its real square root.
#[inline]
fn pivot_root<T: LinalgScalar>(sum: T) -> Result<T::Real, LinalgError> {
    let d = sum.re();
    if !sum.lis_finite() || !(d > <T::Real as Zero>::zero()) {
        return Err(LinalgError::NotPositiveDefinite);
    }
    Ok(d.lsqrt())
}

/// Inner-product Cholesky in place: `A = L * L^H`.
///
/// Reads only the lower triangle of `a`. On return the lower triangle
/// (including diagonal) holds L and the strict upper triangle is zero.
///
/// Returns an error if the matrix is not (Hermitian) positive definite.
pub fn cholesky_lower_in_place<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
) -> Result<(), LinalgError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::NotSquare);
    }

    for i in 0..n {
        for j in 0..=i {
            // Row i and row j of L are both contiguous in row-major storage
            let mut sum = *a.get(i, j);
            for k in 0..j {
                sum = sum - *a.get(i, k) * (*a.get(j, k)).conj();
            }
            if i == j {
                *a.get_mut(i, i) = T::from_real(pivot_root(sum)?);
            } else {
                let ljj = *a.get(j, j);
                *a.get_mut(i, j) = sum / ljj;
            }
        }
        for x in a.row_as_mut_slice(i, i + 1) {
            *x = T::zero();
        }
    }

    Ok(())
}

/// Inner-product Cholesky in place: `A = U^H * U`.
///
/// Reads only the upper triangle of `a`. On return the upper triangle
/// (including diagonal) holds U and the strict lower triangle is zero.
pub fn cholesky_upper_in_place<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
) -> Result<(), LinalgError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::NotSquare);
    }

    for i in 0..n {
        for j in i..n {
            let mut sum = *a.get(i, j);
            for k in 0..i {
                sum = sum - (*a.get(k, i)).conj() * *a.get(k, j);
            }
            if i == j {
                *a.get_mut(i, i) = T::from_real(pivot_root(sum)?);
            } else {
                let uii = *a.get(i, i);
                *a.get_mut(i, j) = sum / uii;
            }
        }
        for j in 0..i {
            *a.get_mut(i, j) = T::zero();
        }
    }

    Ok(())
}

/// Solve `L * x = b` by forward substitution, where L is lower triangular.
#[inline]
pub(crate) fn forward_substitute<T: LinalgScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - *l.get(i, j) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Solve `L^H * x = b` by back substitution, where L is lower triangular.
#[inline]
pub(crate) fn back_substitute_lt<T: LinalgScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum = sum - (*l.get(j, i)).conj() * x[j];
        }
        x[i] = sum / (*l.get(i, i)).conj();
    }
}

// ---------------------------------------------------------------------------
// CholeskyInner
// ---------------------------------------------------------------------------

/// Inner-product Cholesky decomposition, lower or upper orientation.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::{CholeskyDecomposition, CholeskyInner, Decomposition};
///
/// let mut a = DenseMatrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let mut chol = CholeskyInner::new(true);
/// assert!(chol.decompose(&mut a));
///
/// let l = chol.get_t().unwrap();
/// assert_eq!(l[(0, 0)], 2.0);
/// assert_eq!(l[(0, 1)], 0.0);
/// let det = chol.compute_determinant().unwrap();
/// assert!((det.re - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyInner<T> {
    t: DenseMatrix<T>,
    lower: bool,
    in_place: bool,
    decomposed: bool,
}

impl<T: LinalgScalar> CholeskyInner<T> {
    /// `lower = true` computes `A = L * L^H`, otherwise `A = U^H * U`.
    pub fn new(lower: bool) -> Self {
        Self {
            t: DenseMatrix::zeros(0, 0),
            lower,
            in_place: false,
            decomposed: false,
        }
    }

    /// Overwrite the caller's matrix with the triangular factor.
    pub fn in_place(mut self) -> Self {
        self.in_place = true;
        self
    }

    /// Borrow the triangular factor of the last successful decomposition.
    pub fn factor(&self) -> Result<&DenseMatrix<T>, LinalgError> {
        if self.decomposed {
            Ok(&self.t)
        } else {
            Err(LinalgError::NotDecomposed)
        }
    }

    fn kernel(lower: bool, a: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        if lower {
            cholesky_lower_in_place(a)
        } else {
            cholesky_upper_in_place(a)
        }
    }
}

impl<T: LinalgScalar> Decomposition<T> for CholeskyInner<T> {
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> bool {
        self.decomposed = false;
        let result = if self.in_place {
            let r = Self::kernel(self.lower, a);
            self.t.set_from(a);
            r
        } else {
            self.t.set_from(a);
            Self::kernel(self.lower, &mut self.t)
        };

        match result {
            Ok(()) => {
                self.decomposed = true;
                true
            }
            Err(e) => {
                debug!(n = a.nrows(), lower = self.lower, error = %e, "Cholesky decomposition failed");
                false
            }
        }
    }

    fn input_modified(&self) -> bool {
        self.in_place
    }

    fn dims(&self) -> Option<(usize, usize)> {
        self.decomposed.then(|| self.t.shape())
    }
}

impl<T: LinalgScalar> CholeskyDecomposition<T> for CholeskyInner<T> {
    const SUPPORTS_LOWER: bool = true;
    const SUPPORTS_UPPER: bool = true;

    fn is_lower(&self) -> bool {
        self.lower
    }

    fn get_t_into(&self, out: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let t = self.factor()?;
        out.ensure_shape(t.nrows(), t.ncols())?;
        out.as_mut_slice().copy_from_slice(t.as_slice());
        Ok(())
    }

    /// `det(A) = (prod T[i,i])^2`.
    fn compute_determinant(&self) -> Result<Complex<T::Real>, LinalgError> {
        let t = self.factor()?;
        let mut prod = <T::Real as One>::one();
        for i in 0..t.nrows() {
            prod = prod * t[(i, i)].re();
        }
        Ok(Complex::new(prod * prod, <T::Real as Zero>::zero()))
    }
}
