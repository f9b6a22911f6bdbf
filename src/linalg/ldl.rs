use num_complex::Complex;
use num_traits::{One, Zero};
use tracing::debug;

use crate::dense::DenseMatrix;
use crate::linalg::{CholeskyDecomposition, Decomposition, LinalgError};
use crate::traits::{LinalgScalar, MatrixMut};

/// LDL^H decomposition in place: `A = L * D * L^H`.
///
/// Reads the lower triangle of `a`. On return `a` holds the unit lower
/// triangular L (explicit ones on the diagonal, zeros above) and `d` the real
/// diagonal of D.
///
/// Fails with `NotPositiveDefinite` when a pivot is non-positive or
/// non-finite.
pub fn ldl_in_place<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    d: &mut [T::Real],
) -> Result<(), LinalgError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::NotSquare);
    }
    if d.len() != n {
        return Err(LinalgError::InvalidLength {
            expected: n,
            got: d.len(),
        });
    }

    for i in 0..n {
        for j in 0..=i {
            let mut sum = *a.get(i, j);
            for k in 0..j {
                sum = sum - *a.get(i, k) * T::from_real(d[k]) * (*a.get(j, k)).conj();
            }
            if i == j {
                let di = sum.re();
                if !sum.lis_finite() || !(di > <T::Real as Zero>::zero()) {
                    return Err(LinalgError::NotPositiveDefinite);
                }
                d[i] = di;
                *a.get_mut(i, i) = T::one();
            } else {
                *a.get_mut(i, j) = sum / T::from_real(d[j]);
            }
        }
        for x in a.row_as_mut_slice(i, i + 1) {
            *x = T::zero();
        }
    }

    Ok(())
}

/// LDL^H Cholesky variant. Only the lower orientation exists.
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::{CholeskyDecomposition, CholeskyLdl, Decomposition};
///
/// let mut a = DenseMatrix::from_rows(3, 3, &[
///     1.0_f64, 2.0, 4.0,
///     2.0, 13.0, 23.0,
///     4.0, 23.0, 90.0,
/// ]);
/// let mut ldl = CholeskyLdl::new();
/// assert!(ldl.decompose(&mut a));
/// let d = ldl.diagonal();
/// assert!((d[0] - 1.0).abs() < 1e-12 && (d[1] - 9.0).abs() < 1e-12);
/// assert!((d[2] - 49.0).abs() < 1e-9);
/// assert!((ldl.compute_determinant().unwrap().re - 441.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyLdl<T: LinalgScalar> {
    l: DenseMatrix<T>,
    d: Vec<T::Real>,
    decomposed: bool,
}

impl<T: LinalgScalar> Default for CholeskyLdl<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LinalgScalar> CholeskyLdl<T> {
    pub fn new() -> Self {
        Self {
            l: DenseMatrix::zeros(0, 0),
            d: Vec::new(),
            decomposed: false,
        }
    }

    /// Diagonal of D (empty before a successful decomposition).
    pub fn diagonal(&self) -> &[T::Real] {
        if self.decomposed {
            &self.d
        } else {
            &[]
        }
    }

    /// Borrow the unit lower triangular factor.
    pub fn factor(&self) -> Result<&DenseMatrix<T>, LinalgError> {
        if self.decomposed {
            Ok(&self.l)
        } else {
            Err(LinalgError::NotDecomposed)
        }
    }

    pub fn get_l_into(&self, out: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let l = self.factor()?;
        out.ensure_shape(l.nrows(), l.ncols())?;
        out.as_mut_slice().copy_from_slice(l.as_slice());
        Ok(())
    }

    pub fn get_l(&self) -> Result<DenseMatrix<T>, LinalgError> {
        Ok(self.factor()?.clone())
    }
}

impl<T: LinalgScalar> Decomposition<T> for CholeskyLdl<T> {
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> bool {
        self.decomposed = false;
        self.l.set_from(a);
        self.d.clear();
        self.d.resize(a.nrows(), <T::Real as Zero>::zero());
        match ldl_in_place(&mut self.l, &mut self.d) {
            Ok(()) => {
                self.decomposed = true;
                true
            }
            Err(e) => {
                debug!(n = a.nrows(), error = %e, "LDL decomposition failed");
                false
            }
        }
    }

    fn input_modified(&self) -> bool {
        false
    }

    fn dims(&self) -> Option<(usize, usize)> {
        self.decomposed.then(|| self.l.shape())
    }
}

impl<T: LinalgScalar> CholeskyDecomposition<T> for CholeskyLdl<T> {
    const SUPPORTS_LOWER: bool = true;
    const SUPPORTS_UPPER: bool = false;

    fn is_lower(&self) -> bool {
        true
    }

    /// `L * sqrt(D)`, so that `T * T^H = A` like the inner-product factor.
    fn get_t_into(&self, out: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let l = self.factor()?;
        let n = l.nrows();
        out.ensure_shape(n, n)?;
        let roots: Vec<T> = self.d.iter().map(|&d| T::from_real(d.lsqrt())).collect();
        for i in 0..n {
            for j in 0..n {
                out[(i, j)] = l[(i, j)] * roots[j];
            }
        }
        Ok(())
    }

    /// `det(A) = prod d_i`.
    fn compute_determinant(&self) -> Result<Complex<T::Real>, LinalgError> {
        self.factor()?;
        let prod = self
            .d
            .iter()
            .fold(<T::Real as One>::one(), |acc, &d| acc * d);
        Ok(Complex::new(prod, <T::Real as Zero>::zero()))
    }
}
