use core::ops::{Add, Mul, Neg, Sub};

use crate::linalg::LinalgError;
use crate::traits::{LinalgScalar, Scalar};

use super::DenseMatrix;

// ── Element-wise addition / subtraction ─────────────────────────────

impl<T: Scalar> Add<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn add(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "dimension mismatch: {}x{} + {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(&a, &b)| a + b)
            .collect();
        DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Sub<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn sub(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "dimension mismatch: {}x{} - {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(&a, &b)| a - b)
            .collect();
        DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Neg for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn neg(self) -> DenseMatrix<T> {
        let data = self.data.iter().map(|&a| T::zero() - a).collect();
        DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

// ── Matrix multiply ─────────────────────────────────────────────────

impl<T: Scalar> Mul<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    /// Matrix product. Panics on inner-dimension mismatch; see
    /// [`DenseMatrix::matmul`] for the fallible version.
    fn mul(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let mut out = DenseMatrix::zeros(self.nrows, rhs.ncols);
        mul_kernel(self, rhs, &mut out);
        out
    }
}

/// `out = a * b`, i-k-j loop order so both inner accesses are row slices.
fn mul_kernel<T: Scalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>, out: &mut DenseMatrix<T>) {
    out.set_zero();
    let n = b.ncols;
    for i in 0..a.nrows {
        for k in 0..a.ncols {
            let aik = a.data[i * a.ncols + k];
            let b_row = &b.data[k * n..(k + 1) * n];
            let out_row = &mut out.data[i * n..(i + 1) * n];
            for (o, &bkj) in out_row.iter_mut().zip(b_row.iter()) {
                *o = *o + aik * bkj;
            }
        }
    }
}

impl<T: Scalar> DenseMatrix<T> {
    /// Fallible matrix product.
    pub fn matmul(&self, rhs: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
        if self.ncols != rhs.nrows {
            return Err(LinalgError::DimensionMismatch {
                expected: (self.ncols, rhs.ncols),
                got: (rhs.nrows, rhs.ncols),
            });
        }
        let mut out = DenseMatrix::zeros(self.nrows, rhs.ncols);
        mul_kernel(self, rhs, &mut out);
        Ok(out)
    }

    /// `out = self * rhs` into a caller buffer of shape `self.nrows x rhs.ncols`.
    pub fn matmul_into(
        &self,
        rhs: &DenseMatrix<T>,
        out: &mut DenseMatrix<T>,
    ) -> Result<(), LinalgError> {
        if self.ncols != rhs.nrows {
            return Err(LinalgError::DimensionMismatch {
                expected: (self.ncols, rhs.ncols),
                got: (rhs.nrows, rhs.ncols),
            });
        }
        out.ensure_shape(self.nrows, rhs.ncols)?;
        mul_kernel(self, rhs, out);
        Ok(())
    }

    /// Transpose.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let a = DenseMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = a.transpose();
    /// assert_eq!(t.shape(), (3, 2));
    /// assert_eq!(t[(2, 1)], 6.0);
    /// ```
    pub fn transpose(&self) -> DenseMatrix<T> {
        DenseMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Multiply every element by `s`.
    pub fn scale(&self, s: T) -> DenseMatrix<T> {
        self.map(|x| x * s)
    }

    /// Apply `f` to every element.
    pub fn map<U>(&self, f: impl Fn(T) -> U) -> DenseMatrix<U> {
        DenseMatrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: LinalgScalar> DenseMatrix<T> {
    /// Conjugate transpose (`A^H`). Equal to [`transpose`](Self::transpose)
    /// for real matrices.
    pub fn conj_transpose(&self) -> DenseMatrix<T> {
        DenseMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)].conj())
    }
}
