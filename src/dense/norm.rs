use num_traits::Zero;

use crate::traits::{LinalgScalar, Scalar};

use super::DenseMatrix;

impl<T: Scalar> DenseMatrix<T> {
    /// Sum of the main diagonal, over `min(nrows, ncols)` entries.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let m = DenseMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// assert_eq!(m.trace(), 6.0);
    /// ```
    pub fn trace(&self) -> T {
        let mut sum = T::zero();
        for i in 0..self.nrows.min(self.ncols) {
            sum = sum + self[(i, i)];
        }
        sum
    }
}

impl<T: LinalgScalar> DenseMatrix<T> {
    /// Frobenius norm, with the same max-scaling as the reflector kernel so
    /// large entries do not overflow.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let m = DenseMatrix::from_rows(2, 2, &[3.0_f64, 0.0, 0.0, 4.0]);
    /// assert!((m.norm_f() - 5.0).abs() < 1e-12);
    /// ```
    pub fn norm_f(&self) -> T::Real {
        let scale = self.max_abs();
        if scale == <T::Real as Zero>::zero() {
            return scale;
        }
        let mut sum = <T::Real as Zero>::zero();
        for &x in self.data.iter() {
            let s = x.modulus() / scale;
            sum = sum + s * s;
        }
        sum.lsqrt() * scale
    }

    /// Largest element modulus (zero for an empty matrix).
    pub fn max_abs(&self) -> T::Real {
        let mut max = <T::Real as Zero>::zero();
        for &x in self.data.iter() {
            let m = x.modulus();
            if m > max {
                max = m;
            }
        }
        max
    }
}
