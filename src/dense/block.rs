use crate::linalg::LinalgError;
use crate::traits::Scalar;

use super::DenseMatrix;

impl<T: Scalar> DenseMatrix<T> {
    /// Copy out rows `row0..row1` and columns `col0..col1` (ends exclusive).
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let m = DenseMatrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
    /// let b = m.extract(1, 3, 1, 3).unwrap();
    /// assert_eq!(b.as_slice(), &[4.0, 5.0, 7.0, 8.0]);
    /// assert!(m.extract(2, 4, 0, 1).is_err());
    /// ```
    pub fn extract(
        &self,
        row0: usize,
        row1: usize,
        col0: usize,
        col1: usize,
    ) -> Result<DenseMatrix<T>, LinalgError> {
        if row0 > row1 || col0 > col1 || row1 > self.nrows || col1 > self.ncols {
            return Err(LinalgError::InvalidArgument(format!(
                "extract rows {}..{} cols {}..{} out of bounds for {}x{} matrix",
                row0, row1, col0, col1, self.nrows, self.ncols
            )));
        }
        let mut out = DenseMatrix::zeros(row1 - row0, col1 - col0);
        for i in row0..row1 {
            out.row_mut(i - row0)
                .copy_from_slice(&self.row(i)[col0..col1]);
        }
        Ok(out)
    }

    /// Write `src` into `self` with its top-left corner at `(row, col)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    pub fn set_block(&mut self, row: usize, col: usize, src: &DenseMatrix<T>) {
        assert!(
            row + src.nrows <= self.nrows && col + src.ncols <= self.ncols,
            "set_block ({},{}) size {}x{} out of bounds for {}x{} matrix",
            row, col, src.nrows, src.ncols, self.nrows, self.ncols,
        );
        for i in 0..src.nrows {
            self.row_mut(row + i)[col..col + src.ncols].copy_from_slice(src.row(i));
        }
    }

    /// Kronecker product `self ⊗ rhs`.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let a = DenseMatrix::from_rows(1, 2, &[1.0_f64, 2.0]);
    /// let b = DenseMatrix::<f64>::identity(2);
    /// let k = a.kron(&b);
    /// assert_eq!(k.shape(), (2, 4));
    /// assert_eq!(k.row(1), &[0.0, 1.0, 0.0, 2.0]);
    /// ```
    pub fn kron(&self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        let (m, n) = rhs.shape();
        let mut out = DenseMatrix::zeros(self.nrows * m, self.ncols * n);
        for i in 0..self.nrows {
            for j in 0..self.ncols {
                let a = self[(i, j)];
                for k in 0..m {
                    for l in 0..n {
                        out[(i * m + k, j * n + l)] = a * rhs[(k, l)];
                    }
                }
            }
        }
        out
    }

    /// Stack matrices vertically. All inputs must have the same column count.
    pub fn cat_v(parts: &[&DenseMatrix<T>]) -> Result<DenseMatrix<T>, LinalgError> {
        let first = parts
            .first()
            .ok_or_else(|| LinalgError::InvalidArgument("catV needs at least one input".into()))?;
        let ncols = first.ncols;
        let mut nrows = 0;
        for p in parts {
            if p.ncols != ncols {
                return Err(LinalgError::DimensionMismatch {
                    expected: (p.nrows, ncols),
                    got: p.shape(),
                });
            }
            nrows += p.nrows;
        }
        let mut data = Vec::with_capacity(nrows * ncols);
        for p in parts {
            data.extend_from_slice(&p.data);
        }
        Ok(DenseMatrix { data, nrows, ncols })
    }

    /// Stack matrices horizontally. All inputs must have the same row count.
    pub fn cat_h(parts: &[&DenseMatrix<T>]) -> Result<DenseMatrix<T>, LinalgError> {
        let first = parts
            .first()
            .ok_or_else(|| LinalgError::InvalidArgument("catH needs at least one input".into()))?;
        let nrows = first.nrows;
        let mut ncols = 0;
        for p in parts {
            if p.nrows != nrows {
                return Err(LinalgError::DimensionMismatch {
                    expected: (nrows, p.ncols),
                    got: p.shape(),
                });
            }
            ncols += p.ncols;
        }
        let mut out = DenseMatrix::zeros(nrows, ncols);
        let mut col = 0;
        for p in parts {
            out.set_block(0, col, p);
            col += p.ncols;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_empty_range() {
        let m = DenseMatrix::<f64>::identity(3);
        let e = m.extract(1, 1, 0, 3).unwrap();
        assert_eq!(e.shape(), (0, 3));
    }

    #[test]
    fn cat_v_and_h() {
        let a = DenseMatrix::from_rows(1, 2, &[1.0, 2.0]);
        let b = DenseMatrix::from_rows(2, 2, &[3.0, 4.0, 5.0, 6.0]);
        let v = DenseMatrix::cat_v(&[&a, &b]).unwrap();
        assert_eq!(v.shape(), (3, 2));
        assert_eq!(v.row(2), &[5.0, 6.0]);

        let c = DenseMatrix::from_rows(2, 1, &[7.0, 8.0]);
        let h = DenseMatrix::cat_h(&[&b, &c]).unwrap();
        assert_eq!(h.as_slice(), &[3.0, 4.0, 7.0, 5.0, 6.0, 8.0]);
    }

    #[test]
    fn cat_rejects_mismatch() {
        let a = DenseMatrix::<f64>::zeros(1, 2);
        let b = DenseMatrix::<f64>::zeros(1, 3);
        assert!(DenseMatrix::cat_v(&[&a, &b]).is_err());
        let c = DenseMatrix::<f64>::zeros(2, 2);
        assert!(DenseMatrix::cat_h(&[&a, &c]).is_err());
        assert!(DenseMatrix::<f64>::cat_h(&[]).is_err());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_block_out_of_bounds() {
        let mut m = DenseMatrix::<f64>::zeros(2, 2);
        m.set_block(1, 1, &DenseMatrix::zeros(2, 2));
    }
}
