use num_traits::Zero;

use crate::dense::DenseMatrix;
use crate::linalg::LinalgError;
use crate::traits::{LinalgScalar, MatrixMut, MatrixRef};

/// Perform LU decomposition with partial pivoting, in place.
///
/// On return, `a` contains both L and U packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// `perm` is filled with the row permutation indices.
/// Returns `true` if the number of row swaps was even.
pub fn lu_in_place<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    perm: &mut [usize],
) -> Result<bool, LinalgError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::NotSquare);
    }
    if perm.len() != n {
        return Err(LinalgError::InvalidLength {
            expected: n,
            got: perm.len(),
        });
    }

    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    // Pivots at or below this are treated as zero. Relative to the largest
    // entry so the test does not depend on the matrix's scale.
    let mut scale = <T::Real as Zero>::zero();
    for i in 0..n {
        for j in 0..n {
            let v = a.get(i, j).modulus();
            if v > scale {
                scale = v;
            }
        }
    }
    let threshold = scale * T::lepsilon() * T::real_from_f64(n as f64);

    let mut even = true;

    for col in 0..n {
        // Partial pivoting: find row with largest modulus in this column
        let mut max_row = col;
        let mut max_val = a.get(col, col).modulus();
        for row in (col + 1)..n {
            let val = a.get(row, col).modulus();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if !(max_val > threshold) {
            return Err(LinalgError::Singular);
        }

        if max_row != col {
            perm.swap(col, max_row);
            for j in 0..n {
                let tmp = *a.get(col, j);
                *a.get_mut(col, j) = *a.get(max_row, j);
                *a.get_mut(max_row, j) = tmp;
            }
            even = !even;
        }

        // Row-oriented elimination: scale the multiplier, then subtract a
        // multiple of the pivot row tail from each row below.
        let inv_pivot = T::one() / *a.get(col, col);
        let pivot_row: Vec<T> = a.row_as_slice(col, col + 1).to_vec();
        for row in (col + 1)..n {
            let factor = *a.get(row, col) * inv_pivot;
            *a.get_mut(row, col) = factor;
            let tail = a.row_as_mut_slice(row, col + 1);
            for (x, &p) in tail.iter_mut().zip(pivot_row.iter()) {
                *x = *x - factor * p;
            }
        }
    }

    Ok(even)
}

/// Solve Ax = b given the packed LU decomposition and permutation.
///
/// `lu` is the packed L/U matrix from `lu_in_place`.
/// `perm` is the row permutation from `lu_in_place`.
/// `b` (input) and `x` (output) are separate slices of length n.
pub fn lu_solve<T: LinalgScalar>(lu: &impl MatrixRef<T>, perm: &[usize], b: &[T], x: &mut [T]) {
    let n = lu.nrows();

    // Apply permutation and forward substitution (solve Ly = Pb)
    for i in 0..n {
        let mut sum = b[perm[i]];
        for j in 0..i {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum;
    }

    // Back substitution (solve Ux = y)
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum / *lu.get(i, i);
    }
}

/// LU decomposition of a square dense matrix.
///
/// Backs the `inv` and `det` named functions and provides an independent
/// determinant for cross-checking the Cholesky factorizations.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::LuDecomposition;
///
/// let a = DenseMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 5.0, 3.0]);
/// let lu = LuDecomposition::new(&a).unwrap();
///
/// let b = DenseMatrix::column(&[4.0, 11.0]);
/// let x = lu.solve(&b).unwrap();
/// assert!((x[(0, 0)] - 1.0).abs() < 1e-12);
/// assert!((x[(1, 0)] - 2.0).abs() < 1e-12);
/// assert!((lu.det() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition<T> {
    lu: DenseMatrix<T>,
    perm: Vec<usize>,
    even: bool,
}

impl<T: LinalgScalar> LuDecomposition<T> {
    /// Decompose a matrix. Returns an error if the matrix is singular.
    pub fn new(a: &DenseMatrix<T>) -> Result<Self, LinalgError> {
        if !a.is_square() {
            return Err(LinalgError::NotSquare);
        }
        let mut lu = a.clone();
        let mut perm = vec![0usize; a.nrows()];
        let even = lu_in_place(&mut lu, &mut perm)?;
        Ok(Self { lu, perm, even })
    }

    /// Solve `A * X = B` column by column.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
        let n = self.lu.nrows();
        if b.nrows() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: (n, b.ncols()),
                got: b.shape(),
            });
        }
        let mut x = DenseMatrix::zeros(n, b.ncols());
        let mut col = vec![T::zero(); n];
        let mut out = vec![T::zero(); n];
        for c in 0..b.ncols() {
            for i in 0..n {
                col[i] = b[(i, c)];
            }
            lu_solve(&self.lu, &self.perm, &col, &mut out);
            for i in 0..n {
                x[(i, c)] = out[i];
            }
        }
        Ok(x)
    }

    /// Compute the matrix inverse.
    pub fn inverse(&self) -> DenseMatrix<T> {
        let n = self.lu.nrows();
        let mut inv = DenseMatrix::zeros(n, n);
        let mut e = vec![T::zero(); n];
        let mut col_buf = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();

            lu_solve(&self.lu, &self.perm, &e, &mut col_buf);

            for row in 0..n {
                inv[(row, col)] = col_buf[row];
            }
        }

        inv
    }

    /// Compute the determinant.
    pub fn det(&self) -> T {
        let mut d = if self.even {
            T::one()
        } else {
            T::zero() - T::one()
        };
        for i in 0..self.lu.nrows() {
            d = d * self.lu[(i, i)];
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    const TOL: f64 = 1e-10;

    #[test]
    fn det_3x3() {
        let a = DenseMatrix::from_rows(3, 3, &[6.0_f64, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0]);
        let lu = LuDecomposition::new(&a).unwrap();
        assert!((lu.det() - (-306.0)).abs() < TOL);
    }

    #[test]
    fn inverse_roundtrip() {
        let a = DenseMatrix::from_rows(3, 3, &[2.0_f64, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        let inv = LuDecomposition::new(&a).unwrap().inverse();
        let id = &a * &inv;
        for i in 0..3 {
            for j in 0..3 {
                let e = if i == j { 1.0 } else { 0.0 };
                assert!((id[(i, j)] - e).abs() < TOL);
            }
        }
    }

    #[test]
    fn pivoting_needed() {
        let a = DenseMatrix::from_rows(2, 2, &[0.0_f64, 1.0, 1.0, 0.0]);
        let lu = LuDecomposition::new(&a).unwrap();
        assert!((lu.det() + 1.0).abs() < TOL);
    }

    #[test]
    fn tiny_scale_is_not_singular() {
        let a = DenseMatrix::<f64>::identity(2).scale(1e-17);
        let lu = LuDecomposition::new(&a).unwrap();
        assert!((lu.det() - 1e-34).abs() < 1e-46);
        let inv = lu.inverse();
        assert!((inv[(0, 0)] - 1e17).abs() < 1e5);
        assert_eq!(inv[(0, 1)], 0.0);
    }

    #[test]
    fn rounded_rank_deficiency_is_singular() {
        let a = DenseMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(LuDecomposition::new(&a).unwrap_err(), LinalgError::Singular);
    }

    #[test]
    fn singular_and_not_square() {
        let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
        assert_eq!(LuDecomposition::new(&a).unwrap_err(), LinalgError::Singular);
        let b = DenseMatrix::<f64>::zeros(2, 3);
        assert_eq!(LuDecomposition::new(&b).unwrap_err(), LinalgError::NotSquare);
    }

    #[test]
    fn complex_det() {
        let a = DenseMatrix::from_rows(
            2,
            2,
            &[
                Complex::new(1.0_f64, 1.0),
                Complex::new(2.0, 0.0),
                Complex::new(0.0, 1.0),
                Complex::new(1.0, -1.0),
            ],
        );
        let det = LuDecomposition::new(&a).unwrap().det();
        // (1+i)(1-i) - 2i = 2 - 2i
        assert!((det - Complex::new(2.0, -2.0)).norm() < TOL);
    }
}
