use num_traits::Zero;
use tracing::debug;

use crate::dense::DenseMatrix;
use crate::linalg::householder::{apply_left, make_reflector, segment_max};
use crate::linalg::{Decomposition, LinalgError, TridiagonalDecomposition};
use crate::traits::{LinalgScalar, MatrixMut};

/// Householder tridiagonalization in place.
///
/// `a` must hold a full Hermitian matrix. On return:
/// - the diagonal and the first sub/super-diagonal hold T
/// - column `k` below the sub-diagonal holds the tail of reflector `k`
///   (its leading 1, at row `k+1`, is implicit)
/// - `gammas[k]` holds the scale of reflector `k`
///
/// `gammas` must have length `n.saturating_sub(2)`. Entries above the
/// super-diagonal are left unspecified.
pub fn tridiagonalize_in_place<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    gammas: &mut [T::Real],
) -> Result<(), LinalgError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::NotSquare);
    }
    let count = n.saturating_sub(2);
    if gammas.len() != count {
        return Err(LinalgError::InvalidLength {
            expected: count,
            got: gammas.len(),
        });
    }

    let mut u = vec![T::zero(); n];
    let mut p = vec![T::zero(); n];

    for k in 0..count {
        let len = n - k - 1;
        let u = &mut u[..len];
        for (i, v) in u.iter_mut().enumerate() {
            *v = *a.get(k + 1 + i, k);
        }
        if segment_max(u).is_none() {
            return Err(LinalgError::InvalidArgument(format!(
                "non-finite value in column {}",
                k
            )));
        }

        let r = make_reflector(u);
        *a.get_mut(k + 1, k) = r.beta;
        *a.get_mut(k, k + 1) = r.beta.conj();
        for i in 1..len {
            *a.get_mut(k + 1 + i, k) = u[i];
        }
        u[0] = T::one();
        gammas[k] = r.gamma;

        if r.gamma == <T::Real as Zero>::zero() {
            continue;
        }

        // Symmetric rank-2 update of the trailing block B = A[k+1.., k+1..]:
        //   p = gamma * B * u
        //   w = p - (gamma/2) * (u^H p) * u
        //   B <- B - u * w^H - w * u^H
        let g = T::from_real(r.gamma);
        let p = &mut p[..len];
        for (i, pi) in p.iter_mut().enumerate() {
            let row = &a.row_as_slice(k + 1 + i, k + 1)[..len];
            let mut dot = T::zero();
            for (&bij, &uj) in row.iter().zip(u.iter()) {
                dot = dot + bij * uj;
            }
            *pi = g * dot;
        }
        let mut uhp = T::zero();
        for (&ui, &pi) in u.iter().zip(p.iter()) {
            uhp = uhp + ui.conj() * pi;
        }
        let half = T::from_real(r.gamma * T::real_from_f64(0.5)) * uhp;
        for (pi, &ui) in p.iter_mut().zip(u.iter()) {
            *pi = *pi - half * ui;
        }
        for i in 0..len {
            let (ui, wi) = (u[i], p[i]);
            let row = &mut a.row_as_mut_slice(k + 1 + i, k + 1)[..len];
            for (j, bij) in row.iter_mut().enumerate() {
                *bij = *bij - ui * p[j].conj() - wi * u[j].conj();
            }
        }
    }

    Ok(())
}

/// Householder reduction of a Hermitian matrix to tridiagonal form,
/// `A = Q * T * Q^H`.
///
/// Only the lower triangle of the input is read; the upper triangle is
/// taken to be its conjugate mirror.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
/// use densela::dense::features::{is_identical, is_tridiagonal};
/// use densela::linalg::{Decomposition, TridiagonalDecomposition, TridiagonalHouseholder};
///
/// let a = DenseMatrix::from_rows(4, 4, &[
///     4.0_f64, 1.0, -2.0, 2.0,
///     1.0, 2.0, 0.0, 1.0,
///     -2.0, 0.0, 3.0, -2.0,
///     2.0, 1.0, -2.0, -1.0,
/// ]);
/// let mut tri = TridiagonalHouseholder::new();
/// assert!(tri.decompose(&mut a.clone()));
/// let q = tri.get_q(false).unwrap();
/// let t = tri.get_t().unwrap();
/// assert!(is_tridiagonal(&t, 0.0));
/// assert!(is_identical(&(&(&q * &t) * &q.transpose()), &a, 1e-10));
/// ```
#[derive(Debug, Clone)]
pub struct TridiagonalHouseholder<T: LinalgScalar> {
    qt: DenseMatrix<T>,
    gammas: Vec<T::Real>,
    decomposed: bool,
}

impl<T: LinalgScalar> Default for TridiagonalHouseholder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LinalgScalar> TridiagonalHouseholder<T> {
    pub fn new() -> Self {
        Self {
            qt: DenseMatrix::zeros(0, 0),
            gammas: Vec::new(),
            decomposed: false,
        }
    }

    fn ready(&self) -> Result<usize, LinalgError> {
        if self.decomposed {
            Ok(self.qt.nrows())
        } else {
            Err(LinalgError::NotDecomposed)
        }
    }

    /// Leading segment `[1, tail..]` of reflector `k`, over rows `k+1..n`.
    fn segment(&self, k: usize, u: &mut Vec<T>) {
        let n = self.qt.nrows();
        u.clear();
        u.push(T::one());
        for i in (k + 2)..n {
            u.push(self.qt[(i, k)]);
        }
    }

    fn sub_diagonal(&self, i: usize) -> T {
        self.qt[(i + 1, i)]
    }
}

impl<T: LinalgScalar> Decomposition<T> for TridiagonalHouseholder<T> {
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> bool {
        self.decomposed = false;
        if !a.is_square() {
            debug!(rows = a.nrows(), cols = a.ncols(), "tridiagonal input is not square");
            return false;
        }
        let n = a.nrows();

        // Mirror the lower triangle so the kernel sees a full Hermitian matrix
        self.qt.reshape(n, n);
        for i in 0..n {
            for j in 0..=i {
                let v = a[(i, j)];
                self.qt[(i, j)] = v;
                self.qt[(j, i)] = v.conj();
            }
        }
        self.gammas.clear();
        self.gammas
            .resize(n.saturating_sub(2), <T::Real as Zero>::zero());

        match tridiagonalize_in_place(&mut self.qt, &mut self.gammas) {
            Ok(()) => {
                self.decomposed = true;
                true
            }
            Err(e) => {
                debug!(n, error = %e, "tridiagonal decomposition failed");
                false
            }
        }
    }

    fn input_modified(&self) -> bool {
        false
    }

    fn dims(&self) -> Option<(usize, usize)> {
        self.decomposed.then(|| self.qt.shape())
    }
}

impl<T: LinalgScalar> TridiagonalDecomposition<T> for TridiagonalHouseholder<T> {
    fn get_q_into(&self, out: &mut DenseMatrix<T>, transpose: bool) -> Result<(), LinalgError> {
        let n = self.ready()?;
        out.ensure_shape(n, n)?;

        // Q = H_0 * H_1 * ... ; build it right to left from the identity
        out.set_zero();
        for i in 0..n {
            out[(i, i)] = T::one();
        }
        let mut u = Vec::with_capacity(n);
        let mut work = vec![T::zero(); n];
        for k in (0..self.gammas.len()).rev() {
            self.segment(k, &mut u);
            apply_left(out, &u, self.gammas[k], k + 1, k + 1, n, &mut work);
        }

        if transpose {
            for i in 0..n {
                for j in 0..i {
                    let (x, y) = (out[(i, j)], out[(j, i)]);
                    out[(i, j)] = y.conj();
                    out[(j, i)] = x.conj();
                }
                out[(i, i)] = out[(i, i)].conj();
            }
        }
        Ok(())
    }

    fn get_t_into(&self, out: &mut DenseMatrix<T>) -> Result<(), LinalgError> {
        let n = self.ready()?;
        out.ensure_shape(n, n)?;
        out.set_zero();
        for i in 0..n {
            out[(i, i)] = self.qt[(i, i)];
        }
        for i in 0..n.saturating_sub(1) {
            let e = self.sub_diagonal(i);
            out[(i + 1, i)] = e;
            out[(i, i + 1)] = e.conj();
        }
        Ok(())
    }

    fn get_diagonal(&self, diag: &mut [T], off: &mut [T]) -> Result<(), LinalgError> {
        let n = self.ready()?;
        let n_off = n.saturating_sub(1);
        if diag.len() < n || off.len() < n_off {
            return Err(LinalgError::DimensionMismatch {
                expected: (n, n_off),
                got: (diag.len(), off.len()),
            });
        }
        for i in 0..n {
            diag[i] = self.qt[(i, i)];
        }
        for i in 0..n_off {
            off[i] = self.sub_diagonal(i).conj();
        }
        Ok(())
    }

    fn gammas(&self) -> &[T::Real] {
        if self.decomposed {
            &self.gammas
        } else {
            &[]
        }
    }

    fn householder_vector(&self, k: usize) -> Result<Vec<T>, LinalgError> {
        let n = self.ready()?;
        if k >= self.gammas.len() {
            return Err(LinalgError::InvalidArgument(format!(
                "reflector {} out of range for {}x{} matrix",
                k, n, n
            )));
        }
        let mut u = vec![T::zero(); n];
        u[k + 1] = T::one();
        for i in (k + 2)..n {
            u[i] = self.qt[(i, k)];
        }
        Ok(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::features::{is_hermitian, is_identical, is_orthogonal, is_tridiagonal};
    use crate::linalg::reflector_matrix;
    use num_complex::Complex;

    const TOL: f64 = 1e-10;

    fn symmetric(n: usize) -> DenseMatrix<f64> {
        DenseMatrix::from_fn(n, n, |i, j| {
            let (a, b) = (i.min(j), i.max(j));
            ((a * 5 + b * 3) % 7) as f64 - 3.0 + 0.25 * (a + b) as f64
        })
    }

    #[test]
    fn reconstructs_real() {
        for n in 1..8 {
            let a = symmetric(n);
            let mut tri = TridiagonalHouseholder::new();
            assert!(tri.decompose(&mut a.clone()));
            let q = tri.get_q(false).unwrap();
            let t = tri.get_t().unwrap();
            assert!(is_orthogonal(&q, TOL));
            assert!(is_tridiagonal(&t, 0.0));
            assert!(is_identical(&(&(&q * &t) * &q.transpose()), &a, TOL), "n = {}", n);
        }
    }

    #[test]
    fn reconstructs_complex() {
        let n = 5;
        let a = DenseMatrix::from_fn(n, n, |i, j| {
            let re = ((i + j) % 4) as f64 - 1.5;
            let im = i as f64 - j as f64;
            Complex::new(re, if i == j { 0.0 } else { im * 0.3 })
        });
        assert!(is_hermitian(&a, 0.0));
        let mut tri = TridiagonalHouseholder::new();
        assert!(tri.decompose(&mut a.clone()));
        let q = tri.get_q(false).unwrap();
        let t = tri.get_t().unwrap();
        assert!(is_orthogonal(&q, TOL));
        assert!(is_hermitian(&t, TOL));
        assert!(is_identical(&(&(&q * &t) * &q.conj_transpose()), &a, TOL));
        assert!(is_identical(&tri.get_q(true).unwrap(), &q.conj_transpose(), 0.0));
    }

    #[test]
    fn upper_triangle_ignored() {
        let a = symmetric(4);
        let mut junk = a.clone();
        junk[(0, 3)] = 99.0;
        let mut tri = TridiagonalHouseholder::new();
        assert!(tri.decompose(&mut junk));
        let q = tri.get_q(false).unwrap();
        let t = tri.get_t().unwrap();
        assert!(is_identical(&(&(&q * &t) * &q.transpose()), &a, TOL));
    }

    #[test]
    fn householder_vectors_zero_columns() {
        let mut a = symmetric(5);
        let mut tri = TridiagonalHouseholder::new();
        assert!(tri.decompose(&mut a.clone()));
        for (k, &gamma) in tri.gammas().iter().enumerate() {
            let u = tri.householder_vector(k).unwrap();
            let h = reflector_matrix(&u, gamma);
            a = &(&h * &a) * &h;
            assert!(is_hermitian(&a, TOL));
            for i in (k + 2)..5 {
                assert!(a[(i, k)].abs() < TOL);
            }
        }
        assert!(tri.householder_vector(3).is_err());
    }

    #[test]
    fn diagonal_matches_t() {
        let a = symmetric(6);
        let mut tri = TridiagonalHouseholder::new();
        assert!(tri.decompose(&mut a.clone()));
        let t = tri.get_t().unwrap();
        let mut d = [0.0; 6];
        let mut e = [0.0; 5];
        tri.get_diagonal(&mut d, &mut e).unwrap();
        for i in 0..6 {
            assert_eq!(d[i], t[(i, i)]);
        }
        for i in 0..5 {
            assert_eq!(e[i], t[(i, i + 1)]);
        }
        let mut short = [0.0; 4];
        assert!(tri.get_diagonal(&mut d, &mut short).is_err());
    }

    #[test]
    fn rejects_non_square_and_nan() {
        let mut tri = TridiagonalHouseholder::<f64>::new();
        assert!(!tri.decompose(&mut DenseMatrix::zeros(2, 3)));
        let mut a = symmetric(4);
        a[(3, 0)] = f64::NAN;
        assert!(!tri.decompose(&mut a));
        assert!(tri.get_t().is_err());
    }
}
