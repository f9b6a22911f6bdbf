use num_traits::Zero;
use tracing::debug;

use crate::dense::DenseMatrix;
use crate::linalg::householder::{apply_left, make_reflector, segment_max};
use crate::linalg::{Decomposition, LinalgError, QrDecomposition};
use crate::traits::{LinalgScalar, MatrixMut};

/// QR decomposition in place using Householder reflections.
///
/// On return, `a` contains the packed factorization:
/// - upper triangle (including diagonal): R
/// - strictly below the diagonal of column `j`: the tail of reflector `j`
///   (its leading 1 is implicit)
///
/// `gammas` receives the reflector scales and must have length `min(m, n)`.
/// Works on square, tall and wide matrices.
///
/// Returns `LinalgError::Singular` if a column segment is entirely zero and
/// `InvalidArgument` if it holds a non-finite value.
pub fn qr_in_place<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    gammas: &mut [T::Real],
) -> Result<(), LinalgError> {
    let m = a.nrows();
    let n = a.ncols();
    let k = m.min(n);
    if gammas.len() != k {
        return Err(LinalgError::InvalidLength {
            expected: k,
            got: gammas.len(),
        });
    }

    let mut u = vec![T::zero(); m];
    let mut work = vec![T::zero(); n];

    for j in 0..k {
        let len = m - j;
        let seg = &mut u[..len];
        for (i, v) in seg.iter_mut().enumerate() {
            *v = *a.get(j + i, j);
        }

        match segment_max(seg) {
            None => {
                return Err(LinalgError::InvalidArgument(format!(
                    "non-finite value in column {}",
                    j
                )))
            }
            Some(max) if max == <T::Real as Zero>::zero() => return Err(LinalgError::Singular),
            Some(_) => {}
        }

        let r = make_reflector(seg);
        *a.get_mut(j, j) = r.beta;
        for i in 1..len {
            *a.get_mut(j + i, j) = seg[i];
        }
        seg[0] = T::one();
        gammas[j] = r.gamma;

        apply_left(a, seg, r.gamma, j, j + 1, n, &mut work);
    }

    Ok(())
}

/// Householder QR decomposition of a dense `m x n` matrix.
///
/// Default mode copies the input; [`in_place`](Self::in_place) mode packs the
/// factorization into the caller's buffer as well.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::{Decomposition, QrDecomposition, QrHouseholder};
///
/// let mut a = DenseMatrix::from_rows(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]);
/// let mut qr = QrHouseholder::new();
/// assert!(qr.decompose(&mut a));
///
/// let q = qr.get_q(true).unwrap();
/// let r = qr.get_r(true).unwrap();
/// assert_eq!(q.shape(), (3, 2));
/// assert_eq!(r.shape(), (2, 2));
/// let qr_prod = &q * &r;
/// assert!((qr_prod[(2, 1)] - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct QrHouseholder<T: LinalgScalar> {
    qr: DenseMatrix<T>,
    gammas: Vec<T::Real>,
    in_place: bool,
    decomposed: bool,
}

impl<T: LinalgScalar> Default for QrHouseholder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LinalgScalar> QrHouseholder<T> {
    pub fn new() -> Self {
        Self {
            qr: DenseMatrix::zeros(0, 0),
            gammas: Vec::new(),
            in_place: false,
            decomposed: false,
        }
    }

    /// Overwrite the caller's matrix with the packed factorization.
    pub fn in_place(mut self) -> Self {
        self.in_place = true;
        self
    }

    /// Packed factorization (R on and above the diagonal, reflectors below).
    pub fn packed(&self) -> Result<&DenseMatrix<T>, LinalgError> {
        self.ready()?;
        Ok(&self.qr)
    }

    /// Reflector scales, one per column of `min(m, n)`.
    pub fn gammas(&self) -> &[T::Real] {
        &self.gammas
    }

    fn ready(&self) -> Result<(), LinalgError> {
        if self.decomposed {
            Ok(())
        } else {
            Err(LinalgError::NotDecomposed)
        }
    }

    /// Reflector `j` as a full segment `[1, u_1, ..]` over rows `j..m`.
    fn reflector(&self, j: usize, u: &mut Vec<T>) {
        let m = self.qr.nrows();
        u.clear();
        u.push(T::one());
        for i in (j + 1)..m {
            u.push(self.qr[(i, j)]);
        }
    }

    /// Least-squares solution of `A * X = B` for full-rank `A` with `m >= n`.
    ///
    /// `B` is `m x k`; the result is `n x k`.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
        self.ready()?;
        let (m, n) = self.qr.shape();
        if m < n {
            return Err(LinalgError::InvalidArgument(format!(
                "least-squares solve needs rows >= cols, got {}x{}",
                m, n
            )));
        }
        if b.nrows() != m {
            return Err(LinalgError::DimensionMismatch {
                expected: (m, b.ncols()),
                got: b.shape(),
            });
        }

        let k = b.ncols();
        let mut qtb = b.clone();
        let mut u = Vec::with_capacity(m);
        let mut work = vec![T::zero(); k];
        for j in 0..n {
            self.reflector(j, &mut u);
            apply_left(&mut qtb, &u, self.gammas[j], j, 0, k, &mut work);
        }

        // Back substitution with the leading n x n block of R
        let mut x = DenseMatrix::zeros(n, k);
        for c in 0..k {
            for i in (0..n).rev() {
                let mut sum = qtb[(i, c)];
                for j in (i + 1)..n {
                    sum = sum - self.qr[(i, j)] * x[(j, c)];
                }
                let rii = self.qr[(i, i)];
                if rii.modulus() == <T::Real as Zero>::zero() {
                    return Err(LinalgError::Singular);
                }
                x[(i, c)] = sum / rii;
            }
        }
        Ok(x)
    }
}

impl<T: LinalgScalar> Decomposition<T> for QrHouseholder<T> {
    fn decompose(&mut self, a: &mut DenseMatrix<T>) -> bool {
        self.decomposed = false;
        self.gammas.clear();
        self.gammas
            .resize(a.nrows().min(a.ncols()), <T::Real as Zero>::zero());

        let result = if self.in_place {
            let r = qr_in_place(a, &mut self.gammas);
            self.qr.set_from(a);
            r
        } else {
            self.qr.set_from(a);
            qr_in_place(&mut self.qr, &mut self.gammas)
        };

        match result {
            Ok(()) => {
                self.decomposed = true;
                true
            }
            Err(e) => {
                debug!(rows = a.nrows(), cols = a.ncols(), error = %e, "QR decomposition failed");
                false
            }
        }
    }

    fn input_modified(&self) -> bool {
        self.in_place
    }

    fn dims(&self) -> Option<(usize, usize)> {
        self.decomposed.then(|| self.qr.shape())
    }
}

impl<T: LinalgScalar> QrDecomposition<T> for QrHouseholder<T> {
    fn get_q_into(&self, out: &mut DenseMatrix<T>, compact: bool) -> Result<(), LinalgError> {
        self.ready()?;
        let (m, n) = self.qr.shape();
        let qcols = if compact { m.min(n) } else { m };
        out.ensure_shape(m, qcols)?;

        // Apply the reflectors in reverse to the leading columns of I
        out.set_zero();
        for i in 0..qcols {
            out[(i, i)] = T::one();
        }
        let mut u = Vec::with_capacity(m);
        let mut work = vec![T::zero(); qcols];
        for j in (0..m.min(n)).rev() {
            self.reflector(j, &mut u);
            apply_left(out, &u, self.gammas[j], j, j, qcols, &mut work);
        }
        Ok(())
    }

    fn get_qt_into(&self, out: &mut DenseMatrix<T>, compact: bool) -> Result<(), LinalgError> {
        self.ready()?;
        let (m, n) = self.qr.shape();
        let qcols = if compact { m.min(n) } else { m };
        out.ensure_shape(qcols, m)?;

        let mut q = DenseMatrix::zeros(m, qcols);
        self.get_q_into(&mut q, compact)?;
        for i in 0..qcols {
            for j in 0..m {
                out[(i, j)] = q[(j, i)].conj();
            }
        }
        Ok(())
    }

    fn get_r_into(&self, out: &mut DenseMatrix<T>, compact: bool) -> Result<(), LinalgError> {
        self.ready()?;
        let (m, n) = self.qr.shape();
        let rows = if compact { m.min(n) } else { m };
        out.ensure_shape(rows, n)?;

        out.set_zero();
        for i in 0..m.min(n) {
            for j in i..n {
                out[(i, j)] = self.qr[(i, j)];
            }
        }
        Ok(())
    }
}
