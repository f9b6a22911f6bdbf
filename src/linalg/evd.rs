use num_complex::Complex;
use num_traits::Zero;
use tracing::warn;

use crate::dense::DenseMatrix;
use crate::linalg::symmetric_qr::{symmetric_qr, DEFAULT_MAX_ITERATIONS};
use crate::linalg::tridiagonal::TridiagonalHouseholder;
use crate::linalg::{Decomposition, LinalgError, TridiagonalDecomposition};
use crate::traits::LinalgScalar;

/// Options for [`SymmetricEvd::with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvdOptions {
    /// Compute eigenvectors as well as eigenvalues.
    pub vectors: bool,
    /// Implicit QR sweeps allowed per eigenvalue.
    pub max_iterations: usize,
}

impl Default for EvdOptions {
    fn default() -> Self {
        Self {
            vectors: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Eigen-decomposition of a symmetric (Hermitian) matrix.
///
/// Tridiagonalizes with Householder reflectors, rotates the complex
/// off-diagonal onto the real axis with a diagonal unitary scaling, and
/// finishes with implicit QR. Any failure is reported at construction.
///
/// Eigenvalues are sorted ascending.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::SymmetricEvd;
///
/// let a = DenseMatrix::from_rows(2, 2, &[2.0_f64, -1.0, -1.0, 2.0]);
/// let evd = SymmetricEvd::new(&a).unwrap();
/// assert_eq!(evd.number_of_eigenvalues(), 2);
/// assert!((evd.eigenvalue(0).re - 1.0).abs() < 1e-10);
/// assert!((evd.eigenvalue(1).re - 3.0).abs() < 1e-10);
/// assert_eq!(evd.index_max(), Some(1));
/// assert!(evd.quality(&a).unwrap() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SymmetricEvd<T: LinalgScalar> {
    values: Vec<T::Real>,
    vectors: Option<DenseMatrix<T>>,
}

impl<T: LinalgScalar> SymmetricEvd<T> {
    /// Decompose with eigenvectors and the default iteration cap.
    pub fn new(a: &DenseMatrix<T>) -> Result<Self, LinalgError> {
        Self::with_options(a, EvdOptions::default())
    }

    pub fn with_options(a: &DenseMatrix<T>, opts: EvdOptions) -> Result<Self, LinalgError> {
        if !a.is_square() {
            return Err(LinalgError::NotSquare);
        }
        let n = a.nrows();

        let mut tri = TridiagonalHouseholder::new();
        if !tri.decompose(&mut a.clone()) {
            warn!(n, "eigen-decomposition failed: could not tridiagonalize");
            return Err(LinalgError::InvalidArgument(
                "matrix could not be reduced to tridiagonal form".into(),
            ));
        }

        let mut diag_t = vec![T::zero(); n];
        let mut off_t = vec![T::zero(); n.saturating_sub(1)];
        tri.get_diagonal(&mut diag_t, &mut off_t)?;

        // D = diag(d_i) with d_0 = 1 and d_{i+1} = d_i * conj(e_i) / |e_i|
        // makes D^H * T * D real with off-diagonal |e_i|.
        let real_zero = <T::Real as Zero>::zero();
        let mut phase = vec![T::one(); n];
        let mut off = vec![real_zero; n.saturating_sub(1)];
        for (i, &e) in off_t.iter().enumerate() {
            let m = e.modulus();
            off[i] = m;
            phase[i + 1] = if m == real_zero {
                phase[i]
            } else {
                phase[i] * e.conj() / T::from_real(m)
            };
        }
        let mut values: Vec<T::Real> = diag_t.iter().map(|d| d.re()).collect();

        let mut vectors = if opts.vectors {
            let mut v = tri.get_q(false)?;
            for i in 0..n {
                for (x, &d) in v.row_mut(i).iter_mut().zip(phase.iter()) {
                    *x = *x * d;
                }
            }
            Some(v)
        } else {
            None
        };

        let converged = symmetric_qr::<T, DenseMatrix<T>>(
            &mut values,
            &mut off,
            vectors.as_mut(),
            opts.max_iterations,
        );
        if let Err(e) = converged {
            warn!(n, max_iterations = opts.max_iterations, "eigen-decomposition did not converge");
            return Err(e);
        }

        Ok(Self { values, vectors })
    }

    pub fn number_of_eigenvalues(&self) -> usize {
        self.values.len()
    }

    /// Eigenvalue `i`; always real for a Hermitian input.
    pub fn eigenvalue(&self, i: usize) -> Complex<T::Real> {
        Complex::new(self.values[i], <T::Real as Zero>::zero())
    }

    /// All eigenvalues, ascending.
    pub fn eigenvalues(&self) -> &[T::Real] {
        &self.values
    }

    /// Eigenvector of eigenvalue `i` as an `n x 1` column, or `None` when
    /// vectors were not requested.
    pub fn eigenvector(&self, i: usize) -> Option<DenseMatrix<T>> {
        let v = self.vectors.as_ref()?;
        if i >= v.ncols() {
            return None;
        }
        Some(DenseMatrix::from_fn(v.nrows(), 1, |r, _| v[(r, i)]))
    }

    /// All eigenvectors as columns.
    pub fn eigenvectors(&self) -> Option<&DenseMatrix<T>> {
        self.vectors.as_ref()
    }

    /// Index of the eigenvalue with the largest magnitude (first wins on ties).
    pub fn index_max(&self) -> Option<usize> {
        self.scan(|candidate, best| candidate > best)
    }

    /// Index of the eigenvalue with the smallest magnitude (first wins on ties).
    pub fn index_min(&self) -> Option<usize> {
        self.scan(|candidate, best| candidate < best)
    }

    fn scan(&self, better: impl Fn(T::Real, T::Real) -> bool) -> Option<usize> {
        let mut best: Option<(usize, T::Real)> = None;
        for (i, &v) in self.values.iter().enumerate() {
            let mag = v * v;
            match best {
                Some((_, b)) if !better(mag, b) => {}
                _ => best = Some((i, mag)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Relative residual `||A*V - V*D||_F / ||A*V||_F`.
    ///
    /// `a` must be the matrix this decomposition was built from; that is not
    /// checked.
    pub fn quality(&self, a: &DenseMatrix<T>) -> Result<T::Real, LinalgError> {
        let v = self.vectors.as_ref().ok_or_else(|| {
            LinalgError::InvalidArgument("eigenvectors were not computed".into())
        })?;
        let av = a.matmul(v)?;
        let mut vd = v.clone();
        for i in 0..vd.nrows() {
            for (x, &lambda) in vd.row_mut(i).iter_mut().zip(self.values.iter()) {
                *x = *x * T::from_real(lambda);
            }
        }
        let num = (&av - &vd).norm_f();
        let den = av.norm_f();
        if den == <T::Real as Zero>::zero() {
            return Ok(num);
        }
        Ok(num / den)
    }
}
