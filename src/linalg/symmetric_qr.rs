use std::cmp::Ordering;

use num_traits::{Float, One, Zero};
use tracing::trace;

use crate::linalg::LinalgError;
use crate::traits::{LinalgScalar, MatrixMut};

/// Default cap on implicit QR sweeps spent isolating a single eigenvalue.
pub const DEFAULT_MAX_ITERATIONS: usize = 30;

/// Implicit QR iteration with Wilkinson shift on a real symmetric tridiagonal
/// matrix.
///
/// - `diag[0..n]`: diagonal entries (overwritten with eigenvalues, sorted ascending)
/// - `off[0..n-1]`: off-diagonal entries (destroyed)
/// - `q`: when present, Givens rotations are accumulated into its columns and
///   the columns are permuted along with the eigenvalues
/// - `max_iter_per_value`: sweeps allowed before the trailing eigenvalue
///   deflates; the counter restarts after every deflation
pub fn symmetric_qr<T: LinalgScalar, M: MatrixMut<T>>(
    diag: &mut [T::Real],
    off: &mut [T::Real],
    mut q: Option<&mut M>,
    max_iter_per_value: usize,
) -> Result<(), LinalgError> {
    let n = diag.len();
    if off.len() + 1 < n {
        return Err(LinalgError::InvalidLength {
            expected: n.saturating_sub(1),
            got: off.len(),
        });
    }
    if n <= 1 {
        return Ok(());
    }

    let mut sweeps = 0usize;
    let mut total = 0usize;
    let mut hi = n - 1;
    while hi > 0 {
        let lo = unreduced_start::<T>(diag, off, hi);
        if lo == hi {
            trace!(index = hi, sweeps, "eigenvalue deflated");
            hi -= 1;
            sweeps = 0;
            continue;
        }

        sweeps += 1;
        total += 1;
        if sweeps > max_iter_per_value {
            return Err(LinalgError::ConvergenceFailure);
        }
        let shift = wilkinson_shift::<T>(diag, off, hi);
        chase_bulge(diag, off, lo, hi, shift, q.as_deref_mut());
    }

    trace!(n, sweeps = total, "symmetric QR converged");
    sort_ascending(diag, q);
    Ok(())
}

/// Start of the unreduced block ending at `hi`. Negligible off-diagonal
/// entries met on the way up are set to zero.
fn unreduced_start<T: LinalgScalar>(diag: &[T::Real], off: &mut [T::Real], hi: usize) -> usize {
    let eps = T::lepsilon();
    let mut lo = hi;
    while lo > 0 {
        if off[lo - 1].abs() <= eps * (diag[lo - 1].abs() + diag[lo].abs()) {
            off[lo - 1] = <T::Real as Zero>::zero();
            break;
        }
        lo -= 1;
    }
    lo
}

/// Eigenvalue of the trailing 2x2 block closer to `diag[hi]`.
fn wilkinson_shift<T: LinalgScalar>(diag: &[T::Real], off: &[T::Real], hi: usize) -> T::Real {
    let half = T::real_from_f64(0.5);
    let d = (diag[hi - 1] - diag[hi]) * half;
    let e = off[hi - 1];
    let r = d.hypot(e);
    let denom = if d >= <T::Real as Zero>::zero() { d + r } else { d - r };
    if denom == <T::Real as Zero>::zero() {
        return diag[hi];
    }
    diag[hi] - e * e / denom
}

/// One implicit QR sweep over `lo..=hi`: a Givens rotation introduces the
/// shift, then each further rotation pushes the bulge one row down.
fn chase_bulge<T: LinalgScalar, M: MatrixMut<T>>(
    diag: &mut [T::Real],
    off: &mut [T::Real],
    lo: usize,
    hi: usize,
    shift: T::Real,
    mut q: Option<&mut M>,
) {
    let two = <T::Real as One>::one() + <T::Real as One>::one();
    let mut x = diag[lo] - shift;
    let mut z = off[lo];

    for k in lo..hi {
        let (c, s) = givens(x, z);
        if k > lo {
            off[k - 1] = c * x + s * z;
        }

        // G * T * G^T on rows/columns k and k+1
        let (a, b, e) = (diag[k], diag[k + 1], off[k]);
        let cs2e = two * c * s * e;
        diag[k] = c * c * a + cs2e + s * s * b;
        diag[k + 1] = s * s * a - cs2e + c * c * b;
        off[k] = c * s * (b - a) + (c * c - s * s) * e;

        if k + 1 < hi {
            let below = off[k + 1];
            x = off[k];
            z = s * below;
            off[k + 1] = c * below;
        }

        if let Some(q) = q.as_deref_mut() {
            rotate_columns(q, k, c, s);
        }
    }
}

/// `Q <- Q * G^T` for the rotation acting on columns `k` and `k+1`.
fn rotate_columns<T: LinalgScalar, M: MatrixMut<T>>(q: &mut M, k: usize, c: T::Real, s: T::Real) {
    let (c, s) = (T::from_real(c), T::from_real(s));
    for i in 0..q.nrows() {
        let left = *q.get(i, k);
        let right = *q.get(i, k + 1);
        *q.get_mut(i, k) = c * left + s * right;
        *q.get_mut(i, k + 1) = c * right - s * left;
    }
}

/// Givens rotation: compute (c, s) such that [c, s; -s, c] * [a; b] = [r; 0].
#[inline]
pub(crate) fn givens<R: Float>(a: R, b: R) -> (R, R) {
    if b == R::zero() {
        return (R::one(), R::zero());
    }
    let r = a.hypot(b);
    (a / r, b / r)
}

/// Stable ascending sort of the eigenvalues; the first `n` columns of `q`
/// follow the same permutation.
fn sort_ascending<T: LinalgScalar, M: MatrixMut<T>>(diag: &mut [T::Real], q: Option<&mut M>) {
    let n = diag.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| diag[i].partial_cmp(&diag[j]).unwrap_or(Ordering::Equal));
    if order.iter().enumerate().all(|(i, &j)| i == j) {
        return;
    }

    let sorted: Vec<T::Real> = order.iter().map(|&j| diag[j]).collect();
    diag.copy_from_slice(&sorted);
    if let Some(q) = q {
        let mut row = Vec::with_capacity(n);
        for i in 0..q.nrows() {
            row.clear();
            row.extend(order.iter().map(|&j| *q.get(i, j)));
            for (c, &v) in row.iter().enumerate() {
                *q.get_mut(i, c) = v;
            }
        }
    }
}
