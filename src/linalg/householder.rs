use num_traits::{One, Zero};

use crate::dense::DenseMatrix;
use crate::traits::{LinalgScalar, MatrixMut};

/// Result of [`make_reflector`]: `H = I - gamma * u * u^H` with `H * x = beta * e_0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflector<T: LinalgScalar> {
    /// Real scale of the reflector; zero means `H = I`.
    pub gamma: T::Real,
    /// Value left in the leading slot by `H * x`.
    pub beta: T,
}

/// Largest element modulus of `x`, or `None` if any element is non-finite.
pub(crate) fn segment_max<T: LinalgScalar>(x: &[T]) -> Option<T::Real> {
    let mut max = <T::Real as Zero>::zero();
    for &v in x {
        if !v.lis_finite() {
            return None;
        }
        let m = v.modulus();
        if m > max {
            max = m;
        }
    }
    Some(max)
}

/// Build a Householder reflector that zeroes `x[1..]`.
///
/// On return `x[0] = beta` and `x[1..]` holds the tail of `u`; the leading
/// entry of `u` is an implicit 1. The segment is scaled by its largest modulus
/// before the norm is taken, so very large or very small entries neither
/// overflow nor underflow.
///
/// The sign of `tau` follows `x[0]` (its phase, for complex), so forming
/// `u0 = x0 + tau` adds magnitudes rather than cancelling them. This makes
/// `gamma = u0 / tau` real.
///
/// When `x[1..]` is already zero the identity reflector is returned
/// (`gamma = 0`, `beta = x[0]`) and `x` is left untouched.
///
/// ```
/// use densela::linalg::make_reflector;
/// let mut x = [3.0_f64, 4.0];
/// let r = make_reflector(&mut x);
/// assert!((r.beta + 5.0).abs() < 1e-12);
/// assert!((r.gamma - 1.6).abs() < 1e-12);
/// assert!((x[1] - 0.5).abs() < 1e-12);
/// ```
pub fn make_reflector<T: LinalgScalar>(x: &mut [T]) -> Reflector<T> {
    let real_zero = <T::Real as Zero>::zero();
    if x.is_empty() {
        return Reflector {
            gamma: real_zero,
            beta: T::zero(),
        };
    }
    let x0 = x[0];
    if x[1..].iter().all(|v| v.modulus() == real_zero) {
        return Reflector {
            gamma: real_zero,
            beta: x0,
        };
    }

    let mut max = real_zero;
    for v in x.iter() {
        let m = v.modulus();
        if m > max {
            max = m;
        }
    }
    let inv_max = T::from_real(<T::Real as One>::one() / max);
    let mut norm_sq = real_zero;
    for v in x.iter_mut() {
        *v = *v * inv_max;
        norm_sq = norm_sq + v.modulus_sq();
    }
    let norm = norm_sq.lsqrt();

    let head = x[0];
    let alpha = head.modulus();
    let tau = if alpha == real_zero {
        T::from_real(norm)
    } else {
        head / T::from_real(alpha) * T::from_real(norm)
    };

    let u0 = head + tau;
    let inv_u0 = T::one() / u0;
    for v in x[1..].iter_mut() {
        *v = *v * inv_u0;
    }

    let beta = T::zero() - tau * T::from_real(max);
    x[0] = beta;
    Reflector {
        gamma: (u0 / tau).re(),
        beta,
    }
}

/// `A <- (I - gamma * u * u^H) * A` on rows `row0..row0 + u.len()` and
/// columns `col0..col1`.
///
/// `work` must hold at least `col1 - col0` elements.
pub fn apply_left<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    u: &[T],
    gamma: T::Real,
    row0: usize,
    col0: usize,
    col1: usize,
    work: &mut [T],
) {
    if gamma == <T::Real as Zero>::zero() || col1 <= col0 {
        return;
    }
    let width = col1 - col0;
    let w = &mut work[..width];
    for x in w.iter_mut() {
        *x = T::zero();
    }

    // w = u^H * A
    for (i, &ui) in u.iter().enumerate() {
        let cu = ui.conj();
        let row = &a.row_as_slice(row0 + i, col0)[..width];
        for (acc, &aij) in w.iter_mut().zip(row) {
            *acc = *acc + cu * aij;
        }
    }

    let g = T::from_real(gamma);
    for (i, &ui) in u.iter().enumerate() {
        let s = g * ui;
        let row = &mut a.row_as_mut_slice(row0 + i, col0)[..width];
        for (aij, &wj) in row.iter_mut().zip(w.iter()) {
            *aij = *aij - s * wj;
        }
    }
}

/// `A <- A * (I - gamma * u * u^H)` on columns `col0..col0 + u.len()` and
/// rows `row0..row1`.
pub fn apply_right<T: LinalgScalar>(
    a: &mut impl MatrixMut<T>,
    u: &[T],
    gamma: T::Real,
    col0: usize,
    row0: usize,
    row1: usize,
) {
    if gamma == <T::Real as Zero>::zero() {
        return;
    }
    let g = T::from_real(gamma);
    for r in row0..row1 {
        let row = &mut a.row_as_mut_slice(r, col0)[..u.len()];
        let mut s = T::zero();
        for (&arc, &ui) in row.iter().zip(u) {
            s = s + arc * ui;
        }
        s = g * s;
        for (arc, &ui) in row.iter_mut().zip(u) {
            *arc = *arc - s * ui.conj();
        }
    }
}

/// Materialize `I - gamma * u * u^H`.
pub fn reflector_matrix<T: LinalgScalar>(u: &[T], gamma: T::Real) -> DenseMatrix<T> {
    let g = T::from_real(gamma);
    DenseMatrix::from_fn(u.len(), u.len(), |i, j| {
        let id = if i == j { T::one() } else { T::zero() };
        id - g * u[i] * u[j].conj()
    })
}
