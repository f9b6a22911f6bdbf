use num_complex::Complex;
use rand::Rng;
use tracing::trace;

use crate::config::Tolerance;
use crate::dense::features::{is_lower_triangle, is_upper_triangle};
use crate::dense::DenseMatrix;
use crate::linalg::{CholeskyDecomposition, LuDecomposition};
use crate::random;
use crate::traits::LinalgScalar;

use super::{decompose_copy, ensure, ensure_close, garbage, CheckError};

/// Orientations the implementation claims to support.
fn orientations<T: LinalgScalar, D: CholeskyDecomposition<T>>() -> impl Iterator<Item = bool> {
    [true, false].into_iter().filter(|&lower| {
        if lower {
            D::SUPPORTS_LOWER
        } else {
            D::SUPPORTS_UPPER
        }
    })
}

/// `T*T^H = A` (lower) or `T^H*T = A` (upper) for sizes `1..10`, with `T`
/// triangular in the requested orientation.
pub fn check_cholesky_definition<T, D, R>(
    factory: impl Fn(bool) -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: CholeskyDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "cholesky_definition";
    for lower in orientations::<T, D>() {
        for n in 1..10 {
            trace!(n, lower, "cholesky definition");
            let a = random::hermitian_pos_def::<T, _>(n, rng);
            let mut alg = factory(lower);
            decompose_copy(CHECK, &mut alg, &a)?;
            ensure(CHECK, alg.is_lower() == lower, || {
                format!("requested lower={} but is_lower()={}", lower, alg.is_lower())
            })?;

            let t = alg.get_t()?;
            let triangular = if lower {
                is_lower_triangle(&t, 0.0)
            } else {
                is_upper_triangle(&t, 0.0)
            };
            ensure(CHECK, triangular, || {
                format!("{}x{} factor is not {} triangular", n, n, if lower { "lower" } else { "upper" })
            })?;

            let th = t.conj_transpose();
            let found = if lower { &t * &th } else { &th * &t };
            ensure_close(CHECK, "A vs factor product", &a, &found, tol.tight)?;
        }
    }
    Ok(())
}

/// Determinant from the factor agrees with LU, relative to its magnitude,
/// for even sizes `2..20`. The LU reference is computed in double precision.
pub fn check_cholesky_determinant<T, D, R>(
    factory: impl Fn(bool) -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: CholeskyDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "cholesky_determinant";
    let widen =
        |z: Complex<T::Real>| Complex::new(T::real_to_f64(z.re), T::real_to_f64(z.im));
    for lower in orientations::<T, D>() {
        for n in (2..20).step_by(2) {
            let a = random::hermitian_pos_def::<T, _>(n, rng);
            let wide = a.map(|x| widen(x.to_complex()));
            let expected = LuDecomposition::new(&wide)?.det();

            let mut alg = factory(lower);
            decompose_copy(CHECK, &mut alg, &a)?;
            let found = widen(alg.compute_determinant()?);

            let error = (expected - found).norm() / expected.norm().max(1.0);
            if !(error <= tol.tight) {
                return Err(CheckError::Tolerance {
                    check: CHECK,
                    what: format!("{}x{} determinant (lower={})", n, n, lower),
                    error,
                    tol: tol.tight,
                });
            }
        }
    }
    Ok(())
}

/// A Hermitian matrix with a negative pivot is rejected.
pub fn check_cholesky_not_positive_definite<T, D>(factory: impl Fn(bool) -> D) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: CholeskyDecomposition<T>,
{
    const CHECK: &str = "cholesky_not_positive_definite";
    let v = |x: f64| T::from_f64_parts(x, 0.0);
    let a = DenseMatrix::from_rows(2, 2, &[v(1.0), v(-1.0), v(-1.0), v(-2.0)]);
    for lower in orientations::<T, D>() {
        if factory(lower).decompose(&mut a.clone()) {
            return Err(CheckError::UnexpectedSuccess {
                check: CHECK,
                shape: a.shape(),
            });
        }
    }
    Ok(())
}

/// The zero matrix is rejected in every supported orientation.
pub fn check_cholesky_zeros<T, D>(factory: impl Fn(bool) -> D) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: CholeskyDecomposition<T>,
{
    const CHECK: &str = "cholesky_zeros";
    let a = DenseMatrix::<T>::zeros(3, 3);
    for lower in orientations::<T, D>() {
        if factory(lower).decompose(&mut a.clone()) {
            return Err(CheckError::UnexpectedSuccess {
                check: CHECK,
                shape: a.shape(),
            });
        }
    }
    Ok(())
}

/// `get_t_into` agrees with `get_t`, overwrites the buffer, and rejects a
/// wrongly sized one.
pub fn check_cholesky_null_versus_not<T, D, R>(
    factory: impl Fn(bool) -> D,
    rng: &mut R,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: CholeskyDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "cholesky_null_versus_not";
    let n = 5;
    for lower in orientations::<T, D>() {
        let a = random::hermitian_pos_def::<T, _>(n, rng);
        let mut alg = factory(lower);
        decompose_copy(CHECK, &mut alg, &a)?;

        let mut t = garbage(n, n);
        alg.get_t_into(&mut t)?;
        ensure(CHECK, t == alg.get_t()?, || {
            format!("factor differs between buffer and allocation (lower={})", lower)
        })?;
        ensure(CHECK, alg.get_t_into(&mut garbage(n, n + 1)).is_err(), || {
            "wrongly sized buffer accepted".to_string()
        })?;
    }
    Ok(())
}
