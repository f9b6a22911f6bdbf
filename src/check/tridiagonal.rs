use rand::Rng;
use tracing::trace;

use crate::config::Tolerance;
use crate::dense::features::{is_hermitian, is_tridiagonal};
use crate::dense::DenseMatrix;
use crate::linalg::{reflector_matrix, TridiagonalDecomposition};
use crate::random;
use crate::traits::LinalgScalar;

use super::{decompose_copy, ensure, ensure_close, garbage, CheckError};

fn odd_sizes() -> impl Iterator<Item = usize> {
    (1..20).step_by(2)
}

/// `Q*T*Q^H = A` for random Hermitian inputs of odd sizes `1..19`.
pub fn check_tridiagonal_full<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: TridiagonalDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "tridiagonal_full";
    for n in odd_sizes() {
        trace!(n, "tridiagonal full");
        let a = random::hermitian::<T, _>(n, -1.0, 1.0, rng);
        let mut alg = factory();
        decompose_copy(CHECK, &mut alg, &a)?;

        let q = alg.get_q(false)?;
        let t = alg.get_t()?;
        ensure(CHECK, is_tridiagonal(&t, 0.0), || {
            format!("{}x{} T is not tridiagonal", n, n)
        })?;
        let found = &(&q * &t) * &q.conj_transpose();
        ensure_close(CHECK, "A vs Q*T*Q^H", &a, &found, tol.tight)?;
    }
    Ok(())
}

/// `get_diagonal` reports the same entries as `get_t`.
pub fn check_tridiagonal_diagonal<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: TridiagonalDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "tridiagonal_diagonal";
    for n in odd_sizes() {
        let a = random::hermitian::<T, _>(n, -1.0, 1.0, rng);
        let mut alg = factory();
        decompose_copy(CHECK, &mut alg, &a)?;

        let t = alg.get_t()?;
        let mut diag = vec![T::zero(); n];
        let mut off = vec![T::zero(); n];
        alg.get_diagonal(&mut diag, &mut off)?;

        let from_t = DenseMatrix::from_fn(2, n, |r, i| match r {
            0 => t[(i, i)],
            _ if i + 1 < n => t[(i, i + 1)],
            _ => T::zero(),
        });
        let reported = DenseMatrix::from_fn(2, n, |r, i| match r {
            0 => diag[i],
            _ if i + 1 < n => off[i],
            _ => T::zero(),
        });
        ensure_close(CHECK, "get_diagonal vs get_t", &from_t, &reported, tol.tight)?;
    }
    Ok(())
}

/// `get_q(true)` is the conjugate transpose of `get_q(false)`.
pub fn check_tridiagonal_transpose_q<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: TridiagonalDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "tridiagonal_transpose_q";
    for n in odd_sizes() {
        let a = random::hermitian::<T, _>(n, -1.0, 1.0, rng);
        let mut alg = factory();
        decompose_copy(CHECK, &mut alg, &a)?;

        let q = alg.get_q(false)?;
        let qt = alg.get_q(true)?;
        ensure_close(CHECK, "Q^H vs get_q(true)", &q.conj_transpose(), &qt, tol.tight)?;
    }
    Ok(())
}

/// The stored reflectors, multiplied out as `H_0 * H_1 * ...`, reproduce Q.
/// Applied one at a time as `A <- H_k^H * A * H_k`, each keeps the matrix
/// Hermitian and zeroes column `k` below the sub-diagonal, ending at T.
pub fn check_tridiagonal_householder_vectors<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: TridiagonalDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "tridiagonal_householder_vectors";
    let n = 5;
    let a = random::hermitian::<T, _>(n, -1.0, 1.0, rng);
    let mut alg = factory();
    decompose_copy(CHECK, &mut alg, &a)?;

    let gammas = alg.gammas().to_vec();
    ensure(CHECK, gammas.len() == n - 2, || {
        format!("expected {} reflectors, found {}", n - 2, gammas.len())
    })?;

    let mut q = DenseMatrix::<T>::identity(n);
    let mut reduced = a.clone();
    for (k, &gamma) in gammas.iter().enumerate() {
        let u = alg.householder_vector(k)?;
        let leading_ok =
            u.len() == n && u[..=k].iter().all(|x| *x == T::zero()) && u[k + 1] == T::one();
        ensure(CHECK, leading_ok, || {
            format!("reflector {} does not start with zeros then 1: {:?}", k, u)
        })?;

        let h = reflector_matrix(&u, gamma);
        q = &q * &h;
        reduced = &(&h.conj_transpose() * &reduced) * &h;
        ensure(CHECK, is_hermitian(&reduced, tol.tight), || {
            format!("not Hermitian after reflector {}", k)
        })?;
        for i in (k + 2)..n {
            let leftover = T::real_to_f64(reduced[(i, k)].modulus());
            ensure(CHECK, leftover <= tol.tight, || {
                format!("reflector {} left {:e} at ({}, {})", k, leftover, i, k)
            })?;
        }
    }
    ensure_close(CHECK, "Q vs product of reflectors", &alg.get_q(false)?, &q, tol.tight)?;
    ensure_close(CHECK, "T vs reduced A", &alg.get_t()?, &reduced, tol.tight)?;

    ensure(CHECK, alg.householder_vector(n - 2).is_err(), || {
        "out-of-range reflector index accepted".to_string()
    })
}

/// `get_q_into` and `get_t_into` agree with the allocating extractors and
/// reject wrongly sized buffers.
pub fn check_tridiagonal_null_versus_not<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: TridiagonalDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "tridiagonal_null_versus_not";
    let n = 6;
    let a = random::hermitian::<T, _>(n, -1.0, 1.0, rng);
    let mut alg = factory();
    decompose_copy(CHECK, &mut alg, &a)?;

    for transpose in [false, true] {
        let mut q = garbage(n, n);
        alg.get_q_into(&mut q, transpose)?;
        ensure(CHECK, q == alg.get_q(transpose)?, || {
            format!("Q differs between buffer and allocation (transpose={})", transpose)
        })?;
    }
    let mut t = garbage(n, n);
    alg.get_t_into(&mut t)?;
    ensure(CHECK, t == alg.get_t()?, || {
        "T differs between buffer and allocation".to_string()
    })?;

    ensure(CHECK, alg.get_q_into(&mut garbage(n, n - 1), false).is_err(), || {
        "wrongly sized Q buffer accepted".to_string()
    })?;
    ensure(CHECK, alg.get_t_into(&mut garbage(n + 1, n)).is_err(), || {
        "wrongly sized T buffer accepted".to_string()
    })?;
    let mut short = vec![T::zero(); n - 1];
    let mut off = vec![T::zero(); n - 1];
    ensure(CHECK, alg.get_diagonal(&mut short, &mut off).is_err(), || {
        "short diagonal buffer accepted".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{Decomposition, LinalgError, TridiagonalHouseholder};
    use num_complex::Complex;
    use rand::{rngs::StdRng, SeedableRng};

    /// Reports the reflectors of a different matrix than the one decomposed.
    struct StaleReflectors {
        inner: TridiagonalHouseholder<Complex<f64>>,
        other: TridiagonalHouseholder<Complex<f64>>,
    }

    impl Decomposition<Complex<f64>> for StaleReflectors {
        fn decompose(&mut self, a: &mut DenseMatrix<Complex<f64>>) -> bool {
            let mut shifted = a.clone();
            shifted[(2, 0)] = shifted[(2, 0)] + Complex::new(0.5, 0.25);
            shifted[(0, 2)] = shifted[(2, 0)].conj();
            self.inner.decompose(a) && self.other.decompose(&mut shifted)
        }
        fn input_modified(&self) -> bool {
            false
        }
        fn dims(&self) -> Option<(usize, usize)> {
            self.inner.dims()
        }
    }

    impl TridiagonalDecomposition<Complex<f64>> for StaleReflectors {
        fn get_q_into(
            &self,
            out: &mut DenseMatrix<Complex<f64>>,
            transpose: bool,
        ) -> Result<(), LinalgError> {
            self.other.get_q_into(out, transpose)
        }
        fn get_t_into(&self, out: &mut DenseMatrix<Complex<f64>>) -> Result<(), LinalgError> {
            self.inner.get_t_into(out)
        }
        fn get_diagonal(
            &self,
            diag: &mut [Complex<f64>],
            off: &mut [Complex<f64>],
        ) -> Result<(), LinalgError> {
            self.inner.get_diagonal(diag, off)
        }
        fn gammas(&self) -> &[f64] {
            self.other.gammas()
        }
        fn householder_vector(&self, k: usize) -> Result<Vec<Complex<f64>>, LinalgError> {
            self.other.householder_vector(k)
        }
    }

    #[test]
    fn reflectors_of_another_matrix_are_caught() {
        let mut rng = StdRng::seed_from_u64(11);
        let err = check_tridiagonal_householder_vectors(
            || StaleReflectors {
                inner: TridiagonalHouseholder::new(),
                other: TridiagonalHouseholder::new(),
            },
            &mut rng,
            Tolerance::F64,
        )
        .unwrap_err();
        assert!(matches!(err, CheckError::Property { .. }), "{:?}", err);
    }

    #[test]
    fn householder_passes_real_and_complex() {
        let mut rng = StdRng::seed_from_u64(2344);
        check_tridiagonal_full(TridiagonalHouseholder::<f64>::new, &mut rng, Tolerance::F64)
            .unwrap();
        check_tridiagonal_householder_vectors(
            TridiagonalHouseholder::<Complex<f64>>::new,
            &mut rng,
            Tolerance::F64,
        )
        .unwrap();
    }
}
