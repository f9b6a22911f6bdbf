use rand::Rng;
use tracing::trace;

use crate::config::Tolerance;
use crate::dense::features::is_orthogonal;
use crate::linalg::QrDecomposition;
use crate::random;
use crate::traits::LinalgScalar;

use super::{decompose_copy, ensure, ensure_close, garbage, CheckError};

fn check_definition<T, D, R>(
    factory: &impl Fn() -> D,
    m: usize,
    n: usize,
    compact: bool,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: QrDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "qr_shapes";
    trace!(m, n, compact, "qr definition");
    let a = random::rectangular::<T, _>(m, n, -1.0, 1.0, rng);
    let mut alg = factory();
    decompose_copy(CHECK, &mut alg, &a)?;

    let q = alg.get_q(compact)?;
    let r = alg.get_r(compact)?;
    let k = if compact { m.min(n) } else { m };
    ensure(CHECK, q.shape() == (m, k) && r.shape() == (k, n), || {
        format!(
            "{}x{} compact={}: Q is {:?}, R is {:?}",
            m,
            n,
            compact,
            q.shape(),
            r.shape()
        )
    })?;
    ensure(CHECK, is_orthogonal(&q, tol.scaled(m)), || {
        format!("{}x{} compact={}: Q is not orthogonal", m, n, compact)
    })?;
    ensure_close(CHECK, "A vs Q*R", &a, &(&q * &r), tol.loose)?;
    ensure_close(CHECK, "R vs Q^H*A", &r, &(&q.conj_transpose() * &a), tol.loose)
}

/// `A = Q*R`, `Q^H*A = R` and `Q^H*Q = I` for square, tall and wide inputs in
/// both modes, then over a sweep of sizes up to `20 x 20`.
pub fn check_qr_shapes<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: QrDecomposition<T>,
    R: Rng,
{
    for (m, n) in [(5, 5), (10, 5), (5, 10)] {
        for compact in [false, true] {
            check_definition(&factory, m, n, compact, rng, tol)?;
        }
    }
    const SIZES: [usize; 5] = [1, 2, 7, 13, 20];
    for m in SIZES {
        for n in SIZES {
            for compact in [false, true] {
                check_definition(&factory, m, n, compact, rng, tol)?;
            }
        }
    }
    Ok(())
}

/// Extracting into a caller buffer gives the same result as a fresh
/// allocation, overwrites whatever the buffer held, and rejects buffers of
/// the wrong shape.
pub fn check_qr_null_versus_not<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: QrDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "qr_null_versus_not";
    let (m, n) = (10, 5);
    let a = random::rectangular::<T, _>(m, n, -1.0, 1.0, rng);
    let mut alg = factory();
    decompose_copy(CHECK, &mut alg, &a)?;

    for compact in [false, true] {
        let k = if compact { n } else { m };

        let mut q = garbage(m, k);
        alg.get_q_into(&mut q, compact)?;
        ensure(CHECK, q == alg.get_q(compact)?, || {
            format!("Q differs between buffer and allocation (compact={})", compact)
        })?;

        let mut qt = garbage(k, m);
        alg.get_qt_into(&mut qt, compact)?;
        ensure(CHECK, qt == alg.get_qt(compact)?, || {
            format!("Q^H differs between buffer and allocation (compact={})", compact)
        })?;

        let mut r = garbage(k, n);
        alg.get_r_into(&mut r, compact)?;
        ensure(CHECK, r == alg.get_r(compact)?, || {
            format!("R differs between buffer and allocation (compact={})", compact)
        })?;

        if k != m {
            ensure(CHECK, alg.get_qt_into(&mut garbage(m, k), compact).is_err(), || {
                format!("Q^H buffer of Q's shape accepted (compact={})", compact)
            })?;
            ensure(CHECK, alg.get_q_into(&mut garbage(k, m), compact).is_err(), || {
                format!("Q buffer of Q^H's shape accepted (compact={})", compact)
            })?;
        }
        ensure(CHECK, alg.get_qt_into(&mut garbage(k, m + 1), compact).is_err(), || {
            format!("Q^H buffer with an extra column accepted (compact={})", compact)
        })?;
    }
    Ok(())
}

/// The size of R depends on the mode; buffers of the other mode's size are
/// rejected.
pub fn check_qr_r_input_size<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: QrDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "qr_r_input_size";
    let (m, n) = (10, 5);
    let a = random::rectangular::<T, _>(m, n, -1.0, 1.0, rng);
    let mut alg = factory();
    decompose_copy(CHECK, &mut alg, &a)?;

    let rc = alg.get_r(true)?;
    let rf = alg.get_r(false)?;
    ensure(CHECK, rc.nrows() == n && rf.nrows() == m, || {
        format!("R rows: compact {}, full {}", rc.nrows(), rf.nrows())
    })?;

    alg.get_r_into(&mut garbage(n, n), true)?;
    alg.get_r_into(&mut garbage(m, n), false)?;

    ensure(CHECK, alg.get_r_into(&mut garbage(m, n), true).is_err(), || {
        "full-size buffer accepted in compact mode".to_string()
    })?;
    ensure(CHECK, alg.get_r_into(&mut garbage(n - 1, n), false).is_err(), || {
        "undersized buffer accepted in full mode".to_string()
    })
}

/// Compact Q of a tall matrix is `m x n` with orthonormal columns; a full
/// `m x m` buffer is rejected in compact mode.
pub fn check_qr_compact_format<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: QrDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "qr_compact_format";
    let (m, n) = (10, 5);
    let a = random::rectangular::<T, _>(m, n, -1.0, 1.0, rng);
    let mut alg = factory();
    decompose_copy(CHECK, &mut alg, &a)?;

    let mut q = garbage(m, n);
    alg.get_q_into(&mut q, true)?;
    ensure(CHECK, is_orthogonal(&q, tol.loose), || {
        "compact Q is not orthogonal".to_string()
    })?;

    ensure(CHECK, alg.get_q_into(&mut garbage(m, m), true).is_err(), || {
        "m x m buffer accepted in compact mode".to_string()
    })
}

/// `get_qt` is the conjugate transpose of `get_q` in both modes.
pub fn check_qr_transpose<T, D, R>(
    factory: impl Fn() -> D,
    rng: &mut R,
    tol: Tolerance,
) -> Result<(), CheckError>
where
    T: LinalgScalar,
    D: QrDecomposition<T>,
    R: Rng,
{
    const CHECK: &str = "qr_transpose";
    for (m, n) in [(5, 5), (10, 5), (5, 10)] {
        let a = random::rectangular::<T, _>(m, n, -1.0, 1.0, rng);
        let mut alg = factory();
        decompose_copy(CHECK, &mut alg, &a)?;
        for compact in [false, true] {
            let q = alg.get_q(compact)?;
            let qt = alg.get_qt(compact)?;
            ensure_close(CHECK, "Q^H vs get_qt", &q.conj_transpose(), &qt, tol.tight)?;
        }
    }
    Ok(())
}
