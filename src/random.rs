//! Random test matrices.
//!
//! Entries are drawn uniformly from `[min, max)`; complex entries draw the
//! real and imaginary parts independently. Pass a seeded generator
//! (`StdRng::seed_from_u64`) for reproducible checks.

use rand::Rng;

use crate::dense::DenseMatrix;
use crate::traits::LinalgScalar;

fn sample<T: LinalgScalar, R: Rng>(rng: &mut R, min: f64, max: f64) -> T {
    let re = rng.gen_range(min..max);
    let im = rng.gen_range(min..max);
    T::from_f64_parts(re, im)
}

/// `nrows x ncols` matrix with independent entries in `[min, max)`.
///
/// ```
/// use densela::random;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let a = random::rectangular::<f64, _>(3, 2, -1.0, 1.0, &mut rng);
/// assert_eq!(a.shape(), (3, 2));
/// assert!(a.as_slice().iter().all(|x| (-1.0..1.0).contains(x)));
/// ```
pub fn rectangular<T: LinalgScalar, R: Rng>(
    nrows: usize,
    ncols: usize,
    min: f64,
    max: f64,
    rng: &mut R,
) -> DenseMatrix<T> {
    let mut data = Vec::with_capacity(nrows * ncols);
    for _ in 0..nrows * ncols {
        data.push(sample(rng, min, max));
    }
    DenseMatrix::from_rows(nrows, ncols, &data)
}

/// `n x n` Hermitian matrix: random upper triangle mirrored with conjugation,
/// real diagonal.
pub fn hermitian<T: LinalgScalar, R: Rng>(
    n: usize,
    min: f64,
    max: f64,
    rng: &mut R,
) -> DenseMatrix<T> {
    let mut a = DenseMatrix::zeros(n, n);
    for i in 0..n {
        a[(i, i)] = T::from_f64_parts(rng.gen_range(min..max), 0.0);
        for j in (i + 1)..n {
            let v: T = sample(rng, min, max);
            a[(i, j)] = v;
            a[(j, i)] = v.conj();
        }
    }
    a
}

/// `n x n` Hermitian positive-definite matrix, `B * B^H + I` with `B` in
/// `[-1, 1)`.
pub fn hermitian_pos_def<T: LinalgScalar, R: Rng>(n: usize, rng: &mut R) -> DenseMatrix<T> {
    let b: DenseMatrix<T> = rectangular(n, n, -1.0, 1.0, rng);
    let mut a = &b * &b.conj_transpose();
    for i in 0..n {
        a[(i, i)] = a[(i, i)] + T::one();
    }
    // symmetrize so the imaginary part of the diagonal is exactly zero
    for i in 0..n {
        a[(i, i)] = T::from_real(a[(i, i)].re());
        for j in (i + 1)..n {
            a[(j, i)] = a[(i, j)].conj();
        }
    }
    a
}
