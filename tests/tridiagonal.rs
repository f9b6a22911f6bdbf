use densela::check;
use densela::config::Tolerance;
use densela::linalg::TridiagonalHouseholder;
use densela::{Complex, DenseMatrix, LinalgScalar};
use rand::{rngs::StdRng, SeedableRng};

fn run_all<T: LinalgScalar>(tol: Tolerance) {
    let mut rng = StdRng::seed_from_u64(2344);
    check::check_tridiagonal_full(TridiagonalHouseholder::<T>::new, &mut rng, tol).unwrap();
    check::check_tridiagonal_diagonal(TridiagonalHouseholder::<T>::new, &mut rng, tol).unwrap();
    check::check_tridiagonal_transpose_q(TridiagonalHouseholder::<T>::new, &mut rng, tol).unwrap();
    check::check_tridiagonal_householder_vectors(TridiagonalHouseholder::<T>::new, &mut rng, tol)
        .unwrap();
    check::check_tridiagonal_null_versus_not(TridiagonalHouseholder::<T>::new, &mut rng).unwrap();
}

#[test]
fn householder_f64() {
    run_all::<f64>(Tolerance::F64);
}

#[test]
fn householder_f32() {
    run_all::<f32>(Tolerance::F32);
}

#[test]
fn householder_complex() {
    run_all::<Complex<f64>>(Tolerance::F64);
}

#[test]
fn modified_input() {
    let mut rng = StdRng::seed_from_u64(5);
    let a: DenseMatrix<f64> = densela::random::hermitian(7, -1.0, 1.0, &mut rng);
    check::check_modified_input(&mut TridiagonalHouseholder::new(), &a).unwrap();
}
