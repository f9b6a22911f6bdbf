use approx::assert_relative_eq;
use densela::dense::features::is_orthogonal;
use densela::linalg::{EvdOptions, LinalgError, SymmetricEvd};
use densela::{random, Complex, DenseMatrix};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn random_real_symmetric() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in [1, 2, 5, 12, 20] {
        let a: DenseMatrix<f64> = random::hermitian(n, -1.0, 1.0, &mut rng);
        let evd = SymmetricEvd::new(&a).unwrap();
        assert_eq!(evd.number_of_eigenvalues(), n);
        let vals = evd.eigenvalues();
        assert!(vals.windows(2).all(|w| w[0] <= w[1]));
        assert_relative_eq!(vals.iter().sum::<f64>(), a.trace(), epsilon = 1e-9);
        assert!(is_orthogonal(evd.eigenvectors().unwrap(), 1e-9));
        assert!(evd.quality(&a).unwrap() < 1e-10, "n = {}", n);
    }
}

#[test]
fn random_hermitian() {
    let mut rng = StdRng::seed_from_u64(18);
    for n in [3, 8, 15] {
        let a: DenseMatrix<Complex<f64>> = random::hermitian(n, -1.0, 1.0, &mut rng);
        let evd = SymmetricEvd::new(&a).unwrap();
        assert_relative_eq!(evd.eigenvalues().iter().sum::<f64>(), a.trace().re, epsilon = 1e-9);
        assert!(evd.quality(&a).unwrap() < 1e-10);
        let i = evd.index_max().unwrap();
        let v = evd.eigenvector(i).unwrap();
        let av = &a * &v;
        let lambda = evd.eigenvalue(i);
        for r in 0..n {
            assert!((av[(r, 0)] - lambda * v[(r, 0)]).norm() < 1e-9);
        }
    }
}

#[test]
fn index_by_magnitude() {
    let a = DenseMatrix::from_rows(3, 3, &[-5.0_f64, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 3.0]);
    let evd = SymmetricEvd::new(&a).unwrap();
    assert_eq!(evd.eigenvalues(), &[-5.0, 0.5, 3.0]);
    assert_eq!(evd.index_max(), Some(0));
    assert_eq!(evd.index_min(), Some(1));
}

#[test]
fn non_convergence_fails_fast() {
    let mut rng = StdRng::seed_from_u64(19);
    let a: DenseMatrix<f64> = random::hermitian(6, -1.0, 1.0, &mut rng);
    let opts = EvdOptions {
        vectors: false,
        max_iterations: 0,
    };
    assert_eq!(
        SymmetricEvd::with_options(&a, opts).unwrap_err(),
        LinalgError::ConvergenceFailure
    );
}
