use approx::assert_abs_diff_eq;
use densela::dense::features::{is_hermitian, is_identical, is_orthogonal};
use densela::linalg::{
    CholeskyDecomposition, CholeskyInner, CholeskyLdl, Decomposition, LuDecomposition,
    QrDecomposition, QrHouseholder, SymmetricEvd, TridiagonalDecomposition,
    TridiagonalHouseholder,
};
use densela::linsol::{LinearSolver, LinearSolverChol, LinearSolverLdl};
use densela::{Complex, DenseMatrix};

type C = Complex<f64>;

fn c(re: f64, im: f64) -> C {
    Complex::new(re, im)
}

const TOL: f64 = 1e-10;

fn assert_complex_near(a: C, b: C, tol: f64, msg: &str) {
    assert!(
        (a.re - b.re).abs() < tol && (a.im - b.im).abs() < tol,
        "{}: {:?} vs {:?}",
        msg,
        a,
        b
    );
}

/// Hermitian positive-definite: [[4, 2+i, 0], [2-i, 5, i], [0, -i, 3]]
fn hpd3() -> DenseMatrix<C> {
    DenseMatrix::from_rows(
        3,
        3,
        &[
            c(4.0, 0.0),
            c(2.0, 1.0),
            c(0.0, 0.0),
            c(2.0, -1.0),
            c(5.0, 0.0),
            c(0.0, 1.0),
            c(0.0, 0.0),
            c(0.0, -1.0),
            c(3.0, 0.0),
        ],
    )
}

// ── LU tests ─────────────────────────────────────────────────────────

#[test]
fn complex_lu_solve() {
    let a = DenseMatrix::from_rows(2, 2, &[c(2.0, 1.0), c(1.0, -1.0), c(1.0, 0.0), c(3.0, 2.0)]);
    let b = DenseMatrix::column(&[c(5.0, 3.0), c(7.0, 4.0)]);

    let x = LuDecomposition::new(&a).unwrap().solve(&b).unwrap();

    // Verify A*x == b
    let ax = &a * &x;
    for i in 0..2 {
        assert_complex_near(ax[(i, 0)], b[(i, 0)], TOL, &format!("row {}", i));
    }
}

#[test]
fn complex_lu_det() {
    let a = DenseMatrix::from_rows(2, 2, &[c(1.0, 1.0), c(2.0, 0.0), c(0.0, 1.0), c(1.0, -1.0)]);
    // (1+i)(1-i) - (2)(i) = 2 - 2i
    let det = LuDecomposition::new(&a).unwrap().det();
    assert_complex_near(det, c(2.0, -2.0), TOL, "det");
}

// ── Cholesky tests ───────────────────────────────────────────────────

#[test]
fn complex_cholesky_both_orientations() {
    let a = hpd3();
    for lower in [true, false] {
        let mut chol = CholeskyInner::new(lower);
        assert!(chol.decompose(&mut a.clone()));
        let t = chol.get_t().unwrap();
        let th = t.conj_transpose();
        let found = if lower { &t * &th } else { &th * &t };
        assert!(is_identical(&found, &a, TOL), "lower = {}", lower);

        // the diagonal of the factor is real and positive
        for i in 0..3 {
            assert_eq!(t[(i, i)].im, 0.0);
            assert!(t[(i, i)].re > 0.0);
        }
    }
}

#[test]
fn complex_cholesky_determinant_is_real() {
    let a = hpd3();
    let expected = LuDecomposition::new(&a).unwrap().det();
    let mut chol = CholeskyInner::new(true);
    assert!(chol.decompose(&mut a.clone()));
    let det = chol.compute_determinant().unwrap();
    assert_eq!(det.im, 0.0);
    assert_complex_near(det, expected, 1e-9, "det");

    let mut ldl = CholeskyLdl::new();
    assert!(ldl.decompose(&mut a.clone()));
    assert_complex_near(ldl.compute_determinant().unwrap(), expected, 1e-9, "ldl det");
}

#[test]
fn complex_linear_solvers_agree() {
    let a = hpd3();
    let b = DenseMatrix::from_rows(3, 2, &[c(1.0, 0.0), c(0.0, 1.0), c(2.0, -1.0), c(1.0, 1.0), c(0.0, 3.0), c(-1.0, 0.0)]);

    let mut chol = LinearSolverChol::new(false);
    let mut ldl = LinearSolverLdl::new();
    assert!(chol.set_a(&a));
    assert!(ldl.set_a(&a));

    let mut x1 = DenseMatrix::zeros(3, 2);
    let mut x2 = DenseMatrix::zeros(3, 2);
    chol.solve(&b, &mut x1).unwrap();
    ldl.solve(&b, &mut x2).unwrap();
    assert!(is_identical(&x1, &x2, TOL));
    assert!(is_identical(&(&a * &x1), &b, TOL));

    let mut inv = DenseMatrix::zeros(3, 3);
    ldl.invert(&mut inv).unwrap();
    assert!(is_hermitian(&inv, TOL));
    assert!(is_identical(&(&a * &inv), &DenseMatrix::identity(3), TOL));
}

// ── QR tests ─────────────────────────────────────────────────────────

#[test]
fn complex_qr_factorization() {
    let a = DenseMatrix::from_rows(
        3,
        2,
        &[c(1.0, 1.0), c(2.0, 0.0), c(0.0, -1.0), c(1.0, 2.0), c(3.0, 0.0), c(0.0, 1.0)],
    );
    let mut qr = QrHouseholder::new();
    assert!(qr.decompose(&mut a.clone()));

    for compact in [true, false] {
        let q = qr.get_q(compact).unwrap();
        let r = qr.get_r(compact).unwrap();
        // Q^H * Q == I (unitary)
        assert!(is_orthogonal(&q, TOL));
        // Q*R == A
        assert!(is_identical(&(&q * &r), &a, TOL));
    }
}

#[test]
fn complex_qr_least_squares() {
    let a = DenseMatrix::from_rows(2, 2, &[c(2.0, 1.0), c(1.0, -1.0), c(1.0, 0.0), c(3.0, 2.0)]);
    let b = DenseMatrix::column(&[c(5.0, 3.0), c(7.0, 4.0)]);
    let mut qr = QrHouseholder::new();
    assert!(qr.decompose(&mut a.clone()));
    let x = qr.solve(&b).unwrap();
    assert!(is_identical(&(&a * &x), &b, TOL));
}

// ── Tridiagonal and eigen tests ──────────────────────────────────────

#[test]
fn complex_tridiagonal_similarity() {
    let a = hpd3();
    let mut tri = TridiagonalHouseholder::new();
    assert!(tri.decompose(&mut a.clone()));
    let q = tri.get_q(false).unwrap();
    let t = tri.get_t().unwrap();
    assert!(is_identical(&(&(&q * &t) * &q.conj_transpose()), &a, TOL));
}

#[test]
fn complex_eigenvalues_are_real() {
    let a = hpd3();
    let evd = SymmetricEvd::new(&a).unwrap();
    let sum: f64 = evd.eigenvalues().iter().sum();
    assert_abs_diff_eq!(sum, 12.0, epsilon = TOL);
    // positive definite
    assert!(evd.eigenvalues()[0] > 0.0);
    assert!(evd.quality(&a).unwrap() < TOL);
}

// ── Norm tests ───────────────────────────────────────────────────────

#[test]
fn complex_frobenius_norm() {
    let a = DenseMatrix::from_rows(2, 2, &[c(3.0, 4.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)]);
    // sqrt(|3+4i|^2 + 0 + 0 + 1) = sqrt(26)
    assert_abs_diff_eq!(a.norm_f(), 26.0_f64.sqrt(), epsilon = 1e-12);
    assert_complex_near(a.trace(), c(4.0, 4.0), 1e-12, "trace");
}
