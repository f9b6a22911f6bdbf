use approx::assert_abs_diff_eq;
use densela::config::TEST_F64_SQ;
use densela::dense::features::is_identical;
use densela::linalg::CholeskyInner;
use densela::linsol::{LinearSolver, LinearSolverChol, LinearSolverLdl};
use densela::random;
use densela::{Complex, DenseMatrix};
use rand::{rngs::StdRng, SeedableRng};

fn worked_a() -> DenseMatrix<f64> {
    DenseMatrix::from_rows(3, 3, &[1.0, 2.0, 4.0, 2.0, 13.0, 23.0, 4.0, 23.0, 90.0])
}

fn expected_inverse() -> DenseMatrix<f64> {
    DenseMatrix::from_rows(
        3,
        3,
        &[
            1.453515, -0.199546, -0.013605, //
            -0.199546, 0.167800, -0.034014, //
            -0.013605, -0.034014, 0.020408,
        ],
    )
}

fn solvers() -> Vec<Box<dyn LinearSolver<f64>>> {
    vec![
        Box::new(LinearSolverChol::new(true)),
        Box::new(LinearSolverChol::new(false)),
        Box::new(LinearSolverChol::from_decomposition(CholeskyInner::new(true).in_place())),
        Box::new(LinearSolverLdl::new()),
    ]
}

#[test]
fn worked_example_solve() {
    let a = worked_a();
    let b = DenseMatrix::column(&[17.0, 97.0, 320.0]);
    for mut solver in solvers() {
        let a_before = a.clone();
        let b_before = b.clone();
        assert!(solver.set_a(&a));
        let mut x = DenseMatrix::zeros(3, 1);
        solver.solve(&b, &mut x).unwrap();
        assert_abs_diff_eq!(x[(0, 0)], 1.0, epsilon = TEST_F64_SQ);
        assert_abs_diff_eq!(x[(1, 0)], 2.0, epsilon = TEST_F64_SQ);
        assert_abs_diff_eq!(x[(2, 0)], 3.0, epsilon = TEST_F64_SQ);

        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
        assert!(!solver.modifies_a());
        assert!(!solver.modifies_b());
    }
}

#[test]
fn worked_example_invert() {
    for mut solver in solvers() {
        assert!(solver.set_a(&worked_a()));
        let mut inv = DenseMatrix::zeros(3, 3);
        solver.invert(&mut inv).unwrap();
        assert!(is_identical(&inv, &expected_inverse(), TEST_F64_SQ));
    }
}

#[test]
fn invert_into_the_original_buffer() {
    for mut solver in solvers() {
        let mut a = worked_a();
        assert!(solver.set_a(&a));
        solver.invert(&mut a).unwrap();
        assert!(is_identical(&a, &expected_inverse(), TEST_F64_SQ));
    }
}

#[test]
fn random_complex_systems() {
    let mut rng = StdRng::seed_from_u64(99);
    for n in [1, 4, 9] {
        let a: DenseMatrix<Complex<f64>> = random::hermitian_pos_def(n, &mut rng);
        let b: DenseMatrix<Complex<f64>> = random::rectangular(n, 3, -1.0, 1.0, &mut rng);
        for lower in [true, false] {
            let mut solver = LinearSolverChol::new(lower);
            assert!(solver.set_a(&a));
            let mut x = DenseMatrix::zeros(n, 3);
            solver.solve(&b, &mut x).unwrap();
            assert!(is_identical(&(&a * &x), &b, 1e-9));
            assert!(solver.quality() > 0.0 && solver.quality() <= 1.0);
        }
    }
}

#[test]
fn not_positive_definite_is_reported() {
    let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, -1.0, -1.0, -2.0]);
    for mut solver in solvers() {
        assert!(!solver.set_a(&a));
        let mut x = DenseMatrix::zeros(2, 1);
        assert!(solver.solve(&DenseMatrix::zeros(2, 1), &mut x).is_err());
    }
}
