use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

use densela::linalg::{
    CholeskyInner, CholeskyLdl, Decomposition, QrHouseholder, SymmetricEvd,
    TridiagonalHouseholder,
};
use densela::linsol::{LinearSolver, LinearSolverChol};
use densela::{random, DenseMatrix};

const SIZES: [usize; 3] = [8, 32, 96];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn spd(n: usize) -> DenseMatrix<f64> {
    random::hermitian_pos_def(n, &mut StdRng::seed_from_u64(n as u64))
}

fn symmetric(n: usize) -> DenseMatrix<f64> {
    random::hermitian(n, -1.0, 1.0, &mut StdRng::seed_from_u64(n as u64))
}

// ---------------------------------------------------------------------------
// Decompositions
// ---------------------------------------------------------------------------

fn qr(c: &mut Criterion) {
    let mut g = c.benchmark_group("qr");
    for n in SIZES {
        let a: DenseMatrix<f64> =
            random::rectangular(2 * n, n, -1.0, 1.0, &mut StdRng::seed_from_u64(1));
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            let mut alg = QrHouseholder::new();
            b.iter(|| alg.decompose(&mut black_box(a.clone())))
        });
    }
    g.finish();
}

fn cholesky(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky");
    for n in SIZES {
        let a = spd(n);
        g.bench_with_input(BenchmarkId::new("inner_lower", n), &a, |b, a| {
            let mut alg = CholeskyInner::new(true);
            b.iter(|| alg.decompose(&mut black_box(a.clone())))
        });
        g.bench_with_input(BenchmarkId::new("inner_upper", n), &a, |b, a| {
            let mut alg = CholeskyInner::new(false);
            b.iter(|| alg.decompose(&mut black_box(a.clone())))
        });
        g.bench_with_input(BenchmarkId::new("ldl", n), &a, |b, a| {
            let mut alg = CholeskyLdl::new();
            b.iter(|| alg.decompose(&mut black_box(a.clone())))
        });
    }
    g.finish();
}

fn tridiagonal(c: &mut Criterion) {
    let mut g = c.benchmark_group("tridiagonal");
    for n in SIZES {
        let a = symmetric(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            let mut alg = TridiagonalHouseholder::new();
            b.iter(|| alg.decompose(&mut black_box(a.clone())))
        });
    }
    g.finish();
}

fn eigen(c: &mut Criterion) {
    let mut g = c.benchmark_group("symmetric_evd");
    for n in SIZES {
        let a = symmetric(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| SymmetricEvd::new(black_box(a)))
        });
    }
    g.finish();
}

// ---------------------------------------------------------------------------
// Linear solve
// ---------------------------------------------------------------------------

fn solve(c: &mut Criterion) {
    let mut g = c.benchmark_group("solve_chol");
    for n in SIZES {
        let a = spd(n);
        let rhs: DenseMatrix<f64> =
            random::rectangular(n, 4, -1.0, 1.0, &mut StdRng::seed_from_u64(2));
        let mut solver = LinearSolverChol::new(true);
        if !solver.set_a(&a) {
            continue;
        }
        g.bench_with_input(BenchmarkId::from_parameter(n), &rhs, |b, rhs| {
            let mut x = DenseMatrix::zeros(n, 4);
            b.iter(|| solver.solve(black_box(rhs), &mut x))
        });
    }
    g.finish();
}

criterion_group!(benches, qr, cholesky, tridiagonal, eigen, solve);
criterion_main!(benches);
