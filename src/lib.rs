//! # densela
//!
//! Dense linear algebra over real and complex scalars: Householder-based QR
//! and tridiagonal reductions, Cholesky and LDL factorizations, a Hermitian
//! eigen-decomposition, linear solvers, and a registry of named matrix
//! functions for expression evaluators.
//!
//! ## Quick start
//!
//! ```
//! use densela::DenseMatrix;
//! use densela::linsol::{LinearSolver, LinearSolverChol};
//!
//! // Solve a symmetric positive-definite system A x = b
//! let a = DenseMatrix::from_rows(3, 3, &[
//!     1.0_f64, 2.0, 4.0,
//!     2.0, 13.0, 23.0,
//!     4.0, 23.0, 90.0,
//! ]);
//! let b = DenseMatrix::column(&[17.0, 97.0, 320.0]);
//!
//! let mut solver = LinearSolverChol::new(true);
//! assert!(solver.set_a(&a));
//! let mut x = DenseMatrix::zeros(3, 1);
//! solver.solve(&b, &mut x).unwrap(); // x = [1, 2, 3]
//! assert!((x[(2, 0)] - 3.0).abs() < 1e-10);
//! ```
//!
//! ## Modules
//!
//! - [`dense`]: Heap-allocated `DenseMatrix<T>` with runtime dimensions and
//!   row-major `Vec<T>` storage. Arithmetic, norms, block operations
//!   (`extract`, `kron`, `cat_v`, `cat_h`) and structural predicates in
//!   [`dense::features`].
//!
//! - [`linalg`]: The Householder reflector kernel and the decompositions
//!   built on it: [`linalg::QrHouseholder`], [`linalg::TridiagonalHouseholder`],
//!   plus [`linalg::CholeskyInner`] (lower or upper), [`linalg::CholeskyLdl`]
//!   and [`linalg::LuDecomposition`]. Each decomposition implements
//!   [`linalg::Decomposition`] and one of the family traits, whose extractors
//!   either fill a caller buffer (`get_x_into`) or allocate (`get_x`).
//!   [`linalg::SymmetricEvd`] wraps tridiagonalization and implicit QR.
//!
//! - [`linsol`]: [`linsol::LinearSolver`] over the Cholesky-type
//!   factorizations: solve, invert, and a conditioning estimate.
//!
//! - [`functions`]: [`functions::FunctionRegistry`] of named functions
//!   (`inv`, `pinv`, `det`, `trace`, `normF`, `eye`, `kron`, `catV`, `catH`,
//!   `extract`) over matrix and scalar operands.
//!
//! - [`check`]: Property checks any implementation of the decomposition
//!   traits can be run through, for any scalar type.
//!
//! - [`config`]: Comparison tolerances for `f32` and `f64`.
//!
//! - [`random`]: Random rectangular, Hermitian and positive-definite test
//!   matrices.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`]: real floats (`f32`, `f64`)
//!   - [`LinalgScalar`]: real floats and complex numbers, used by decompositions and norms
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access for kernels
//!
//! ## Complex matrices
//!
//! Every decomposition works with `Complex<f32>` / `Complex<f64>`. Cholesky
//! generalizes to Hermitian (A = LL^H), reflectors are complex, and norms
//! return real values.
//!
//! ## Logging
//!
//! Failures and iteration counts are reported through `tracing` (`debug!` on
//! a failed decomposition, `warn!` when the eigen-decomposition gives up,
//! `trace!` for per-step detail). The crate never installs a subscriber.

pub mod check;
pub mod config;
pub mod dense;
pub mod functions;
pub mod linalg;
pub mod linsol;
pub mod random;
pub mod traits;

pub use dense::DenseMatrix;
pub use linalg::LinalgError;
pub use traits::{FloatScalar, LinalgScalar, MatrixMut, MatrixRef, Scalar};

pub use num_complex::Complex;
