//! Numeric tolerances shared by the correctness checks, tests and benches.
//!
//! Two tolerances are used everywhere: a tight one for element-wise equality
//! and a loose one for quantities whose error grows with the matrix size
//! (orthogonality, products of several factors). Call sites take a
//! [`Tolerance`] value instead of hard-coding a literal.

/// Tight tolerance for `f64` comparisons.
pub const TEST_F64: f64 = 1e-8;

/// Loose tolerance for `f64` comparisons (square root of [`TEST_F64`]).
pub const TEST_F64_SQ: f64 = 1e-4;

/// Tight tolerance for `f32` comparisons.
pub const TEST_F32: f64 = 1e-4;

/// Loose tolerance for `f32` comparisons.
pub const TEST_F32_SQ: f64 = 1e-2;

/// Pair of comparison tolerances.
///
/// ```
/// use densela::config::Tolerance;
///
/// let tol = Tolerance::F64;
/// assert_eq!(tol.tight, 1e-8);
/// assert!(tol.scaled(20) > tol.loose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Used for element-wise equality of directly computed values.
    pub tight: f64,
    /// Used for products of factors and orthogonality checks.
    pub loose: f64,
}

impl Tolerance {
    /// Presets for double precision.
    pub const F64: Tolerance = Tolerance {
        tight: TEST_F64,
        loose: TEST_F64_SQ,
    };

    /// Presets for single precision.
    pub const F32: Tolerance = Tolerance {
        tight: TEST_F32,
        loose: TEST_F32_SQ,
    };

    pub fn new(tight: f64, loose: f64) -> Self {
        Self { tight, loose }
    }

    /// Loose tolerance scaled linearly with the matrix dimension `n`.
    pub fn scaled(&self, n: usize) -> f64 {
        self.loose * n.max(1) as f64
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::F64
    }
}
