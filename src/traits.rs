use core::fmt::Debug;
use num_complex::Complex;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, `Complex<f32>`, `Complex<f64>` and the integer types.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for real floating-point matrix elements.
///
/// Implies `LinalgScalar<Real = Self>` since real floats are their own real type.
pub trait FloatScalar: Scalar + Float + LinalgScalar<Real = Self> {}

impl<T: Scalar + Float + LinalgScalar<Real = T>> FloatScalar for T {}

/// Trait for matrix elements that support the decompositions.
///
/// Covers both real floats (`f32`, `f64`) and complex numbers (`Complex<f32>`,
/// `Complex<f64>`). Every kernel in [`crate::linalg`] is written once against
/// this trait; for real types `conj` is the identity and the Hermitian
/// formulas reduce to the symmetric ones.
pub trait LinalgScalar: Scalar {
    /// The real component type (`Self` for reals, `T` for `Complex<T>`).
    type Real: FloatScalar;

    /// Absolute value / modulus: `|z|` for complex, `.abs()` for real.
    fn modulus(self) -> Self::Real;

    /// Squared modulus, `z * conj(z)` without the square root.
    fn modulus_sq(self) -> Self::Real;

    /// Complex conjugate (identity for reals).
    fn conj(self) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Imaginary part (zero for reals).
    fn im(self) -> Self::Real;

    /// Square root.
    fn lsqrt(self) -> Self;

    /// True when every component is finite.
    fn lis_finite(self) -> bool;

    /// Machine epsilon of the underlying real type.
    fn lepsilon() -> Self::Real;

    /// Promote a real value into `Self`.
    fn from_real(r: Self::Real) -> Self;

    /// Widen into a complex number over the real type.
    fn to_complex(self) -> Complex<Self::Real>;

    /// Build from `f64` parts. The imaginary part is dropped for reals.
    fn from_f64_parts(re: f64, im: f64) -> Self;

    /// Convert an `f64` into the real type.
    fn real_from_f64(x: f64) -> Self::Real;

    /// Convert a real value into `f64`.
    fn real_to_f64(x: Self::Real) -> f64;
}

/// Real floats delegate to `Float`.
macro_rules! impl_linalg_scalar_real {
    ($($t:ty),*) => {
        $(
            impl LinalgScalar for $t {
                type Real = $t;

                #[inline] fn modulus(self) -> $t { Float::abs(self) }
                #[inline] fn modulus_sq(self) -> $t { self * self }
                #[inline] fn conj(self) -> $t { self }
                #[inline] fn re(self) -> $t { self }
                #[inline] fn im(self) -> $t { 0.0 }
                #[inline] fn lsqrt(self) -> $t { Float::sqrt(self) }
                #[inline] fn lis_finite(self) -> bool { Float::is_finite(self) }
                #[inline] fn lepsilon() -> $t { <$t as Float>::epsilon() }
                #[inline] fn from_real(r: $t) -> $t { r }
                #[inline] fn to_complex(self) -> Complex<$t> { Complex::new(self, 0.0) }
                #[inline] fn from_f64_parts(re: f64, _im: f64) -> $t { re as $t }
                #[inline] fn real_from_f64(x: f64) -> $t { x as $t }
                #[inline] fn real_to_f64(x: $t) -> f64 { x as f64 }
            }
        )*
    };
}

impl_linalg_scalar_real!(f32, f64);

impl<T: FloatScalar> LinalgScalar for Complex<T> {
    type Real = T;

    #[inline]
    fn modulus(self) -> T {
        self.norm()
    }

    #[inline]
    fn modulus_sq(self) -> T {
        self.norm_sqr()
    }

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline]
    fn re(self) -> T {
        self.re
    }

    #[inline]
    fn im(self) -> T {
        self.im
    }

    #[inline]
    fn lsqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn lis_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    #[inline]
    fn lepsilon() -> T {
        T::epsilon()
    }

    #[inline]
    fn from_real(r: T) -> Self {
        Complex::new(r, T::zero())
    }

    #[inline]
    fn to_complex(self) -> Complex<T> {
        self
    }

    #[inline]
    fn from_f64_parts(re: f64, im: f64) -> Self {
        Complex::new(T::real_from_f64(re), T::real_from_f64(im))
    }

    #[inline]
    fn real_from_f64(x: f64) -> T {
        T::real_from_f64(x)
    }

    #[inline]
    fn real_to_f64(x: T) -> f64 {
        T::real_to_f64(x)
    }
}

/// Read-only access to a matrix-like type.
///
/// Storage is row-major, so a row tail is always a contiguous slice.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;

    /// Contiguous slice `m[row, col_start..ncols]`.
    fn row_as_slice(&self, row: usize, col_start: usize) -> &[T];
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling
/// in-place algorithms (Cholesky, LU, etc.) to work generically.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;

    /// Mutable contiguous slice `m[row, col_start..ncols]`.
    fn row_as_mut_slice(&mut self, row: usize, col_start: usize) -> &mut [T];
}
