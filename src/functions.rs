//! Named matrix functions for an expression evaluator.
//!
//! A [`FunctionRegistry`] maps names to callables over [`Value`] operands.
//! [`FunctionRegistry::with_builtins`] provides:
//!
//! | name      | operands                          | result                     |
//! |-----------|-----------------------------------|----------------------------|
//! | `inv`     | square matrix or scalar           | inverse                    |
//! | `pinv`    | matrix or scalar                  | Moore-Penrose inverse      |
//! | `eye`     | scalar `n`, or a matrix           | identity of that shape     |
//! | `det`     | square matrix or scalar           | scalar                     |
//! | `normF`   | matrix or scalar                  | scalar                     |
//! | `trace`   | matrix or scalar                  | scalar                     |
//! | `kron`    | two matrices                      | Kronecker product          |
//! | `catV`    | one or more matrices              | vertical concatenation     |
//! | `catH`    | one or more matrices              | horizontal concatenation   |
//! | `extract` | matrix, `row0, row1, col0, col1`  | sub-matrix (ends exclusive)|
//!
//! Scalars are treated as `1 x 1` matrices by the concatenation functions.

use std::collections::HashMap;

use num_traits::Zero;

use crate::dense::DenseMatrix;
use crate::linalg::{Decomposition, LinalgError, LuDecomposition, QrDecomposition, QrHouseholder};
use crate::traits::LinalgScalar;

/// Largest element count a named function will allocate from a scalar
/// operand.
pub const MAX_ELEMENTS: usize = 1 << 28;

/// Operand or result of a named function.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T> {
    Matrix(DenseMatrix<T>),
    Scalar(T),
}

impl<T: LinalgScalar> Value<T> {
    /// Shape, with scalars reported as `1 x 1`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Value::Matrix(m) => m.shape(),
            Value::Scalar(_) => (1, 1),
        }
    }

    /// Matrix view, promoting a scalar to `1 x 1`.
    pub fn to_matrix(&self) -> DenseMatrix<T> {
        match self {
            Value::Matrix(m) => m.clone(),
            Value::Scalar(s) => DenseMatrix::fill(1, 1, *s),
        }
    }

    pub fn as_scalar(&self) -> Option<T> {
        match self {
            Value::Scalar(s) => Some(*s),
            Value::Matrix(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&DenseMatrix<T>> {
        match self {
            Value::Matrix(m) => Some(m),
            Value::Scalar(_) => None,
        }
    }
}

impl<T> From<DenseMatrix<T>> for Value<T> {
    fn from(m: DenseMatrix<T>) -> Self {
        Value::Matrix(m)
    }
}

type SingleFn<T> = Box<dyn Fn(&Value<T>) -> Result<Value<T>, LinalgError>>;
type MultiFn<T> = Box<dyn Fn(&[Value<T>]) -> Result<Value<T>, LinalgError>>;

/// Name-to-function lookup for single-operand and N-operand functions.
///
/// ```
/// use densela::DenseMatrix;
/// use densela::functions::{FunctionRegistry, Value};
///
/// let reg = FunctionRegistry::<f64>::with_builtins();
/// assert!(reg.is_function_name("kron"));
///
/// let a = DenseMatrix::from_rows(2, 2, &[4.0, 7.0, 2.0, 6.0]);
/// let det = reg.call("det", &[Value::Matrix(a)]).unwrap();
/// assert!((det.as_scalar().unwrap() - 10.0).abs() < 1e-12);
///
/// let eye = reg.call("eye", &[Value::Scalar(3.0)]).unwrap();
/// assert_eq!(eye.shape(), (3, 3));
/// assert!(reg.call("nope", &[]).is_err());
/// ```
pub struct FunctionRegistry<T> {
    single: HashMap<String, SingleFn<T>>,
    multi: HashMap<String, MultiFn<T>>,
}

impl<T> Default for FunctionRegistry<T> {
    fn default() -> Self {
        Self {
            single: HashMap::new(),
            multi: HashMap::new(),
        }
    }
}

impl<T> core::fmt::Debug for FunctionRegistry<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry").field("names", &names).finish()
    }
}

impl<T> FunctionRegistry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_single(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&Value<T>) -> Result<Value<T>, LinalgError> + 'static,
    ) {
        self.single.insert(name.into(), Box::new(f));
    }

    pub fn register_multi(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value<T>]) -> Result<Value<T>, LinalgError> + 'static,
    ) {
        self.multi.insert(name.into(), Box::new(f));
    }

    pub fn is_function_name(&self, name: &str) -> bool {
        self.single.contains_key(name) || self.multi.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.single.keys().chain(self.multi.keys()).map(String::as_str)
    }

    /// Evaluate `name` on `args`.
    ///
    /// Single-operand functions require exactly one argument.
    pub fn call(&self, name: &str, args: &[Value<T>]) -> Result<Value<T>, LinalgError> {
        if let Some(f) = self.single.get(name) {
            return match args {
                [arg] => f(arg),
                _ => Err(LinalgError::InvalidArgument(format!(
                    "{} takes one operand, got {}",
                    name,
                    args.len()
                ))),
            };
        }
        if let Some(f) = self.multi.get(name) {
            return f(args);
        }
        Err(LinalgError::UnknownFunction(name.to_string()))
    }
}

impl<T: LinalgScalar + 'static> FunctionRegistry<T> {
    /// Registry holding the built-in functions listed in the module docs.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register_single("inv", |v| match v {
            Value::Matrix(m) => inv(m).map(Value::Matrix),
            Value::Scalar(s) => scalar_inverse(*s).map(Value::Scalar),
        });
        reg.register_single("pinv", |v| match v {
            Value::Matrix(m) => pinv(m).map(Value::Matrix),
            Value::Scalar(s) => Ok(Value::Scalar(if s.modulus() == <T::Real as Zero>::zero() {
                T::zero()
            } else {
                T::one() / *s
            })),
        });
        reg.register_single("eye", |v| match v {
            Value::Matrix(m) => Ok(Value::Matrix(DenseMatrix::eye(m.nrows(), m.ncols()))),
            Value::Scalar(s) => {
                let n = scalar_index(*s, "eye")?;
                match n.checked_mul(n) {
                    Some(len) if len <= MAX_ELEMENTS => {
                        Ok(Value::Matrix(DenseMatrix::identity(n)))
                    }
                    _ => Err(LinalgError::InvalidArgument(format!(
                        "eye({}) exceeds {} elements",
                        n, MAX_ELEMENTS
                    ))),
                }
            }
        });
        reg.register_single("det", |v| match v {
            Value::Matrix(m) => det(m).map(Value::Scalar),
            Value::Scalar(s) => Ok(Value::Scalar(*s)),
        });
        reg.register_single("normF", |v| match v {
            Value::Matrix(m) => Ok(Value::Scalar(T::from_real(m.norm_f()))),
            Value::Scalar(s) => Ok(Value::Scalar(T::from_real(s.modulus()))),
        });
        reg.register_single("trace", |v| match v {
            Value::Matrix(m) => Ok(Value::Scalar(m.trace())),
            Value::Scalar(s) => Ok(Value::Scalar(*s)),
        });

        reg.register_multi("kron", |args| match args {
            [a, b] => Ok(Value::Matrix(a.to_matrix().kron(&b.to_matrix()))),
            _ => Err(operand_count("kron", "2", args.len())),
        });
        reg.register_multi("catV", |args| {
            let parts: Vec<DenseMatrix<T>> = args.iter().map(Value::to_matrix).collect();
            let refs: Vec<&DenseMatrix<T>> = parts.iter().collect();
            DenseMatrix::cat_v(&refs).map(Value::Matrix)
        });
        reg.register_multi("catH", |args| {
            let parts: Vec<DenseMatrix<T>> = args.iter().map(Value::to_matrix).collect();
            let refs: Vec<&DenseMatrix<T>> = parts.iter().collect();
            DenseMatrix::cat_h(&refs).map(Value::Matrix)
        });
        reg.register_multi("extract", |args| match args {
            [Value::Matrix(m), r0, r1, c0, c1] => {
                let mut idx = [0usize; 4];
                for (slot, v) in idx.iter_mut().zip([r0, r1, c0, c1]) {
                    let s = v.as_scalar().ok_or_else(|| {
                        LinalgError::InvalidArgument("extract bounds must be scalars".into())
                    })?;
                    *slot = scalar_index(s, "extract")?;
                }
                m.extract(idx[0], idx[1], idx[2], idx[3]).map(Value::Matrix)
            }
            _ => Err(operand_count("extract", "a matrix and 4 scalars", args.len())),
        });
        reg
    }

    /// Result shape of `name` for operands of the given shapes, without
    /// evaluating. Scalars are `1 x 1`.
    ///
    /// `extract` and `eye` of a scalar depend on operand values, so their
    /// shape cannot be predicted here.
    pub fn output_shape(
        &self,
        name: &str,
        shapes: &[(usize, usize)],
    ) -> Result<(usize, usize), LinalgError> {
        if !self.is_function_name(name) {
            return Err(LinalgError::UnknownFunction(name.to_string()));
        }
        let one = |s: &[(usize, usize)]| match s {
            [x] => Ok(*x),
            _ => Err(operand_count(name, "1", s.len())),
        };
        match name {
            "inv" => {
                let (m, n) = one(shapes)?;
                if m != n {
                    return Err(LinalgError::NotSquare);
                }
                Ok((m, n))
            }
            "pinv" => one(shapes).map(|(m, n)| (n, m)),
            "det" => match one(shapes)? {
                (m, n) if m != n => Err(LinalgError::NotSquare),
                _ => Ok((1, 1)),
            },
            "normF" | "trace" => one(shapes).map(|_| (1, 1)),
            "eye" => match one(shapes)? {
                (1, 1) => Err(LinalgError::InvalidArgument(
                    "eye of a scalar depends on its value".into(),
                )),
                s => Ok(s),
            },
            "kron" => match shapes {
                [(m1, n1), (m2, n2)] => match (m1.checked_mul(*m2), n1.checked_mul(*n2)) {
                    (Some(m), Some(n)) => Ok((m, n)),
                    _ => Err(LinalgError::InvalidArgument("kron shape overflows".into())),
                },
                _ => Err(operand_count(name, "2", shapes.len())),
            },
            "catV" => concat_shape(shapes, true),
            "catH" => concat_shape(shapes, false),
            _ => Err(LinalgError::InvalidArgument(format!(
                "no shape rule for {}",
                name
            ))),
        }
    }
}

fn operand_count(name: &str, expected: &str, got: usize) -> LinalgError {
    LinalgError::InvalidArgument(format!("{} takes {} operands, got {}", name, expected, got))
}

fn concat_shape(shapes: &[(usize, usize)], vertical: bool) -> Result<(usize, usize), LinalgError> {
    let (&first, rest) = shapes
        .split_first()
        .ok_or_else(|| LinalgError::InvalidArgument("concatenation needs an operand".into()))?;
    let mut acc = first;
    for &(m, n) in rest {
        if vertical {
            if n != acc.1 {
                return Err(LinalgError::DimensionMismatch {
                    expected: (m, acc.1),
                    got: (m, n),
                });
            }
            acc.0 += m;
        } else {
            if m != acc.0 {
                return Err(LinalgError::DimensionMismatch {
                    expected: (acc.0, n),
                    got: (m, n),
                });
            }
            acc.1 += n;
        }
    }
    Ok(acc)
}

/// Interpret a scalar operand as a non-negative integer index no larger than
/// [`MAX_ELEMENTS`].
fn scalar_index<T: LinalgScalar>(s: T, name: &str) -> Result<usize, LinalgError> {
    let v = T::real_to_f64(s.re());
    let in_range = v >= 0.0 && v <= MAX_ELEMENTS as f64;
    if !in_range || v.fract() != 0.0 || T::real_to_f64(s.im()) != 0.0 {
        return Err(LinalgError::InvalidArgument(format!(
            "{} expects a non-negative integer, got {:?}",
            name, s
        )));
    }
    Ok(v as usize)
}

fn scalar_inverse<T: LinalgScalar>(s: T) -> Result<T, LinalgError> {
    if s.modulus() == <T::Real as Zero>::zero() {
        return Err(LinalgError::Singular);
    }
    Ok(T::one() / s)
}

/// Inverse of a square matrix via LU.
pub fn inv<T: LinalgScalar>(a: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
    Ok(LuDecomposition::new(a)?.inverse())
}

/// Determinant via LU. A singular matrix has determinant zero.
pub fn det<T: LinalgScalar>(a: &DenseMatrix<T>) -> Result<T, LinalgError> {
    match LuDecomposition::new(a) {
        Ok(lu) => Ok(lu.det()),
        Err(LinalgError::Singular) => Ok(T::zero()),
        Err(e) => Err(e),
    }
}

/// Moore-Penrose inverse of a full-rank matrix via QR.
///
/// Tall or square: `R^-1 * Q^H`. Wide: `pinv(A^H)^H`. Fails with
/// [`LinalgError::Singular`] when some `|R[i,i]|` is within `max(m, n) * eps`
/// of the largest one.
pub fn pinv<T: LinalgScalar>(a: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
    if a.nrows() < a.ncols() {
        return Ok(pinv(&a.conj_transpose())?.conj_transpose());
    }
    let mut qr = QrHouseholder::new();
    if !qr.decompose(&mut a.clone()) {
        return Err(LinalgError::Singular);
    }

    let r = qr.get_r(true)?;
    let n = r.ncols();
    let diag: Vec<T::Real> = (0..n).map(|i| r[(i, i)].modulus()).collect();
    let largest = diag
        .iter()
        .copied()
        .fold(<T::Real as Zero>::zero(), |acc, d| if d > acc { d } else { acc });
    let threshold = largest * T::lepsilon() * T::real_from_f64(a.nrows() as f64);
    if diag.iter().any(|&d| !(d > threshold)) {
        return Err(LinalgError::Singular);
    }

    qr.solve(&DenseMatrix::identity(a.nrows()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::features::is_identical;

    fn reg() -> FunctionRegistry<f64> {
        FunctionRegistry::with_builtins()
    }

    fn m(rows: usize, cols: usize, data: &[f64]) -> Value<f64> {
        Value::Matrix(DenseMatrix::from_rows(rows, cols, data))
    }

    #[test]
    fn inverse_and_scalar_inverse() {
        let r = reg();
        let out = r.call("inv", &[m(2, 2, &[4.0, 7.0, 2.0, 6.0])]).unwrap();
        let expected = DenseMatrix::from_rows(2, 2, &[0.6, -0.7, -0.2, 0.4]);
        assert!(is_identical(out.as_matrix().unwrap(), &expected, 1e-12));
        assert_eq!(r.call("inv", &[Value::Scalar(4.0)]).unwrap(), Value::Scalar(0.25));
        assert_eq!(
            r.call("inv", &[Value::Scalar(0.0)]).unwrap_err(),
            LinalgError::Singular
        );
        assert_eq!(
            r.call("inv", &[m(1, 2, &[1.0, 2.0])]).unwrap_err(),
            LinalgError::NotSquare
        );
    }

    #[test]
    fn pinv_tall_and_wide() {
        let r = reg();
        let tall = DenseMatrix::from_rows(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let p = r.call("pinv", &[Value::Matrix(tall.clone())]).unwrap();
        let p = p.as_matrix().unwrap();
        assert_eq!(p.shape(), (2, 3));
        assert!(is_identical(&(p * &tall), &DenseMatrix::identity(2), 1e-12));

        let wide = tall.transpose();
        let p = pinv(&wide).unwrap();
        assert!(is_identical(&(&wide * &p), &DenseMatrix::identity(2), 1e-12));
    }

    #[test]
    fn pinv_rank_deficient_is_singular() {
        let r = reg();
        let tall = m(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        assert_eq!(r.call("pinv", &[tall]).unwrap_err(), LinalgError::Singular);
        let wide = DenseMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        assert_eq!(pinv(&wide).unwrap_err(), LinalgError::Singular);
        assert_eq!(pinv(&DenseMatrix::<f64>::zeros(2, 2)).unwrap_err(), LinalgError::Singular);
    }

    #[test]
    fn inv_and_det_ignore_scale() {
        let r = reg();
        let tiny = Value::Matrix(DenseMatrix::<f64>::identity(2).scale(1e-17));
        let d = r.call("det", &[tiny.clone()]).unwrap().as_scalar().unwrap();
        assert!((d - 1e-34).abs() < 1e-46);
        let i = r.call("inv", &[tiny]).unwrap();
        let expected = DenseMatrix::<f64>::identity(2).scale(1e17);
        assert!(is_identical(i.as_matrix().unwrap(), &expected, 1e5));
    }

    #[test]
    fn det_of_singular_is_zero() {
        let r = reg();
        let d = r.call("det", &[m(2, 2, &[1.0, 2.0, 2.0, 4.0])]).unwrap();
        assert_eq!(d, Value::Scalar(0.0));
    }

    #[test]
    fn norm_trace_eye() {
        let r = reg();
        let a = m(2, 2, &[3.0, 0.0, 0.0, 4.0]);
        assert_eq!(r.call("trace", &[a.clone()]).unwrap(), Value::Scalar(7.0));
        let n = r.call("normF", &[a.clone()]).unwrap().as_scalar().unwrap();
        assert!((n - 5.0).abs() < 1e-12);
        let e = r.call("eye", &[m(2, 3, &[0.0; 6])]).unwrap();
        assert_eq!(e, Value::Matrix(DenseMatrix::eye(2, 3)));
        assert!(r.call("eye", &[Value::Scalar(-1.0)]).is_err());
        assert!(r.call("eye", &[Value::Scalar(1.5)]).is_err());
        for huge in [1e12, 1e300, f64::INFINITY, f64::NAN, 1e5] {
            assert!(matches!(
                r.call("eye", &[Value::Scalar(huge)]).unwrap_err(),
                LinalgError::InvalidArgument(_)
            ));
        }
    }

    #[test]
    fn multi_input_functions() {
        let r = reg();
        let a = m(1, 2, &[1.0, 2.0]);
        let b = m(1, 2, &[3.0, 4.0]);
        let v = r.call("catV", &[a.clone(), b.clone()]).unwrap();
        assert_eq!(v.shape(), (2, 2));
        let h = r.call("catH", &[a.clone(), Value::Scalar(9.0)]).unwrap();
        assert_eq!(h, m(1, 3, &[1.0, 2.0, 9.0]));
        let k = r.call("kron", &[a.clone(), b.clone()]).unwrap();
        assert_eq!(k, m(1, 4, &[3.0, 4.0, 6.0, 8.0]));
        assert!(r.call("kron", &[a.clone()]).is_err());

        let big = Value::Matrix(DenseMatrix::from_fn(4, 4, |i, j| (i * 4 + j) as f64));
        let sub = r
            .call(
                "extract",
                &[big, Value::Scalar(1.0), Value::Scalar(3.0), Value::Scalar(0.0), Value::Scalar(2.0)],
            )
            .unwrap();
        assert_eq!(sub, m(2, 2, &[4.0, 5.0, 8.0, 9.0]));
    }

    #[test]
    fn operand_errors() {
        let r = reg();
        assert_eq!(
            r.call("frobnicate", &[]).unwrap_err(),
            LinalgError::UnknownFunction("frobnicate".into())
        );
        assert!(matches!(
            r.call("inv", &[]).unwrap_err(),
            LinalgError::InvalidArgument(_)
        ));
        assert!(r.call("extract", &[Value::Scalar(1.0)]).is_err());
    }

    #[test]
    fn user_functions() {
        let mut r = reg();
        assert!(!r.is_function_name("double"));
        r.register_single("double", |v| match v {
            Value::Matrix(m) => Ok(Value::Matrix(m.scale(2.0))),
            Value::Scalar(s) => Ok(Value::Scalar(s * 2.0)),
        });
        assert!(r.is_function_name("double"));
        assert_eq!(r.call("double", &[Value::Scalar(2.5)]).unwrap(), Value::Scalar(5.0));
    }

    #[test]
    fn shapes_without_evaluation() {
        let r = reg();
        assert_eq!(r.output_shape("pinv", &[(3, 2)]).unwrap(), (2, 3));
        assert_eq!(r.output_shape("kron", &[(2, 3), (4, 5)]).unwrap(), (8, 15));
        assert_eq!(r.output_shape("catV", &[(1, 2), (3, 2)]).unwrap(), (4, 2));
        assert_eq!(r.output_shape("catH", &[(2, 1), (2, 2)]).unwrap(), (2, 3));
        assert_eq!(r.output_shape("det", &[(3, 3)]).unwrap(), (1, 1));
        assert_eq!(r.output_shape("det", &[(2, 3)]).unwrap_err(), LinalgError::NotSquare);
        assert_eq!(
            r.call("det", &[m(2, 3, &[0.0; 6])]).unwrap_err(),
            LinalgError::NotSquare
        );
        assert!(r.output_shape("catH", &[(2, 1), (3, 2)]).is_err());
        assert!(r.output_shape("inv", &[(2, 3)]).is_err());
        assert!(r.output_shape("extract", &[(4, 4), (1, 1), (1, 1), (1, 1), (1, 1)]).is_err());
        assert!(r.output_shape("missing", &[]).is_err());
    }
}
