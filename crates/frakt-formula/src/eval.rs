//! Tree-walking evaluator over `Complex64`.
//!
//! Every arithmetic step is checked: a non-finite intermediate is reported
//! as `Overflow`, division/modulo by zero as `DivisionByZero`, and
//! out-of-domain function inputs as `Domain`. The evaluator itself never
//! panics and carries no state, so one compiled formula can be evaluated
//! from any number of worker threads concurrently.

use num_complex::Complex64;

use crate::ast::{BinaryOp, Expr, Func, UnaryOp, Variable};
use crate::error::EvalError;

pub(crate) fn evaluate(expr: &Expr, z: Complex64, c: Complex64, n: u32) -> Result<Complex64, EvalError> {
    let value = eval_node(expr, z, c, n)?;
    ensure_finite(value)
}

fn eval_node(expr: &Expr, z: Complex64, c: Complex64, n: u32) -> Result<Complex64, EvalError> {
    match expr {
        Expr::Number(v) => Ok(Complex64::new(*v, 0.0)),
        Expr::Var(var) => Ok(match var {
            Variable::Z => z,
            Variable::C => c,
            Variable::N => Complex64::new(f64::from(n), 0.0),
            Variable::Pi => Complex64::new(std::f64::consts::PI, 0.0),
            Variable::E => Complex64::new(std::f64::consts::E, 0.0),
            Variable::I | Variable::J => Complex64::new(0.0, 1.0),
        }),
        Expr::Unary { op, operand } => {
            let v = eval_node(operand, z, c, n)?;
            Ok(match op {
                UnaryOp::Neg => -v,
                UnaryOp::Pos => v,
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let a = eval_node(lhs, z, c, n)?;
            let b = eval_node(rhs, z, c, n)?;
            eval_binary(*op, a, b)
        }
        Expr::Call { func, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_node(arg, z, c, n)?);
            }
            eval_call(*func, &values)
        }
    }
}

fn eval_binary(op: BinaryOp, a: Complex64, b: Complex64) -> Result<Complex64, EvalError> {
    let out = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == Complex64::new(0.0, 0.0) {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Rem => return real_modulo(a, b),
        BinaryOp::Pow => return complex_pow(a, b),
    };
    ensure_finite(out)
}

/// `%` is defined for real-valued operands only, with Python's floored
/// semantics (result takes the sign of the divisor). Complex operands are a
/// domain error.
fn real_modulo(a: Complex64, b: Complex64) -> Result<Complex64, EvalError> {
    if a.im != 0.0 || b.im != 0.0 {
        return Err(EvalError::Domain);
    }
    if b.re == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    let r = a.re - b.re * (a.re / b.re).floor();
    ensure_finite(Complex64::new(r, 0.0))
}

/// Exponentiation with the special cases a general `exp(b ln a)` gets wrong:
/// zero bases, and small integer exponents (`z**2` must be exact repeated
/// multiplication, not a log/exp round trip).
fn complex_pow(base: Complex64, exp: Complex64) -> Result<Complex64, EvalError> {
    let zero = Complex64::new(0.0, 0.0);
    if exp.im == 0.0 {
        let p = exp.re;
        if base == zero {
            if p > 0.0 {
                return Ok(zero);
            }
            if p == 0.0 {
                return Ok(Complex64::new(1.0, 0.0));
            }
            return Err(EvalError::DivisionByZero);
        }
        if p.fract() == 0.0 && p.abs() <= 64.0 {
            return ensure_finite(base.powi(p as i32));
        }
        return ensure_finite(base.powf(p));
    }
    if base == zero {
        return Err(EvalError::DivisionByZero);
    }
    ensure_finite(base.powc(exp))
}

fn eval_call(func: Func, args: &[Complex64]) -> Result<Complex64, EvalError> {
    let one = |f: fn(Complex64) -> Complex64| ensure_finite(f(args[0]));
    match func {
        Func::Sin => one(|v| v.sin()),
        Func::Cos => one(|v| v.cos()),
        Func::Tan => one(|v| v.tan()),
        Func::Sinh => one(|v| v.sinh()),
        Func::Cosh => one(|v| v.cosh()),
        Func::Tanh => one(|v| v.tanh()),
        Func::Asin => one(|v| v.asin()),
        Func::Acos => one(|v| v.acos()),
        Func::Atan => one(|v| v.atan()),
        Func::Asinh => one(|v| v.asinh()),
        Func::Acosh => one(|v| v.acosh()),
        Func::Atanh => one(|v| v.atanh()),
        Func::Exp => one(|v| v.exp()),
        Func::Log => {
            if args[0] == Complex64::new(0.0, 0.0) {
                return Err(EvalError::Domain);
            }
            ensure_finite(args[0].ln())
        }
        Func::Log10 => {
            if args[0] == Complex64::new(0.0, 0.0) {
                return Err(EvalError::Domain);
            }
            ensure_finite(args[0].log10())
        }
        Func::Sqrt => one(|v| v.sqrt()),
        Func::Abs => Ok(Complex64::new(args[0].norm(), 0.0)),
        Func::Conj => Ok(args[0].conj()),
        Func::Real => Ok(Complex64::new(args[0].re, 0.0)),
        Func::Imag => Ok(Complex64::new(args[0].im, 0.0)),
        Func::Phase => Ok(Complex64::new(args[0].arg(), 0.0)),
        // polar packs (r, theta) into one complex value; rect undoes it.
        Func::Polar => Ok(Complex64::new(args[0].norm(), args[0].arg())),
        Func::Rect => {
            let (r, theta) = (args[0], args[1]);
            if r.im != 0.0 || theta.im != 0.0 {
                return Err(EvalError::Domain);
            }
            ensure_finite(Complex64::from_polar(r.re, theta.re))
        }
        Func::Floor => one(|v| Complex64::new(v.re.floor(), v.im.floor())),
        Func::Ceil => one(|v| Complex64::new(v.re.ceil(), v.im.ceil())),
        Func::Round => one(|v| Complex64::new(v.re.round(), v.im.round())),
        Func::Min => Ok(pick_by_modulus(args, |a, b| a < b)),
        Func::Max => Ok(pick_by_modulus(args, |a, b| a > b)),
    }
}

/// Deterministic min/max over complex arguments: compare by squared
/// modulus, first argument wins ties.
fn pick_by_modulus(args: &[Complex64], better: fn(f64, f64) -> bool) -> Complex64 {
    let mut best = args[0];
    let mut best_norm = best.norm_sqr();
    for &candidate in &args[1..] {
        let norm = candidate.norm_sqr();
        if better(norm, best_norm) {
            best = candidate;
            best_norm = norm;
        }
    }
    best
}

fn ensure_finite(v: Complex64) -> Result<Complex64, EvalError> {
    if v.re.is_finite() && v.im.is_finite() {
        Ok(v)
    } else {
        Err(EvalError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;

    fn eval(src: &str, z: Complex64, c: Complex64, n: u32) -> Result<Complex64, EvalError> {
        compile(src).expect("formula compiles").evaluate(z, c, n)
    }

    const ZERO: Complex64 = Complex64::new(0.0, 0.0);

    #[test]
    fn mandelbrot_step() {
        let z = Complex64::new(1.0, 1.0);
        let c = Complex64::new(0.5, -0.25);
        let out = eval("z**2 + c", z, c, 0).expect("evaluates");
        assert_eq!(out, z * z + c);
    }

    #[test]
    fn zero_base_powers() {
        assert_eq!(eval("z**2", ZERO, ZERO, 0).expect("ok"), ZERO);
        assert_eq!(
            eval("z**0", ZERO, ZERO, 0).expect("ok"),
            Complex64::new(1.0, 0.0)
        );
        assert_eq!(eval("z**-1", ZERO, ZERO, 0), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn division_by_zero_is_typed() {
        assert_eq!(eval("c / z", ZERO, Complex64::new(1.0, 0.0), 0), Err(EvalError::DivisionByZero));
        assert_eq!(eval("1 % z", ZERO, ZERO, 0), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn modulo_follows_floored_semantics() {
        let out = eval("-7 % 3", ZERO, ZERO, 0).expect("ok");
        assert_eq!(out, Complex64::new(2.0, 0.0));
        // complex operands are out of domain
        assert_eq!(eval("z % 2", Complex64::new(1.0, 1.0), ZERO, 0), Err(EvalError::Domain));
    }

    #[test]
    fn log_of_zero_is_domain_error() {
        assert_eq!(eval("log(z)", ZERO, ZERO, 0), Err(EvalError::Domain));
        assert_eq!(eval("log10(z)", ZERO, ZERO, 0), Err(EvalError::Domain));
    }

    #[test]
    fn overflow_is_detected() {
        let huge = Complex64::new(1e308, 0.0);
        assert_eq!(eval("z * z", huge, ZERO, 0), Err(EvalError::Overflow));
        assert_eq!(eval("exp(z)", Complex64::new(1e9, 0.0), ZERO, 0), Err(EvalError::Overflow));
    }

    #[test]
    fn constants_and_counter() {
        let out = eval("n", ZERO, ZERO, 7).expect("ok");
        assert_eq!(out, Complex64::new(7.0, 0.0));
        let out = eval("i * j", ZERO, ZERO, 0).expect("ok");
        assert_eq!(out, Complex64::new(-1.0, 0.0));
        let out = eval("e", ZERO, ZERO, 0).expect("ok");
        assert_eq!(out.re, std::f64::consts::E);
    }

    #[test]
    fn projection_functions() {
        let v = Complex64::new(3.0, -4.0);
        assert_eq!(eval("abs(z)", v, ZERO, 0).expect("ok"), Complex64::new(5.0, 0.0));
        assert_eq!(eval("real(z)", v, ZERO, 0).expect("ok"), Complex64::new(3.0, 0.0));
        assert_eq!(eval("imag(z)", v, ZERO, 0).expect("ok"), Complex64::new(-4.0, 0.0));
        assert_eq!(eval("conj(z)", v, ZERO, 0).expect("ok"), Complex64::new(3.0, 4.0));
    }

    #[test]
    fn polar_and_rect_round_trip() {
        let v = Complex64::new(1.0, 1.0);
        let polar = eval("polar(z)", v, ZERO, 0).expect("ok");
        assert!((polar.re - v.norm()).abs() < 1e-12);
        assert!((polar.im - v.arg()).abs() < 1e-12);

        let back = eval("rect(abs(z), phase(z))", v, ZERO, 0).expect("ok");
        assert!((back - v).norm() < 1e-12);

        // rect with complex arguments is out of domain
        assert_eq!(eval("rect(z, 1)", v, ZERO, 0), Err(EvalError::Domain));
    }

    #[test]
    fn min_max_by_modulus() {
        let z = Complex64::new(3.0, 0.0);
        let c = Complex64::new(0.0, -1.0);
        assert_eq!(eval("min(z, c)", z, c, 0).expect("ok"), c);
        assert_eq!(eval("max(z, c, 1)", z, c, 0).expect("ok"), z);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let compiled = compile("sin(z**2) + c / (z + 1)").expect("compiles");
        let z = Complex64::new(0.3, -0.8);
        let c = Complex64::new(-0.7, 0.2);
        let first = compiled.evaluate(z, c, 5).expect("ok");
        for _ in 0..100 {
            let again = compiled.evaluate(z, c, 5).expect("ok");
            assert_eq!(first.re.to_bits(), again.re.to_bits());
            assert_eq!(first.im.to_bits(), again.im.to_bits());
        }
    }
}
