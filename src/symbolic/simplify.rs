//! Algebraic simplification to a canonical form
//!
//! The canonical form is:
//! - sums are flat, like terms are collected, the numeric term comes first
//!   and the remaining terms follow the [`Expr`] order;
//! - products are flat, carry at most one leading numeric coefficient, never
//!   contain a sum (products distribute over sums), merge equal bases by
//!   adding exponents and merge all `exp` factors into one;
//! - calls on symbol-free arguments are folded to numbers.
//!
//! Integer powers of sums are kept unexpanded. Simplifying a canonical
//! expression returns it unchanged.

use std::collections::BTreeMap;

use crate::symbolic::errors::SymbolicError;
use crate::symbolic::eval::{evaluate, Bindings};
use crate::symbolic::expr::{Expr, Func};

/// Recursion budget used by [`Simplifier::default`]
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Trigonometric values within this many ulps of the argument's magnitude
/// are rounding residue of a zero, e.g. `sin(pi)`
const TRIG_RESIDUE_ULPS: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct Simplifier {
    max_depth: usize,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Simplifier that gives up beyond `max_depth` nested rewrites
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn simplify(&self, expr: &Expr) -> Result<Expr, SymbolicError> {
        self.visit(expr, 0)
    }

    fn guard(&self, depth: usize) -> Result<(), SymbolicError> {
        if depth > self.max_depth {
            Err(SymbolicError::SimplificationDiverged(self.max_depth))
        } else {
            Ok(())
        }
    }

    fn visit(&self, expr: &Expr, depth: usize) -> Result<Expr, SymbolicError> {
        self.guard(depth)?;
        match expr {
            Expr::Num(v) if !v.is_finite() => Err(SymbolicError::NonFiniteLiteral(*v)),
            Expr::Num(v) => Ok(Expr::num(*v)),
            Expr::Const(_) | Expr::Sym(_) => Ok(expr.clone()),
            Expr::Add(terms) => {
                let terms = self.visit_all(terms, depth)?;
                self.add(terms, depth + 1)
            }
            Expr::Mul(factors) => {
                let factors = self.visit_all(factors, depth)?;
                self.mul(factors, depth + 1)
            }
            Expr::Pow(base, exponent) => {
                let base = self.visit(base, depth + 1)?;
                let exponent = self.visit(exponent, depth + 1)?;
                self.pow(base, exponent, depth + 1)
            }
            Expr::Call(func, arg) => {
                let arg = self.visit(arg, depth + 1)?;
                self.call(*func, arg, depth + 1)
            }
        }
    }

    fn visit_all(&self, items: &[Expr], depth: usize) -> Result<Vec<Expr>, SymbolicError> {
        items.iter().map(|e| self.visit(e, depth + 1)).collect()
    }

    /// Sum of canonical terms
    fn add(&self, terms: Vec<Expr>, depth: usize) -> Result<Expr, SymbolicError> {
        self.guard(depth)?;
        let mut constant = 0.0;
        let mut collected: BTreeMap<Expr, f64> = BTreeMap::new();
        let mut stack = terms;
        while let Some(term) = stack.pop() {
            match term {
                Expr::Num(v) => constant += v,
                Expr::Add(inner) => stack.extend(inner),
                other => {
                    let (coeff, rest) = split_coefficient(other);
                    *collected.entry(rest).or_insert(0.0) += coeff;
                }
            }
        }

        let mut out = Vec::with_capacity(collected.len() + 1);
        if constant != 0.0 {
            out.push(Expr::num(constant));
        }
        for (rest, coeff) in collected {
            if coeff != 0.0 {
                out.push(scale(rest, coeff));
            }
        }
        Ok(match out.len() {
            0 => Expr::zero(),
            1 => out.remove(0),
            _ => Expr::Add(out),
        })
    }

    /// Product of canonical factors
    fn mul(&self, factors: Vec<Expr>, depth: usize) -> Result<Expr, SymbolicError> {
        self.guard(depth)?;
        let mut coeff = 1.0;
        let mut exp_args = Vec::new();
        let mut bases: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();
        let mut stack = factors;
        while let Some(factor) = stack.pop() {
            match factor {
                Expr::Num(v) => coeff *= v,
                Expr::Mul(inner) => stack.extend(inner),
                Expr::Call(Func::Exp, arg) => exp_args.push(*arg),
                Expr::Pow(base, exponent) => match *base {
                    Expr::Call(Func::Exp, arg) => {
                        exp_args.push(self.mul(vec![*exponent, *arg], depth + 1)?)
                    }
                    base => bases.entry(base).or_default().push(*exponent),
                },
                other => bases.entry(other).or_default().push(Expr::one()),
            }
        }
        if coeff == 0.0 {
            return Ok(Expr::zero());
        }

        let mut rest = Vec::with_capacity(bases.len() + 1);
        let mut renormalize = false;
        for (base, exponents) in bases {
            let exponent = self.add(exponents, depth + 1)?;
            match self.pow(base, exponent, depth + 1)? {
                Expr::Num(v) => coeff *= v,
                p @ (Expr::Mul(_) | Expr::Call(Func::Exp, _)) => {
                    rest.push(p);
                    renormalize = true;
                }
                p => rest.push(p),
            }
        }
        if !exp_args.is_empty() {
            let arg = self.add(exp_args, depth + 1)?;
            match self.call(Func::Exp, arg, depth + 1)? {
                Expr::Num(v) => coeff *= v,
                e @ Expr::Call(Func::Exp, _) => rest.push(e),
                other => {
                    rest.push(other);
                    renormalize = true;
                }
            }
        }
        if coeff == 0.0 {
            return Ok(Expr::zero());
        }
        if renormalize {
            rest.push(Expr::num(coeff));
            return self.mul(rest, depth + 1);
        }

        // distribute over the first sum, the recursion handles the others
        let (sums, mut others): (Vec<Expr>, Vec<Expr>) =
            rest.into_iter().partition(|f| matches!(f, Expr::Add(_)));
        let mut sums = sums.into_iter();
        if let Some(Expr::Add(terms)) = sums.next() {
            others.extend(sums);
            others.push(Expr::num(coeff));
            let products = terms
                .into_iter()
                .map(|term| {
                    let mut factors = others.clone();
                    factors.push(term);
                    self.mul(factors, depth + 1)
                })
                .collect::<Result<Vec<_>, _>>()?;
            return self.add(products, depth + 1);
        }

        others.sort();
        let mut out = Vec::with_capacity(others.len() + 1);
        if coeff != 1.0 {
            out.push(Expr::num(coeff));
        }
        out.extend(others);
        Ok(match out.len() {
            0 => Expr::one(),
            1 => out.remove(0),
            _ => Expr::Mul(out),
        })
    }

    fn pow(&self, base: Expr, exponent: Expr, depth: usize) -> Result<Expr, SymbolicError> {
        self.guard(depth)?;
        if exponent.is_zero() || base.is_one() {
            return Ok(Expr::one());
        }
        if exponent.is_one() {
            return Ok(base);
        }
        match (base, exponent) {
            (Expr::Num(b), Expr::Num(x)) => {
                if b == 0.0 && x > 0.0 {
                    return Ok(Expr::zero());
                }
                if x.fract() == 0.0 {
                    let value = b.powf(x);
                    if value.is_finite() {
                        return Ok(Expr::num(value));
                    }
                }
                // irrational powers such as sqrt(2) stay exact
                Ok(Expr::pow(Expr::num(b), Expr::num(x)))
            }
            (Expr::Call(Func::Exp, arg), exponent) => {
                let arg = self.mul(vec![exponent, *arg], depth + 1)?;
                self.call(Func::Exp, arg, depth + 1)
            }
            (Expr::Pow(inner, x), exponent) if exponent.as_integer().is_some() => {
                let combined = self.mul(vec![*x, exponent], depth + 1)?;
                self.pow(*inner, combined, depth + 1)
            }
            (Expr::Mul(factors), exponent) if exponent.as_integer().is_some() => {
                let powered = factors
                    .into_iter()
                    .map(|f| self.pow(f, exponent.clone(), depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                self.mul(powered, depth + 1)
            }
            (base, exponent) => Ok(Expr::pow(base, exponent)),
        }
    }

    fn call(&self, func: Func, arg: Expr, depth: usize) -> Result<Expr, SymbolicError> {
        self.guard(depth)?;
        if arg.is_constant() {
            if let Ok(value) = evaluate(&arg, &Bindings::new()) {
                let folded = func.apply(value);
                if folded.is_finite() {
                    return Ok(Expr::num(if trig_residue(func, value, folded) {
                        0.0
                    } else {
                        folded
                    }));
                }
            }
        }
        match (func, arg) {
            (Func::Exp, Expr::Call(Func::Ln, inner)) => Ok(*inner),
            (Func::Ln, Expr::Call(Func::Exp, inner)) => Ok(*inner),
            (Func::Sin | Func::Tan, arg) if has_negative_coefficient(&arg) => {
                let arg = self.mul(vec![Expr::num(-1.0), arg], depth + 1)?;
                Ok(Expr::Mul(vec![Expr::num(-1.0), Expr::call(func, arg)]))
            }
            (Func::Cos, arg) if has_negative_coefficient(&arg) => {
                let arg = self.mul(vec![Expr::num(-1.0), arg], depth + 1)?;
                Ok(Expr::cos(arg))
            }
            (func, arg) => Ok(Expr::call(func, arg)),
        }
    }
}

fn trig_residue(func: Func, arg: f64, folded: f64) -> bool {
    matches!(func, Func::Sin | Func::Cos | Func::Tan)
        && folded.abs() <= TRIG_RESIDUE_ULPS * f64::EPSILON * arg.abs()
}

fn has_negative_coefficient(expr: &Expr) -> bool {
    matches!(expr, Expr::Mul(factors) if matches!(factors.first(), Some(Expr::Num(c)) if *c < 0.0))
}

/// Split a canonical term into its numeric coefficient and the rest
fn split_coefficient(term: Expr) -> (f64, Expr) {
    if let Expr::Mul(factors) = &term {
        if let Some(Expr::Num(c)) = factors.first() {
            let coeff = *c;
            let mut rest: Vec<Expr> = factors[1..].to_vec();
            let rest = match rest.len() {
                0 => Expr::one(),
                1 => rest.remove(0),
                _ => Expr::Mul(rest),
            };
            return (coeff, rest);
        }
    }
    (1.0, term)
}

/// Inverse of [`split_coefficient`]
fn scale(rest: Expr, coeff: f64) -> Expr {
    if coeff == 1.0 {
        return rest;
    }
    match rest {
        Expr::Num(v) => Expr::num(v * coeff),
        Expr::Mul(factors) => {
            let mut out = Vec::with_capacity(factors.len() + 1);
            out.push(Expr::num(coeff));
            out.extend(factors);
            Expr::Mul(out)
        }
        other => Expr::Mul(vec![Expr::num(coeff), other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::expr::Symbol;
    use crate::symbolic::parser::parse;
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    fn simp(text: &str) -> Expr {
        Simplifier::new().simplify(&parse(text).unwrap()).unwrap()
    }

    fn at(e: &Expr, x: f64, y0: f64, y1: f64) -> f64 {
        evaluate(e, &Bindings::from_states(&dvector![x], &dvector![y0, y1])).unwrap()
    }

    #[test]
    fn test_collect_like_terms() {
        assert_eq!(simp("x0 + x0"), simp("2*x0"));
        assert_eq!(simp("x0 - x0"), Expr::zero());
        assert_eq!(simp("2*x0*3"), simp("6*x0"));
        assert_eq!(simp("3*y0 + 2 - y0 - 2"), simp("2*y0"));
    }

    #[test]
    fn test_merge_powers() {
        assert_eq!(simp("x0*x0"), simp("x0^2"));
        assert_eq!(simp("x0^2 / x0"), Expr::sym(Symbol::slow(0)));
        assert_eq!(simp("x0^3 * x0^-3"), Expr::one());
        assert_eq!(simp("sqrt(y0)^2"), Expr::sym(Symbol::fast(0)));
    }

    #[test]
    fn test_numeric_folding() {
        assert_eq!(simp("2*3 + 4"), Expr::num(10.0));
        assert_eq!(simp("cos(0)*y0"), Expr::sym(Symbol::fast(0)));
        assert_eq!(simp("sin(0) + y0"), Expr::sym(Symbol::fast(0)));
        assert_eq!(simp("sqrt(2)*sqrt(2)"), Expr::num(2.0));
        assert_eq!(simp("2^-1"), Expr::num(0.5));
    }

    #[test]
    fn test_small_coefficients_kept() {
        let e = simp("1e-14*x0 + x0^2*y0");
        assert_relative_eq!(at(&e, 1.0, 0.0, 0.0), 1e-14);
        assert_relative_eq!(at(&simp("1e-14*x0 + 3e-15*x0"), 1.0, 0.0, 0.0), 1.3e-14);
        assert_eq!(simp("1e-20 + y0 - y0"), Expr::num(1e-20));
        assert_eq!(simp("1e-14*x0 - 1e-14*x0"), Expr::zero());
    }

    #[test]
    fn test_trig_residue_snapped() {
        assert_eq!(simp("sin(pi)"), Expr::zero());
        assert_eq!(simp("cos(pi/2)*y0 + y1"), Expr::sym(Symbol::fast(1)));
        assert_eq!(simp("sin(1e-14)"), Expr::num(1e-14_f64.sin()));
        assert_eq!(simp("exp(-40)"), Expr::num((-40.0_f64).exp()));
    }

    #[test]
    fn test_irrational_power_kept() {
        let s = simp("sqrt(2)");
        assert_eq!(s, Expr::sqrt(Expr::num(2.0)));
    }

    #[test]
    fn test_distribution_cancels() {
        assert_eq!(simp("(x0 + 1)*(x0 - 1)"), simp("x0^2 - 1"));
        assert_eq!(simp("2*(y0 + y1) - 2*y1"), simp("2*y0"));
    }

    #[test]
    fn test_exp_cancellation() {
        assert_eq!(simp("exp(x0)*exp(-x0)"), Expr::one());
        let e = simp("exp(-y0^2) * (y0 + 1) / exp(-y0^2)");
        assert_eq!(e, simp("y0 + 1"));
        assert!(!e.contains_func(Func::Exp));
    }

    #[test]
    fn test_exp_log_inverse() {
        assert_eq!(simp("exp(log(y0))"), Expr::sym(Symbol::fast(0)));
        assert_eq!(simp("log(exp(y0 + x0))"), simp("x0 + y0"));
    }

    #[test]
    fn test_trig_parity() {
        assert_eq!(simp("sin(-y0)"), simp("-sin(y0)"));
        assert_eq!(simp("cos(-2*y0)"), simp("cos(2*y0)"));
        assert_eq!(simp("sin(-y0) + sin(y0)"), Expr::zero());
    }

    #[test]
    fn test_idempotent() {
        let cases = [
            "sin(x0*y0/2) + x0*cos(y0/2)",
            "((y1 + y0)^4/4 - (y1 + y0)^2/2) + (y1 - y0)^4",
            "exp(-y0^2)*(2*y0*cos(x0) + sin(y0)^2)",
            "(x0 + y0)^2*(x0 - y1)/(1 + y0^2)",
            "sqrt(2)*sqrt(2)*y0/2 - tan(-y1)",
        ];
        let simplifier = Simplifier::new();
        for case in cases {
            let once = simplifier.simplify(&parse(case).unwrap()).unwrap();
            let twice = simplifier.simplify(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", case);
        }
    }

    #[test]
    fn test_value_preserved() {
        let cases = [
            "sin(x0*y0/2) + x0*cos(y0/2)",
            "((y1 + y0)^4/4 - (y1 + y0)^2/2) + (y1 - y0)^4",
            "exp(-y0^2)*(2*y0*cos(x0) + sin(y0)^2)/exp(-y0^2)",
            "(x0 + y0)^2*(x0 - y1)/(1 + y0^2)",
            "-0.5*(2*y1 - y0)*(y0 + 3)^-2",
        ];
        for case in cases {
            let raw = parse(case).unwrap();
            let simplified = Simplifier::new().simplify(&raw).unwrap();
            for &(x, y0, y1) in &[(0.2, -0.4, 1.1), (1.5, 0.9, -0.3)] {
                assert_relative_eq!(
                    at(&raw, x, y0, y1),
                    at(&simplified, x, y0, y1),
                    max_relative = 1e-12,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_depth_budget() {
        let e = parse("sin(cos(sin(cos(y0))))").unwrap();
        let result = Simplifier::with_max_depth(2).simplify(&e);
        assert!(matches!(
            result,
            Err(SymbolicError::SimplificationDiverged(2))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let e = Expr::product([Expr::num(f64::INFINITY), Expr::sym(Symbol::fast(0))]);
        assert!(matches!(
            Simplifier::new().simplify(&e),
            Err(SymbolicError::NonFiniteLiteral(_))
        ));
    }
}
