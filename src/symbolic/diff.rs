//! Symbolic differentiation
//!
//! Results are not simplified; zero contributions are pruned while the
//! derivative is built so the trees stay small.

use crate::symbolic::errors::SymbolicError;
use crate::symbolic::expr::{Expr, Func, Symbol};

/// Derivative of `expr` with respect to `var`
pub fn differentiate(expr: &Expr, var: &Symbol) -> Result<Expr, SymbolicError> {
    if !expr.contains(var) {
        check_literals(expr)?;
        return Ok(Expr::zero());
    }
    match expr {
        Expr::Num(_) | Expr::Const(_) => Ok(Expr::zero()),
        Expr::Sym(s) => Ok(if s == var { Expr::one() } else { Expr::zero() }),
        Expr::Add(terms) => {
            let mut parts = Vec::with_capacity(terms.len());
            for term in terms {
                let d = differentiate(term, var)?;
                if !d.is_zero() {
                    parts.push(d);
                }
            }
            Ok(Expr::sum(parts))
        }
        Expr::Mul(factors) => {
            // product rule over all factors
            let mut parts = Vec::new();
            for (i, factor) in factors.iter().enumerate() {
                let d = differentiate(factor, var)?;
                if d.is_zero() {
                    continue;
                }
                let others = factors
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, f)| f.clone());
                parts.push(Expr::product(others.chain(std::iter::once(d))));
            }
            Ok(Expr::sum(parts))
        }
        Expr::Pow(base, exponent) => {
            let base = base.as_ref();
            let exponent = exponent.as_ref();
            if !exponent.contains(var) {
                // d(b^n) = n * b^(n-1) * b'
                check_literals(exponent)?;
                let db = differentiate(base, var)?;
                let lowered = match exponent.as_num() {
                    Some(n) => Expr::num(n - 1.0),
                    None => exponent.clone() - Expr::one(),
                };
                Ok(Expr::product([
                    exponent.clone(),
                    Expr::pow(base.clone(), lowered),
                    db,
                ]))
            } else if !base.contains(var) {
                // d(a^u) = a^u * ln(a) * u'
                check_literals(base)?;
                let du = differentiate(exponent, var)?;
                Ok(Expr::product([
                    Expr::pow(base.clone(), exponent.clone()),
                    Expr::ln(base.clone()),
                    du,
                ]))
            } else {
                // d(b^u) = b^u * (u' ln(b) + u b' / b)
                let db = differentiate(base, var)?;
                let du = differentiate(exponent, var)?;
                Ok(Expr::product([
                    Expr::pow(base.clone(), exponent.clone()),
                    Expr::sum([
                        Expr::product([du, Expr::ln(base.clone())]),
                        Expr::product([exponent.clone(), db, Expr::recip(base.clone())]),
                    ]),
                ]))
            }
        }
        Expr::Call(func, arg) => {
            let arg = arg.as_ref();
            let da = differentiate(arg, var)?;
            let outer = match func {
                Func::Sin => Expr::cos(arg.clone()),
                Func::Cos => -Expr::sin(arg.clone()),
                Func::Tan => Expr::one() + Expr::powf(Expr::tan(arg.clone()), 2.0),
                Func::Exp => Expr::exp(arg.clone()),
                Func::Ln => Expr::recip(arg.clone()),
            };
            Ok(Expr::product([outer, da]))
        }
    }
}

/// Repeated derivative `d^order expr / d var^order`
pub fn differentiate_n(expr: &Expr, var: &Symbol, order: usize) -> Result<Expr, SymbolicError> {
    (0..order).try_fold(expr.clone(), |acc, _| differentiate(&acc, var))
}

fn check_literals(expr: &Expr) -> Result<(), SymbolicError> {
    match expr {
        Expr::Num(v) if !v.is_finite() => Err(SymbolicError::NonFiniteLiteral(*v)),
        Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => Ok(()),
        Expr::Add(items) | Expr::Mul(items) => items.iter().try_for_each(check_literals),
        Expr::Pow(base, exponent) => {
            check_literals(base)?;
            check_literals(exponent)
        }
        Expr::Call(_, arg) => check_literals(arg),
    }
}
