//! Numeric evaluation of expressions

use std::collections::HashMap;

use nalgebra::DVector;

use crate::symbolic::errors::SymbolicError;
use crate::symbolic::expr::{Expr, Slot, Symbol};

/// Values assigned to symbols for one evaluation
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<Symbol, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `x[i]` to the slow symbols and `y[i]` to the fast symbols
    pub fn from_states(x: &DVector<f64>, y: &DVector<f64>) -> Self {
        let mut bindings = Self::new();
        for (i, value) in x.iter().enumerate() {
            bindings.insert(Symbol::slow(i), *value);
        }
        for (i, value) in y.iter().enumerate() {
            bindings.insert(Symbol::fast(i), *value);
        }
        bindings
    }

    pub fn insert(&mut self, symbol: Symbol, value: f64) -> Option<f64> {
        self.values.insert(symbol, value)
    }

    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(symbol).copied()
    }
}

/// Evaluate `expr` under `bindings`
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<f64, SymbolicError> {
    match expr {
        Expr::Num(v) => Ok(*v),
        Expr::Const(c) => Ok(c.value()),
        Expr::Sym(symbol) => bindings
            .get(symbol)
            .ok_or_else(|| SymbolicError::UnboundSymbol(describe(symbol))),
        Expr::Add(terms) => terms
            .iter()
            .try_fold(0.0, |acc, t| Ok::<f64, SymbolicError>(acc + evaluate(t, bindings)?)),
        Expr::Mul(factors) => factors
            .iter()
            .try_fold(1.0, |acc, f| Ok::<f64, SymbolicError>(acc * evaluate(f, bindings)?)),
        Expr::Pow(base, exponent) => {
            let b = evaluate(base, bindings)?;
            let x = evaluate(exponent, bindings)?;
            match exponent.as_integer() {
                Some(n) if n.abs() <= i32::MAX as i64 => Ok(b.powi(n as i32)),
                _ => Ok(b.powf(x)),
            }
        }
        Expr::Call(func, arg) => Ok(func.apply(evaluate(arg, bindings)?)),
    }
}

fn describe(symbol: &Symbol) -> String {
    match symbol.slot() {
        Slot::Slow(i) => format!("{} (x[{}])", symbol.name(), i),
        Slot::Fast(i) => format!("{} (y[{}])", symbol.name(), i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parser::parse;
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    #[test]
    fn test_evaluate_polynomial() {
        let e = parse("x0^2 + 3*y0 - 1").unwrap();
        let b = Bindings::from_states(&dvector![2.0], &dvector![0.5]);
        assert_relative_eq!(evaluate(&e, &b).unwrap(), 4.5);
    }

    #[test]
    fn test_evaluate_functions_and_constants() {
        let e = parse("sin(pi/2) + exp(0) + log(e) + sqrt(4)").unwrap();
        let b = Bindings::new();
        assert_relative_eq!(evaluate(&e, &b).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_base_integer_power() {
        let e = parse("y0^3").unwrap();
        let b = Bindings::from_states(&DVector::zeros(0), &dvector![-2.0]);
        assert_relative_eq!(evaluate(&e, &b).unwrap(), -8.0);
    }

    #[test]
    fn test_unbound_symbol() {
        let e = parse("x0 + y1").unwrap();
        let b = Bindings::from_states(&dvector![1.0], &dvector![1.0]);
        assert!(matches!(
            evaluate(&e, &b),
            Err(SymbolicError::UnboundSymbol(name)) if name.starts_with("y1")
        ));
    }
}
