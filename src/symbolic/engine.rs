use crate::symbolic::diff::differentiate;
use crate::symbolic::errors::SymbolicError;
use crate::symbolic::eval::{evaluate, Bindings};
use crate::symbolic::expr::{Expr, Symbol};
use crate::symbolic::print;
use crate::symbolic::simplify::Simplifier;

/// The algebra operations the derivation and the emitters rely on
///
/// Implementations must be deterministic: equal inputs give structurally
/// equal expressions and identical text.
pub trait AlgebraEngine {
    fn differentiate(&self, expr: &Expr, var: &Symbol) -> Result<Expr, SymbolicError>;

    fn simplify(&self, expr: &Expr) -> Result<Expr, SymbolicError>;

    fn evaluate(&self, expr: &Expr, bindings: &Bindings) -> Result<f64, SymbolicError>;

    /// C expression text
    fn print_code(&self, expr: &Expr) -> String;

    /// LaTeX text
    fn print_latex(&self, expr: &Expr) -> String;

    /// `simplify(d expr / d var)`
    fn simplified_derivative(&self, expr: &Expr, var: &Symbol) -> Result<Expr, SymbolicError> {
        self.simplify(&self.differentiate(expr, var)?)
    }
}

/// Engine backed by the expression tree of this crate
#[derive(Debug, Clone, Default)]
pub struct NativeEngine {
    simplifier: Simplifier,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlgebraEngine for NativeEngine {
    fn differentiate(&self, expr: &Expr, var: &Symbol) -> Result<Expr, SymbolicError> {
        differentiate(expr, var)
    }

    fn simplify(&self, expr: &Expr) -> Result<Expr, SymbolicError> {
        self.simplifier.simplify(expr)
    }

    fn evaluate(&self, expr: &Expr, bindings: &Bindings) -> Result<f64, SymbolicError> {
        evaluate(expr, bindings)
    }

    fn print_code(&self, expr: &Expr) -> String {
        print::code(expr)
    }

    fn print_latex(&self, expr: &Expr) -> String {
        print::latex(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parser::parse;

    #[test]
    fn test_simplified_derivative() {
        let engine = NativeEngine::new();
        let e = parse("y0^2 + x0*y0").unwrap();
        let d = engine.simplified_derivative(&e, &Symbol::fast(0)).unwrap();
        assert_eq!(d, engine.simplify(&parse("2*y0 + x0").unwrap()).unwrap());
        assert_eq!(engine.print_code(&d), "x[0] + 2.0*y[0]");
        assert_eq!(engine.print_latex(&d), "x_{0} + 2 y_{0}");
    }
}
