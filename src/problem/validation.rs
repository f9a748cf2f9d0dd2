//! Validation for problem definitions

use crate::problem::definition::ProblemDefinition;
use crate::problem::errors::ConfigError;
use crate::problem::ProblemSpec;
use crate::symbolic::{evaluate, parse, Bindings, Expr, Slot};

/// Validator for problem definitions
///
/// Turns a [`ProblemDefinition`] into a [`ProblemSpec`] once every
/// expression parses and only uses symbols within the declared dimensions.
pub struct Validator {
    /// Whether to treat warnings as errors
    strict: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Create a strict validator that treats warnings as errors
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Validate a problem definition
    pub fn validate(&self, problem: &ProblemDefinition) -> Result<ProblemSpec, ConfigError> {
        let (ns, nf) = (problem.ns, problem.nf);

        // 1. Dimensions
        self.validate_dimensions(problem)?;

        // 2. Expressions
        let g = problem
            .solution
            .iter()
            .enumerate()
            .map(|(i, text)| self.read_expr(&format!("solution[{}]", i), text, ns, nf))
            .collect::<Result<Vec<_>, _>>()?;
        let h = problem
            .drift
            .iter()
            .enumerate()
            .map(|(i, text)| self.read_expr(&format!("drift[{}]", i), text, ns, nf))
            .collect::<Result<Vec<_>, _>>()?;
        let v = self.read_expr("potential", &problem.potential, ns, nf)?;

        // 3. Potential
        if let Some(symbol) = v
            .free_symbols()
            .into_iter()
            .find(|s| matches!(s.slot(), Slot::Slow(_)))
        {
            return Err(ConfigError::SlowSymbolInPotential {
                symbol: symbol.name().to_string(),
            });
        }

        // 4. Scales
        let s = self.validate_diffusion(problem, ns, nf)?;
        if !problem.sigma.is_finite() {
            return Err(ConfigError::InvalidSigma(problem.sigma));
        }

        // 5. Solutions without fast dependence
        self.validate_solutions(&g)?;

        ProblemSpec::new(ns, nf, s, problem.sigma, g, v, h)
    }

    fn validate_dimensions(&self, problem: &ProblemDefinition) -> Result<(), ConfigError> {
        for (name, value) in [("ns", problem.ns), ("nf", problem.nf)] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if problem.solution.len() != problem.ns {
            return Err(ConfigError::mismatch(
                "solution",
                problem.ns,
                problem.solution.len(),
            ));
        }
        if problem.drift.len() != problem.nf {
            return Err(ConfigError::mismatch(
                "drift",
                problem.nf,
                problem.drift.len(),
            ));
        }
        Ok(())
    }

    /// Parse one expression and check its symbols against the dimensions
    fn read_expr(
        &self,
        context: &str,
        text: &str,
        ns: usize,
        nf: usize,
    ) -> Result<Expr, ConfigError> {
        if text.trim().is_empty() {
            return Err(ConfigError::EmptyExpression {
                context: context.to_string(),
            });
        }
        let expr = parse(text).map_err(|e| ConfigError::from_symbolic(context, e))?;
        for symbol in expr.free_symbols() {
            let (index, limit) = match symbol.slot() {
                Slot::Slow(i) => (i, ns),
                Slot::Fast(i) => (i, nf),
            };
            if index >= limit {
                return Err(ConfigError::SymbolOutOfRange {
                    symbol: symbol.name().to_string(),
                    context: context.to_string(),
                    limit,
                });
            }
        }
        Ok(expr)
    }

    fn validate_diffusion(
        &self,
        problem: &ProblemDefinition,
        ns: usize,
        nf: usize,
    ) -> Result<Expr, ConfigError> {
        let s = self.read_expr("diffusion", &problem.diffusion.to_expression_text(), ns, nf)?;
        if !s.is_constant() {
            return Err(ConfigError::InvalidDiffusion(format!(
                "'{}' depends on state symbols",
                problem.diffusion.to_expression_text()
            )));
        }
        let value = evaluate(&s, &Bindings::new())
            .map_err(|e| ConfigError::InvalidDiffusion(e.to_string()))?;
        if !value.is_finite() {
            return Err(ConfigError::InvalidDiffusion(format!(
                "'{}' evaluates to {}",
                problem.diffusion.to_expression_text(),
                value
            )));
        }
        Ok(s)
    }

    fn validate_solutions(&self, g: &[Expr]) -> Result<(), ConfigError> {
        for (index, component) in g.iter().enumerate() {
            let fast = component
                .free_symbols()
                .iter()
                .any(|s| matches!(s.slot(), Slot::Fast(_)));
            if fast {
                continue;
            }
            if self.strict {
                return Err(ConfigError::IndependentSolution { index });
            }
            tracing::warn!(
                "Solution component {} does not depend on any fast symbol, its drift is zero",
                index
            );
        }
        Ok(())
    }
}
