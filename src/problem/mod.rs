//! Two-scale problem definitions
//!
//! A problem couples `ns` slow variables `x0..` to `nf` fast variables `y0..`
//! through a solution `g` (one expression per slow variable), a potential
//! `V(y)`, an auxiliary fast drift `h` (one expression per fast variable), a
//! diffusion scale `s` and a scaling factor `sigma`.
//!
//! Problems are written as JSON documents, checked by the [`Validator`] and
//! turned into a [`ProblemSpec`], the only input of the derivation.
//!
//! # JSON Schema
//!
//! | Field | Description |
//! |-------|-------------|
//! | `schema` | Schema version (currently `"1.0"`) |
//! | `id` | Unique problem identifier |
//! | `description` | Optional free text |
//! | `ns`, `nf` | Number of slow and fast variables (both at least 1) |
//! | `diffusion` | Diffusion scale `s`, a number or a symbol-free expression |
//! | `sigma` | Scaling factor handed to the solver |
//! | `solution` | `ns` expressions for `g` |
//! | `drift` | `nf` expressions for `h` |
//! | `potential` | Expression for `V`, fast symbols only |
//!
//! Expressions use `+ - * /`, `^` or `**`, `sin cos tan exp log ln sqrt pow`,
//! the constants `pi` and `e`, and the symbols `x0`/`x[0]`, `y0`/`y[0]`.
//!
//! # Using the Problem Library
//!
//! ```ignore
//! use twoscale::problem::ProblemLibrary;
//!
//! let library = ProblemLibrary::builtin();
//! for id in library.list() {
//!     println!("Available: {}", id);
//! }
//! let spec = library.spec("triple_well_2d")?;
//! ```

mod definition;
mod errors;
pub mod library;
mod validation;

use std::path::Path;

use crate::symbolic::{Expr, Symbol};

pub use definition::{ExpressionOrNumber, ProblemDefinition, SUPPORTED_SCHEMA_VERSIONS};
pub use errors::ConfigError;
pub use library::ProblemLibrary;
pub use validation::Validator;

/// A validated two-scale problem
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemSpec {
    ns: usize,
    nf: usize,
    s: Expr,
    sigma: f64,
    g: Vec<Expr>,
    v: Expr,
    h: Vec<Expr>,
}

impl ProblemSpec {
    /// Build a specification, checking the dimensions
    pub fn new(
        ns: usize,
        nf: usize,
        s: Expr,
        sigma: f64,
        g: Vec<Expr>,
        v: Expr,
        h: Vec<Expr>,
    ) -> Result<Self, ConfigError> {
        if ns == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "ns".to_string(),
                value: ns,
            });
        }
        if nf == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "nf".to_string(),
                value: nf,
            });
        }
        if g.len() != ns {
            return Err(ConfigError::mismatch("solution", ns, g.len()));
        }
        if h.len() != nf {
            return Err(ConfigError::mismatch("drift", nf, h.len()));
        }
        Ok(Self {
            ns,
            nf,
            s,
            sigma,
            g,
            v,
            h,
        })
    }

    pub fn ns(&self) -> usize {
        self.ns
    }

    pub fn nf(&self) -> usize {
        self.nf
    }

    /// Diffusion scale
    pub fn s(&self) -> &Expr {
        &self.s
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Solution, one entry per slow variable
    pub fn g(&self) -> &[Expr] {
        &self.g
    }

    /// Potential
    pub fn v(&self) -> &Expr {
        &self.v
    }

    /// Auxiliary fast drift, one entry per fast variable
    pub fn h(&self) -> &[Expr] {
        &self.h
    }

    /// `x0..x{ns-1}`
    pub fn slow_symbols(&self) -> Vec<Symbol> {
        (0..self.ns).map(Symbol::slow).collect()
    }

    /// `y0..y{nf-1}`
    pub fn fast_symbols(&self) -> Vec<Symbol> {
        (0..self.nf).map(Symbol::fast).collect()
    }

    /// `y0..y{2nf-1}`; the first `nf` are the original fast symbols
    pub fn extended_fast_symbols(&self) -> Vec<Symbol> {
        (0..2 * self.nf).map(Symbol::fast).collect()
    }
}

/// Parse a JSON string into a ProblemDefinition
pub fn parse_problem(json: &str) -> Result<ProblemDefinition, ConfigError> {
    ProblemDefinition::from_str(json)
}

/// Parse and validate a JSON problem
pub fn validate_problem(json: &str) -> Result<ProblemSpec, ConfigError> {
    let problem = ProblemDefinition::from_str(json)?;
    Validator::new().validate(&problem)
}

/// Read, parse and validate a JSON problem file
pub fn load_problem(path: &Path) -> Result<ProblemSpec, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::LibraryError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    validate_problem(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse;

    fn exprs(texts: &[&str]) -> Vec<Expr> {
        texts.iter().map(|t| parse(t).unwrap()).collect()
    }

    #[test]
    fn test_new_checks_lengths() {
        let result = ProblemSpec::new(
            2,
            1,
            Expr::one(),
            1.0,
            exprs(&["x0*y0"]),
            parse("y0^2").unwrap(),
            exprs(&["0"]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::DimensionMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        let result = ProblemSpec::new(
            1,
            0,
            Expr::one(),
            1.0,
            exprs(&["x0"]),
            Expr::zero(),
            vec![],
        );
        assert!(matches!(result, Err(ConfigError::InvalidDimension { .. })));
    }

    #[test]
    fn test_symbol_families() {
        let spec = ProblemSpec::new(
            1,
            2,
            Expr::one(),
            1.0,
            exprs(&["x0*y0"]),
            parse("y0^2 + y1^2").unwrap(),
            exprs(&["0", "0"]),
        )
        .unwrap();
        assert_eq!(spec.slow_symbols(), vec![Symbol::slow(0)]);
        assert_eq!(spec.fast_symbols().len(), 2);
        let extended = spec.extended_fast_symbols();
        assert_eq!(extended.len(), 4);
        assert_eq!(&extended[..2], spec.fast_symbols().as_slice());
        assert_eq!(extended[3].name(), "y3");
    }
}
