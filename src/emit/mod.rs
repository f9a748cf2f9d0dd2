//! Emission of the derived coefficients
//!
//! Two independent passes over the same [`CoefficientSet`]:
//! - [`NumericEmitter`]: one C++ routine per derived scalar, plus the
//!   `Problem::init_functions()` block wiring them into the solver;
//! - [`TypesetEmitter`]: the slow/fast system as a LaTeX `equation*` block.
//!
//! [`CoefficientSet`]: crate::derivation::CoefficientSet

mod numeric;
mod typeset;

use std::fmt;

use crate::symbolic::Expr;

pub use numeric::NumericEmitter;
pub use typeset::TypesetEmitter;

/// A named numeric routine
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFunction {
    /// Routine name, e.g. `dxa01`
    pub name: String,
    /// The expression the routine evaluates
    pub expr: Expr,
    /// C expression text of `expr`
    pub body: String,
}

impl fmt::Display for EmittedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"double {name}(vector<double> x, vector<double> y){{
    double result = {body};
    return result;
}}

"#,
            name = self.name,
            body = self.body,
        )
    }
}

/// Nested brace initializer over the names `prefix{i}{j}..`
///
/// With no dimensions left this is `prefix` itself.
///
/// ```ignore
/// assert_eq!(array_initializer("dxa", &[2, 2]), "{{dxa00, dxa01}, {dxa10, dxa11}}");
/// ```
pub fn array_initializer(prefix: &str, dims: &[usize]) -> String {
    match dims.split_first() {
        None => prefix.to_string(),
        Some((&n, rest)) => {
            let items: Vec<String> = (0..n)
                .map(|i| array_initializer(&format!("{}{}", prefix, i), rest))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}
