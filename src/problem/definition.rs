//! Serde model of a problem definition document

use serde::Deserialize;

use crate::problem::errors::ConfigError;

/// Supported schema versions
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0"];

/// Either a numeric constant or an expression string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExpressionOrNumber {
    /// A numeric constant
    Number(f64),
    /// An infix expression
    Expression(String),
}

impl ExpressionOrNumber {
    /// Expression text accepted by the parser
    pub fn to_expression_text(&self) -> String {
        match self {
            Self::Number(n) => format!("{:?}", n),
            Self::Expression(s) => s.clone(),
        }
    }
}

/// A two-scale problem defined in JSON
///
/// # Example
///
/// ```ignore
/// use twoscale::problem::ProblemDefinition;
///
/// let json = r#"{
///     "schema": "1.0",
///     "id": "quadratic_1d",
///     "ns": 1,
///     "nf": 1,
///     "diffusion": 1,
///     "sigma": 1.0,
///     "solution": ["sin(x0*y0/2) + x0*cos(y0/2)"],
///     "drift": ["cos(x0)*cos(0.5*y0)"],
///     "potential": "y0^2"
/// }"#;
///
/// let problem = ProblemDefinition::from_str(json)?;
/// assert_eq!(problem.ns, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemDefinition {
    // ─────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────
    /// Schema version (e.g., "1.0")
    pub schema: String,

    /// Unique problem identifier (snake_case)
    pub id: String,

    /// Free text shown by `--list`
    #[serde(default)]
    pub description: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Dimensions and scales
    // ─────────────────────────────────────────────────────────────────────────
    /// Number of slow variables
    pub ns: usize,

    /// Number of fast variables
    pub nf: usize,

    /// Diffusion scale `s`, a symbol-free expression
    pub diffusion: ExpressionOrNumber,

    /// Scaling factor passed through to the solver
    pub sigma: f64,

    // ─────────────────────────────────────────────────────────────────────────
    // Model expressions
    // ─────────────────────────────────────────────────────────────────────────
    /// Solution `g`, one expression per slow variable
    pub solution: Vec<String>,

    /// Auxiliary fast drift `h`, one expression per fast variable
    pub drift: Vec<String>,

    /// Potential `V`, depending on fast variables only
    pub potential: String,
}

impl ProblemDefinition {
    /// Parse a JSON string into a ProblemDefinition
    pub fn from_str(json: &str) -> Result<Self, ConfigError> {
        let problem: Self = serde_json::from_str(json)?;
        problem.check_schema_version()?;
        Ok(problem)
    }

    fn check_schema_version(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&self.schema.as_str()) {
            return Err(ConfigError::UnsupportedSchema {
                version: self.schema.clone(),
                supported: SUPPORTED_SCHEMA_VERSIONS.join(", "),
            });
        }
        Ok(())
    }
}
