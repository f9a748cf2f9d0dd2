//! Error types for problem definitions

use thiserror::Error;

use crate::symbolic::SymbolicError;

/// Errors that can occur when reading or validating a problem
#[derive(Debug, Error)]
pub enum ConfigError {
    // ─────────────────────────────────────────────────────────────────────────
    // Parsing Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse JSON
    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Unsupported schema version
    #[error("Unsupported schema version '{version}'. Supported versions: {supported}")]
    UnsupportedSchema { version: String, supported: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A dimension is zero
    #[error("Dimension '{name}' must be at least 1, got {value}")]
    InvalidDimension { name: String, value: usize },

    /// A family of expressions has the wrong length
    #[error("Expected {expected} entries in '{field}', got {actual}")]
    DimensionMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Expression Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Empty expression
    #[error("Empty expression in {context}")]
    EmptyExpression { context: String },

    /// Invalid expression syntax
    #[error("Invalid expression in {context}: {message}")]
    InvalidExpression { context: String, message: String },

    /// A state symbol beyond the declared dimensions
    #[error("Symbol '{symbol}' in {context} is out of range ({limit} declared)")]
    SymbolOutOfRange {
        symbol: String,
        context: String,
        limit: usize,
    },

    /// The potential must only depend on fast symbols
    #[error("Potential depends on slow symbol '{symbol}'")]
    SlowSymbolInPotential { symbol: String },

    /// The diffusion scale must be a finite constant
    #[error("Invalid diffusion scale: {0}")]
    InvalidDiffusion(String),

    /// The scaling factor must be finite
    #[error("Invalid sigma: {0}")]
    InvalidSigma(f64),

    /// Solution component without any fast dependence (strict mode)
    #[error("Solution component {index} does not depend on any fast symbol")]
    IndependentSolution { index: usize },

    // ─────────────────────────────────────────────────────────────────────────
    // Library Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Problem not found in library
    #[error("Problem '{0}' not found in library")]
    ProblemNotFound(String),

    /// General library error (file I/O, etc.)
    #[error("Library error: {0}")]
    LibraryError(String),
}

impl ConfigError {
    /// Create a dimension mismatch error
    pub fn mismatch(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid expression error
    pub fn invalid_expr(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Wrap an engine error raised while reading `context`
    pub fn from_symbolic(context: impl Into<String>, error: SymbolicError) -> Self {
        Self::invalid_expr(context, error.to_string())
    }
}
