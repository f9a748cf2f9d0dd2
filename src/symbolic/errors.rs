//! Errors raised by the symbolic engine

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    /// Expression text could not be parsed, `offset` counts characters
    #[error("Parse error at character {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A symbol had no value during evaluation
    #[error("No value bound to symbol '{0}'")]
    UnboundSymbol(String),

    /// A literal is NaN or infinite
    #[error("Non-finite literal {0} in expression")]
    NonFiniteLiteral(f64),

    /// Simplification recursed deeper than its budget allows
    #[error("Simplification did not converge within depth {0}")]
    SimplificationDiverged(usize),
}

impl SymbolicError {
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }
}
