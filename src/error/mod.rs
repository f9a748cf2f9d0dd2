use std::path::PathBuf;

use thiserror::Error;

use crate::problem::ConfigError;
use crate::symbolic::SymbolicError;

#[derive(Error, Debug)]
pub enum TwoscaleError {
    #[error("Invalid problem: {0}")]
    Config(#[from] ConfigError),
    #[error("Derivation failed: {0}")]
    Derivation(#[from] SymbolicError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TwoscaleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TwoscaleError::Io {
            path: path.into(),
            source,
        }
    }
}
