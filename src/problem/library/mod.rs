//! Problem Library
//!
//! Provides a registry of built-in two-scale problems that can be selected by
//! id from the command line, extended with further `.json` files loaded from
//! a directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use twoscale::problem::library::ProblemLibrary;
//!
//! let library = ProblemLibrary::builtin();
//!
//! // List available problems
//! for id in library.list() {
//!     println!("Available: {}", id);
//! }
//!
//! // Get a validated problem
//! let spec = library.spec("quadratic_1d")?;
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::problem::definition::ProblemDefinition;
use crate::problem::errors::ConfigError;
use crate::problem::validation::Validator;
use crate::problem::ProblemSpec;

/// A registry of problem definitions
#[derive(Debug, Clone)]
pub struct ProblemLibrary {
    problems: HashMap<String, ProblemDefinition>,
}

// Embed built-in problems at compile time
mod embedded {
    pub const QUADRATIC_1D: &str = include_str!("models/quadratic_1d.json");
    pub const TRIPLE_WELL_2D: &str = include_str!("models/triple_well_2d.json");
    pub const QUARTIC_2D: &str = include_str!("models/quartic_2d.json");
}

impl ProblemLibrary {
    fn new() -> Self {
        Self {
            problems: HashMap::new(),
        }
    }

    /// Create a library with all built-in problems
    pub fn builtin() -> Self {
        let mut library = Self::new();

        let embedded_problems = [
            embedded::QUADRATIC_1D,
            embedded::TRIPLE_WELL_2D,
            embedded::QUARTIC_2D,
        ];

        for json in embedded_problems {
            match ProblemDefinition::from_str(json) {
                Ok(problem) => {
                    library.problems.insert(problem.id.clone(), problem);
                }
                Err(e) => tracing::error!("Failed to parse built-in problem: {}", e),
            }
        }

        library
    }

    /// Load problems from a directory (recursively searches for .json files)
    pub fn from_dir(path: &Path) -> Result<Self, ConfigError> {
        let mut library = Self::new();
        library.load_dir(path)?;
        Ok(library)
    }

    /// Load problems from a directory into this library
    pub fn load_dir(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::LibraryError(format!(
                "Directory not found: {}",
                path.display()
            )));
        }

        Self::load_dir_recursive(path, &mut self.problems)?;
        Ok(())
    }

    fn load_dir_recursive(
        path: &Path,
        problems: &mut HashMap<String, ProblemDefinition>,
    ) -> Result<(), ConfigError> {
        let entries = std::fs::read_dir(path)
            .map_err(|e| ConfigError::LibraryError(format!("Failed to read directory: {}", e)))?;

        for entry in entries {
            let entry = entry
                .map_err(|e| ConfigError::LibraryError(format!("Failed to read entry: {}", e)))?;
            let file_path = entry.path();

            if file_path.is_dir() {
                Self::load_dir_recursive(&file_path, problems)?;
            } else if file_path.extension().is_some_and(|ext| ext == "json") {
                let content = std::fs::read_to_string(&file_path).map_err(|e| {
                    ConfigError::LibraryError(format!(
                        "Failed to read {}: {}",
                        file_path.display(),
                        e
                    ))
                })?;

                match ProblemDefinition::from_str(&content) {
                    Ok(problem) => {
                        tracing::debug!("Loaded problem '{}' from {}", problem.id, file_path.display());
                        problems.insert(problem.id.clone(), problem);
                    }
                    Err(e) => {
                        // skip the file, keep loading the others
                        tracing::warn!("Failed to parse {}: {}", file_path.display(), e);
                    }
                }
            }
        }

        Ok(())
    }

    /// Get a problem by ID
    pub fn get(&self, id: &str) -> Option<&ProblemDefinition> {
        self.problems.get(id)
    }

    /// Get a problem by ID and validate it
    pub fn spec(&self, id: &str) -> Result<ProblemSpec, ConfigError> {
        let problem = self
            .get(id)
            .ok_or_else(|| ConfigError::ProblemNotFound(id.to_string()))?;
        Validator::new().validate(problem)
    }

    /// List all problem IDs
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.problems.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    /// Get the number of problems
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Check if the library is empty
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
