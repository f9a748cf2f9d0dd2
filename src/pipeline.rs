//! End-to-end generation: problem in, both artifacts out
//!
//! No output file is touched before the derivation has finished.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::derivation::Derivation;
use crate::emit::{NumericEmitter, TypesetEmitter};
use crate::error::TwoscaleError;
use crate::problem::ProblemSpec;
use crate::symbolic::{AlgebraEngine, NativeEngine};

/// Text of both artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    /// C++ routines followed by the `Problem::init_functions()` block
    pub numeric: String,
    /// LaTeX `equation*` block
    pub typeset: String,
}

/// Derive and render with the native engine
pub fn generate(spec: &ProblemSpec) -> Result<GeneratedArtifacts, TwoscaleError> {
    generate_with(&NativeEngine::new(), spec)
}

/// Derive and render with any engine
pub fn generate_with<E: AlgebraEngine>(
    engine: &E,
    spec: &ProblemSpec,
) -> Result<GeneratedArtifacts, TwoscaleError> {
    let coefficients = Derivation::new(engine, spec).derive()?;
    Ok(GeneratedArtifacts {
        numeric: NumericEmitter::new(engine, &coefficients).render(),
        typeset: TypesetEmitter::new(engine, &coefficients).render(),
    })
}

/// Derive, then write the numeric and typeset artifacts
///
/// Missing parent directories are created. Existing files are overwritten.
pub fn write_artifacts(
    spec: &ProblemSpec,
    numeric_path: &Path,
    typeset_path: &Path,
) -> Result<(), TwoscaleError> {
    let engine = NativeEngine::new();
    let coefficients = Derivation::new(&engine, spec).derive()?;

    write_file(numeric_path, |out| {
        NumericEmitter::new(&engine, &coefficients).emit(out)
    })?;
    tracing::info!("Numeric routines written to {}", numeric_path.display());

    write_file(typeset_path, |out| {
        TypesetEmitter::new(&engine, &coefficients).emit(out)
    })?;
    tracing::info!("Equations written to {}", typeset_path.display());

    tracing::debug!(
        "{} slow, {} fast ({} extended) variables",
        coefficients.ns,
        coefficients.nf,
        coefficients.nf_extended()
    );
    Ok(())
}

fn write_file<F>(path: &Path, emit: F) -> Result<(), TwoscaleError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TwoscaleError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| TwoscaleError::io(path, e))?;
    let mut out = BufWriter::new(file);
    emit(&mut out).map_err(|e| TwoscaleError::io(path, e))?;
    out.flush().map_err(|e| TwoscaleError::io(path, e))
}
