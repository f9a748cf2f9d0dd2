//! `twoscale` binary: derive a problem and write both artifacts.
//!
//! # Usage
//!
//! ```bash
//! twoscale --builtin triple_well_2d functions.cpp equations.tex
//! twoscale --problem problem.json functions.cpp equations.tex
//! twoscale --library problems/ --builtin my_problem functions.cpp equations.tex
//! twoscale --list
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use twoscale::problem::{load_problem, ProblemLibrary};
use twoscale::write_artifacts;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "twoscale",
    version,
    about = "Derive homogenized coefficients of a two-scale problem",
    long_about = None
)]
struct Args {
    /// Destination of the C++ routines and solver wiring
    #[arg(value_name = "NUMERIC_OUT", required_unless_present = "list")]
    numeric_out: Option<PathBuf>,

    /// Destination of the LaTeX equation block
    #[arg(value_name = "TYPESET_OUT", required_unless_present = "list")]
    typeset_out: Option<PathBuf>,

    /// JSON problem definition
    #[arg(short, long, value_name = "FILE", conflicts_with = "builtin")]
    problem: Option<PathBuf>,

    /// Identifier of a library problem
    #[arg(short, long, value_name = "ID")]
    builtin: Option<String>,

    /// Directory of further `.json` problems, added to the built-in ones
    #[arg(long, value_name = "DIR")]
    library: Option<PathBuf>,

    /// List the library problems and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn load_library(dir: Option<&Path>) -> Result<ProblemLibrary> {
    let mut library = ProblemLibrary::builtin();
    if let Some(dir) = dir {
        info!("Loading problems from {}", dir.display());
        library
            .load_dir(dir)
            .with_context(|| format!("loading problems from {}", dir.display()))?;
    }
    Ok(library)
}

fn run(args: Args) -> Result<()> {
    let library = load_library(args.library.as_deref())?;

    if args.list {
        for id in library.list() {
            let description = library
                .get(id)
                .and_then(|p| p.description.as_deref())
                .unwrap_or("");
            println!("{id}\t{description}");
        }
        return Ok(());
    }

    let (Some(numeric_out), Some(typeset_out)) = (args.numeric_out, args.typeset_out) else {
        bail!("both NUMERIC_OUT and TYPESET_OUT are required");
    };

    let spec = match (&args.problem, &args.builtin) {
        (Some(path), _) => {
            info!("Loading problem from {}", path.display());
            load_problem(path).with_context(|| format!("loading {}", path.display()))?
        }
        (None, Some(id)) => {
            info!("Using library problem {}", id);
            library.spec(id)?
        }
        (None, None) => bail!("one of --problem or --builtin is required"),
    };

    write_artifacts(&spec, &numeric_out, &typeset_out)?;
    Ok(())
}
