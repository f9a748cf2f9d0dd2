//! Minimal computer-algebra engine
//!
//! Covers the operator set needed by the derivation: sums, products, powers
//! and the functions `sin`, `cos`, `tan`, `exp` and `ln`. The
//! [`AlgebraEngine`] trait is the seam the derivation and the emitters are
//! written against; [`NativeEngine`] implements it on top of [`Expr`].
//!
//! ```ignore
//! use twoscale::symbolic::{parse, AlgebraEngine, NativeEngine, Symbol};
//!
//! let engine = NativeEngine::new();
//! let v = parse("y0^2")?;
//! let dv = engine.simplified_derivative(&v, &Symbol::fast(0))?;
//! assert_eq!(engine.print_code(&dv), "2.0*y[0]");
//! ```

mod diff;
mod engine;
mod errors;
mod eval;
mod expr;
mod parser;
pub mod print;
mod simplify;

pub use diff::{differentiate, differentiate_n};
pub use engine::{AlgebraEngine, NativeEngine};
pub use errors::SymbolicError;
pub use eval::{evaluate, Bindings};
pub use expr::{Constant, Domain, Expr, Func, Slot, Symbol};
pub use parser::{parse, tokenize, Token};
pub use simplify::{Simplifier, DEFAULT_MAX_DEPTH};
