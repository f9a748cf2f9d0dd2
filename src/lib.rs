pub mod derivation;
pub mod emit;
pub mod error;
pub mod pipeline;
pub mod problem;
pub mod symbolic;

pub use crate::derivation::{CoefficientSet, Derivation};
pub use crate::emit::{array_initializer, EmittedFunction, NumericEmitter, TypesetEmitter};
pub use crate::pipeline::{generate, generate_with, write_artifacts, GeneratedArtifacts};
pub use crate::problem::{
    load_problem, parse_problem, validate_problem, ConfigError, ProblemDefinition,
    ProblemLibrary, ProblemSpec, Validator,
};
pub use crate::symbolic::{AlgebraEngine, Expr, NativeEngine, Symbol, SymbolicError};
pub use error::TwoscaleError;

pub mod prelude {
    pub mod problem {
        pub use crate::problem::{
            library::ProblemLibrary, ExpressionOrNumber, ProblemDefinition, ProblemSpec,
            Validator,
        };
    }
    pub mod symbolic {
        pub use crate::symbolic::{
            differentiate, evaluate, parse, print, AlgebraEngine, Bindings, Expr, Func,
            NativeEngine, Simplifier, Symbol,
        };
    }

    pub use crate::derivation::{CoefficientSet, Derivation};
    pub use crate::emit::{NumericEmitter, TypesetEmitter};
    pub use crate::pipeline::{generate, write_artifacts, GeneratedArtifacts};
    pub use crate::TwoscaleError;
}
