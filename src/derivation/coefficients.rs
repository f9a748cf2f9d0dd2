use nalgebra::{DMatrix, DVector};

use crate::symbolic::{evaluate, Bindings, Expr, SymbolicError};

/// Everything the emitters need, derived once from a problem
///
/// Vectors are indexed by slow (`g`, `f`) or fast (`h`, `vy`) variable,
/// `drif` and `diff` by extended fast variable. Matrix rows follow the
/// differentiated family, columns the variable.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    pub ns: usize,
    pub nf: usize,
    /// Diffusion scale
    pub s: Expr,
    pub sigma: f64,
    /// Solution
    pub g: Vec<Expr>,
    /// Auxiliary fast drift
    pub h: Vec<Expr>,
    /// Potential
    pub v: Expr,
    /// `d g_i / d x_j`
    pub gx: DMatrix<Expr>,
    /// `d v / d y_i`
    pub vy: Vec<Expr>,
    /// `d^2 v / d y_i d y_j`
    pub vyy: DMatrix<Expr>,
    /// Unnormalized invariant density `exp(-v)`
    pub rho: Expr,
    /// Adjoint divergence of `h` with respect to `rho`
    pub stardivh: Expr,
    /// Homogenized slow drift
    pub f: Vec<Expr>,
    /// `d f_i / d x_j`
    pub fx: DMatrix<Expr>,
    /// `d f_i / d y_j`
    pub fy: DMatrix<Expr>,
    /// Linear term of the transformed fast generator
    pub lin: Expr,
    /// Drift of the extended fast process
    pub drif: Vec<Expr>,
    /// Diffusion of the extended fast process
    pub diff: Vec<Expr>,
}

impl CoefficientSet {
    /// Number of extended fast variables
    pub fn nf_extended(&self) -> usize {
        2 * self.nf
    }

    /// Value of `f` at a slow/fast state
    pub fn slow_drift_at(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>, SymbolicError> {
        let bindings = Bindings::from_states(
            &DVector::from_column_slice(x),
            &DVector::from_column_slice(y),
        );
        self.f.iter().map(|f| evaluate(f, &bindings)).collect()
    }
}

/// Build a matrix from row-major rows
pub(crate) fn matrix_from_rows(rows: Vec<Vec<Expr>>, ncols: usize) -> DMatrix<Expr> {
    let nrows = rows.len();
    DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j].clone())
}
