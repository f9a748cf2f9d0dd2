//! Symbolic derivation of the homogenized coefficients
//!
//! With `S = s^2`, `rho = exp(-v)` and the solution `g`, the derivation
//! produces:
//!
//! - the homogenized slow drift
//!   `f_i = -1/2 sum_j rho^-1 d/dy_j (S rho dg_i/dy_j)`,
//!   accumulated one fast index at a time and simplified after every
//!   summand, so `rho` cancels;
//! - the adjoint divergence `stardivh = sum_i (dv/dy_i h_i - dh_i/dy_i)`;
//! - the linear term
//!   `lin = sum_i S/4 d^2v/dy_i^2 - S/8 (dv/dy_i)^2`;
//! - drift and diffusion of the extended fast process, whose second half
//!   `y{nf}..y{2nf-1}` follows the linearized fast dynamics;
//! - the Jacobians `gx`, `fx`, `fy` and the derivatives `vy`, `vyy`.

mod coefficients;

pub use coefficients::CoefficientSet;

use coefficients::matrix_from_rows;
use nalgebra::DMatrix;

use crate::problem::ProblemSpec;
use crate::symbolic::{AlgebraEngine, Expr, Symbol, SymbolicError};

/// One derivation run over a problem
pub struct Derivation<'a, E: AlgebraEngine> {
    engine: &'a E,
    spec: &'a ProblemSpec,
}

impl<'a, E: AlgebraEngine> Derivation<'a, E> {
    pub fn new(engine: &'a E, spec: &'a ProblemSpec) -> Self {
        Self { engine, spec }
    }

    /// Derive the complete coefficient set
    pub fn derive(&self) -> Result<CoefficientSet, SymbolicError> {
        let spec = self.spec;
        let (ns, nf) = (spec.ns(), spec.nf());
        tracing::info!("Deriving coefficients (ns = {}, nf = {})", ns, nf);

        let x = spec.slow_symbols();
        let y = spec.extended_fast_symbols();
        let big_s = self
            .engine
            .simplify(&Expr::powf(spec.s().clone(), 2.0))?;

        let gx = self.jacobian(spec.g(), &x)?;

        let vy = y[..nf]
            .iter()
            .map(|yi| self.engine.simplified_derivative(spec.v(), yi))
            .collect::<Result<Vec<_>, _>>()?;
        let vyy = self.jacobian(&vy, &y[..nf])?;
        tracing::debug!("Potential derivatives done");

        let stardivh = self.stardivh(&vy, &y[..nf])?;
        let rho = Expr::exp(-spec.v().clone());

        let f = spec
            .g()
            .iter()
            .map(|gi| self.slow_drift(gi, &rho, &big_s, &y[..nf]))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Homogenized drift done");

        let fx = self.jacobian(&f, &x)?;
        let fy = self.jacobian(&f, &y[..nf])?;
        tracing::debug!("Drift Jacobians done");

        let lin = self.linear_term(&big_s, &y[..nf])?;
        let (drif, diff) = self.extended_process(&big_s, &vy, &vyy, &y)?;
        tracing::info!("Derivation finished");

        Ok(CoefficientSet {
            ns,
            nf,
            s: spec.s().clone(),
            sigma: spec.sigma(),
            g: spec.g().to_vec(),
            h: spec.h().to_vec(),
            v: spec.v().clone(),
            gx,
            vy,
            vyy,
            rho,
            stardivh,
            f,
            fx,
            fy,
            lin,
            drif,
            diff,
        })
    }

    /// Simplified derivatives of every entry of `family` by every variable
    fn jacobian(&self, family: &[Expr], vars: &[Symbol]) -> Result<DMatrix<Expr>, SymbolicError> {
        let rows = family
            .iter()
            .map(|e| {
                vars.iter()
                    .map(|var| self.engine.simplified_derivative(e, var))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(matrix_from_rows(rows, vars.len()))
    }

    fn stardivh(&self, vy: &[Expr], y: &[Symbol]) -> Result<Expr, SymbolicError> {
        let mut terms = Vec::with_capacity(2 * y.len());
        for (i, hi) in self.spec.h().iter().enumerate() {
            terms.push(vy[i].clone() * hi.clone());
            terms.push(-self.engine.differentiate(hi, &y[i])?);
        }
        self.engine.simplify(&Expr::sum(terms))
    }

    /// `f_i`, folded over the fast variables with a simplification per step
    fn slow_drift(
        &self,
        gi: &Expr,
        rho: &Expr,
        big_s: &Expr,
        y: &[Symbol],
    ) -> Result<Expr, SymbolicError> {
        y.iter().try_fold(Expr::zero(), |acc, yj| {
            let flux = big_s.clone() * rho.clone() * self.engine.differentiate(gi, yj)?;
            let divergence = self.engine.differentiate(&flux, yj)?;
            let term = Expr::num(-0.5) * divergence / rho.clone();
            self.engine.simplify(&(acc + term))
        })
    }

    /// Summands are simplified one by one, the sum itself is left as is
    fn linear_term(&self, big_s: &Expr, y: &[Symbol]) -> Result<Expr, SymbolicError> {
        let v = self.spec.v();
        let mut terms = Vec::with_capacity(2 * y.len());
        for yi in y {
            let dv = self.engine.differentiate(v, yi)?;
            let d2v = self.engine.differentiate(&dv, yi)?;
            let curvature = Expr::num(0.25) * big_s.clone() * d2v;
            let gradient = Expr::num(0.125) * big_s.clone() * Expr::powf(dv, 2.0);
            terms.push(self.engine.simplify(&curvature)?);
            terms.push(-self.engine.simplify(&gradient)?);
        }
        Ok(Expr::sum(terms))
    }

    /// Drift and diffusion of `(y, z)` where `z` follows the linearization
    /// of the fast drift
    fn extended_process(
        &self,
        big_s: &Expr,
        vy: &[Expr],
        vyy: &DMatrix<Expr>,
        y: &[Symbol],
    ) -> Result<(Vec<Expr>, Vec<Expr>), SymbolicError> {
        let nf = self.spec.nf();
        let half_s = Expr::num(0.5) * big_s.clone();
        let mut drif = Vec::with_capacity(2 * nf);
        let mut diff = Vec::with_capacity(2 * nf);

        for vyi in vy {
            drif.push(self.engine.simplify(&-(half_s.clone() * vyi.clone()))?);
            diff.push(self.spec.s().clone());
        }
        for (i, hi) in self.spec.h().iter().enumerate() {
            let coupling = (0..nf).map(|j| {
                -(half_s.clone() * vyy[(i, j)].clone() * Expr::sym(y[nf + j].clone()))
            });
            let linearized = Expr::sum(std::iter::once(hi.clone()).chain(coupling));
            drif.push(self.engine.simplify(&linearized)?);
            diff.push(Expr::zero());
        }
        Ok((drif, diff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemLibrary;
    use crate::symbolic::{evaluate, parse, Bindings, Func, NativeEngine};
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    const POINTS: [(f64, f64); 4] = [(0.3, -0.7), (1.1, 0.4), (-0.8, 1.3), (2.0, -1.9)];

    fn quadratic() -> CoefficientSet {
        let spec = ProblemLibrary::builtin().spec("quadratic_1d").unwrap();
        Derivation::new(&NativeEngine::new(), &spec).derive().unwrap()
    }

    fn at(e: &Expr, x: f64, y0: f64, y1: f64) -> f64 {
        evaluate(e, &Bindings::from_states(&dvector![x], &dvector![y0, y1])).unwrap()
    }

    fn check(e: &Expr, expected: &str) {
        let expected = parse(expected).unwrap();
        for &(x, y) in &POINTS {
            assert_relative_eq!(
                at(e, x, y, 0.5 * y),
                at(&expected, x, y, 0.5 * y),
                max_relative = 1e-10,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_potential_derivatives() {
        let c = quadratic();
        check(&c.vy[0], "2*y0");
        check(&c.vyy[(0, 0)], "2");
        check(&c.rho, "exp(-y0^2)");
    }

    #[test]
    fn test_homogenized_drift_matches_closed_form() {
        let c = quadratic();
        // f = -1/2 (g_yy - 2 y g_y)
        let g_y = "(x0/2)*cos(x0*y0/2) - (x0/2)*sin(y0/2)";
        let g_yy = "-(x0^2/4)*sin(x0*y0/2) - (x0/4)*cos(y0/2)";
        check(&c.f[0], &format!("-0.5*(({}) - 2*y0*({}))", g_yy, g_y));
    }

    #[test]
    fn test_density_cancels_from_drift() {
        let c = quadratic();
        assert!(!c.f[0].contains_func(Func::Exp));
        assert!(c.rho.contains_func(Func::Exp));
    }

    #[test]
    fn test_stardivh() {
        let c = quadratic();
        check(
            &c.stardivh,
            "2*y0*cos(x0)*cos(y0/2) + 0.5*cos(x0)*sin(y0/2)",
        );
    }

    #[test]
    fn test_linear_term() {
        let c = quadratic();
        check(&c.lin, "0.5 - 0.5*y0^2");
    }

    #[test]
    fn test_extended_process() {
        let c = quadratic();
        assert_eq!(c.drif.len(), 2);
        assert_eq!(c.diff.len(), 2);
        check(&c.drif[0], "-y0");
        check(&c.drif[1], "cos(x0)*cos(y0/2) - y1");
        assert_eq!(c.diff[0], Expr::num(1.0));
        assert!(c.diff[1].is_zero());
    }

    #[test]
    fn test_jacobians_match_finite_differences() {
        let c = quadratic();
        let h = 1e-6;
        for &(x, y) in &POINTS {
            let fx = (at(&c.f[0], x + h, y, 0.0) - at(&c.f[0], x - h, y, 0.0)) / (2.0 * h);
            let fy = (at(&c.f[0], x, y + h, 0.0) - at(&c.f[0], x, y - h, 0.0)) / (2.0 * h);
            assert_relative_eq!(at(&c.fx[(0, 0)], x, y, 0.0), fx, max_relative = 1e-6, epsilon = 1e-7);
            assert_relative_eq!(at(&c.fy[(0, 0)], x, y, 0.0), fy, max_relative = 1e-6, epsilon = 1e-7);
        }
        check(&c.gx[(0, 0)], "(y0/2)*cos(x0*y0/2) + cos(y0/2)");
    }

    #[test]
    fn test_slow_drift_at() {
        let c = quadratic();
        let value = c.slow_drift_at(&[0.3], &[-0.7]).unwrap();
        assert_eq!(value.len(), 1);
        assert_relative_eq!(value[0], at(&c.f[0], 0.3, -0.7, 0.0));
    }

    fn one_by_one(s: f64, g: &str, h: &str, v: &str) -> CoefficientSet {
        let spec = ProblemSpec::new(
            1,
            1,
            Expr::num(s),
            1.0,
            vec![parse(g).unwrap()],
            parse(v).unwrap(),
            vec![parse(h).unwrap()],
        )
        .unwrap();
        Derivation::new(&NativeEngine::new(), &spec).derive().unwrap()
    }

    #[test]
    fn test_small_diffusion_scale_keeps_drift() {
        let c = one_by_one(1e-7, "sin(x0*y0)", "0", "y0^2");
        for &(x, y) in &POINTS {
            // f = -S/2 (g_yy - 2 y g_y) with S = 1e-14
            let expected = -0.5e-14 * (-x * x * (x * y).sin() - 2.0 * y * x * (x * y).cos());
            assert_relative_eq!(at(&c.f[0], x, y, 0.0), expected, max_relative = 1e-10);
            assert_relative_eq!(
                at(&c.lin, x, y, 0.0),
                0.5e-14 - 0.5e-14 * y * y,
                max_relative = 1e-10,
                epsilon = 1e-30
            );
        }
        assert!(!c.f[0].is_zero());
    }

    #[test]
    fn test_small_solution_term_survives_differentiation() {
        let c = one_by_one(1.0, "1e-14*x0 + x0^2*y0", "0", "y0^2");
        assert_relative_eq!(at(&c.gx[(0, 0)], 0.0, 0.0, 0.0), 1e-14);
        assert_relative_eq!(at(&c.gx[(0, 0)], 0.5, 2.0, 0.0), 2.0 + 1e-14);
        // f = -1/2 (0 - 2 y x^2) = x^2 y, and the small term has no y dependence
        assert_relative_eq!(at(&c.f[0], 1.5, 0.4, 0.0), 0.9, max_relative = 1e-12);
    }

    #[test]
    fn test_triple_well_dimensions() {
        let spec = ProblemLibrary::builtin().spec("triple_well_2d").unwrap();
        let c = Derivation::new(&NativeEngine::new(), &spec).derive().unwrap();
        assert_eq!(c.f.len(), 2);
        assert_eq!(c.fx.shape(), (2, 2));
        assert_eq!(c.fy.shape(), (2, 2));
        assert_eq!(c.vyy.shape(), (2, 2));
        assert_eq!(c.nf_extended(), 4);
        assert!(c.f.iter().all(|f| !f.contains_func(Func::Exp)));

        // the Hessian of the potential is symmetric
        let b = Bindings::from_states(&dvector![0.1, 0.2], &dvector![0.4, -0.3]);
        assert_relative_eq!(
            evaluate(&c.vyy[(0, 1)], &b).unwrap(),
            evaluate(&c.vyy[(1, 0)], &b).unwrap(),
            max_relative = 1e-10
        );
        // S = 2, so the diffusion of the original fast variables is sqrt(2)
        assert_relative_eq!(
            evaluate(&c.diff[0], &b).unwrap(),
            std::f64::consts::SQRT_2
        );
    }
}
