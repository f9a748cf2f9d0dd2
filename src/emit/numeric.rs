//! C++ routines and solver wiring

use std::io::Write;

use crate::derivation::CoefficientSet;
use crate::emit::{array_initializer, EmittedFunction};
use crate::symbolic::{AlgebraEngine, Expr};

/// Emitter for the numeric evaluation routines
pub struct NumericEmitter<'a, E: AlgebraEngine> {
    engine: &'a E,
    coefficients: &'a CoefficientSet,
}

impl<'a, E: AlgebraEngine> NumericEmitter<'a, E> {
    pub fn new(engine: &'a E, coefficients: &'a CoefficientSet) -> Self {
        Self {
            engine,
            coefficients,
        }
    }

    fn function(&self, name: String, expr: &Expr) -> EmittedFunction {
        EmittedFunction {
            body: self.engine.print_code(expr),
            name,
            expr: expr.clone(),
        }
    }

    /// All routines in emission order
    pub fn functions(&self) -> Vec<EmittedFunction> {
        let c = self.coefficients;
        let mut out = vec![
            self.function("stardiv_h_n".to_string(), &c.stardivh),
            self.function("potential_n".to_string(), &c.v),
            self.function("linearTerm_n".to_string(), &c.lin),
            self.function("zrho_n".to_string(), &c.rho),
        ];
        for i in 0..c.ns {
            out.push(self.function(format!("phi{}", i), &c.g[i]));
            out.push(self.function(format!("a{}", i), &c.f[i]));
            for j in 0..c.ns {
                out.push(self.function(format!("dxphi{}{}", i, j), &c.gx[(i, j)]));
                out.push(self.function(format!("dxa{}{}", i, j), &c.fx[(i, j)]));
            }
            for j in 0..c.nf {
                out.push(self.function(format!("dya{}{}", i, j), &c.fy[(i, j)]));
            }
        }
        for i in 0..c.nf {
            out.push(self.function(format!("dyv{}", i), &c.vy[i]));
            out.push(self.function(format!("h{}", i), &c.h[i]));
        }
        for i in 0..c.nf_extended() {
            out.push(self.function(format!("drif{}", i), &c.drif[i]));
            out.push(self.function(format!("diff{}", i), &c.diff[i]));
        }
        out
    }

    /// The `Problem::init_functions()` block
    pub fn wiring(&self) -> String {
        let c = self.coefficients;
        let (ns, nf) = (c.ns, c.nf);
        let fields: [(&str, Vec<usize>); 13] = [
            ("stardiv_h", vec![]),
            ("zrho", vec![]),
            ("linearTerm", vec![]),
            ("potential", vec![]),
            ("dyv", vec![nf]),
            ("h", vec![nf]),
            ("a", vec![ns]),
            ("dxa", vec![ns, ns]),
            ("dya", vec![ns, nf]),
            ("phi", vec![ns]),
            ("dxphi", vec![ns, ns]),
            ("drif", vec![2 * nf]),
            ("diff", vec![2 * nf]),
        ];

        let mut out = format!(
            r#"void Problem::init_functions() {{

    ns = {ns};
    nf = {nf};
    s = {s};
    sigma = {sigma:?};

"#,
            ns = ns,
            nf = nf,
            s = self.engine.print_code(&c.s),
            sigma = c.sigma,
        );
        for (field, dims) in fields {
            let value = if dims.is_empty() {
                format!("{}_n", field)
            } else {
                array_initializer(field, &dims)
            };
            out.push_str(&format!("    {} = {};\n", field, value));
        }
        out.push_str("}\n");
        out
    }

    /// The complete numeric artifact
    pub fn render(&self) -> String {
        let mut out: String = self.functions().iter().map(|f| f.to_string()).collect();
        out.push_str(&self.wiring());
        out
    }

    pub fn emit<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let functions = self.functions();
        tracing::debug!("Emitting {} numeric routines", functions.len());
        for function in &functions {
            write!(out, "{}", function)?;
        }
        out.write_all(self.wiring().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::Derivation;
    use crate::problem::ProblemLibrary;
    use crate::symbolic::NativeEngine;

    fn emitted(id: &str) -> (Vec<EmittedFunction>, String) {
        let engine = NativeEngine::new();
        let spec = ProblemLibrary::builtin().spec(id).unwrap();
        let coefficients = Derivation::new(&engine, &spec).derive().unwrap();
        let emitter = NumericEmitter::new(&engine, &coefficients);
        (emitter.functions(), emitter.render())
    }

    #[test]
    fn test_function_order_1d() {
        let (functions, _) = emitted("quadratic_1d");
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "stardiv_h_n",
                "potential_n",
                "linearTerm_n",
                "zrho_n",
                "phi0",
                "a0",
                "dxphi00",
                "dxa00",
                "dya00",
                "dyv0",
                "h0",
                "drif0",
                "diff0",
                "drif1",
                "diff1",
            ]
        );
    }

    #[test]
    fn test_function_count_2d() {
        let (functions, _) = emitted("quartic_2d");
        // 4 scalars, per slow: 2 + 2*ns + nf, per fast: 2, per extended: 2
        assert_eq!(functions.len(), 4 + 2 * (2 + 4 + 2) + 2 * 2 + 2 * 4);
    }

    #[test]
    fn test_wiring_1d() {
        let (_, text) = emitted("quadratic_1d");
        let expected = "void Problem::init_functions() {

    ns = 1;
    nf = 1;
    s = 1.0;
    sigma = 1.0;

    stardiv_h = stardiv_h_n;
    zrho = zrho_n;
    linearTerm = linearTerm_n;
    potential = potential_n;
    dyv = {dyv0};
    h = {h0};
    a = {a0};
    dxa = {{dxa00}};
    dya = {{dya00}};
    phi = {phi0};
    dxphi = {{dxphi00}};
    drif = {drif0, drif1};
    diff = {diff0, diff1};
}
";
        assert!(text.ends_with(expected));
    }

    #[test]
    fn test_simple_bodies_1d() {
        let (functions, _) = emitted("quadratic_1d");
        let body = |name: &str| {
            functions
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.body.clone())
                .unwrap()
        };
        assert_eq!(body("dyv0"), "2.0*y[0]");
        assert_eq!(body("potential_n"), "pow(y[0], 2)");
        assert_eq!(body("zrho_n"), "exp(-pow(y[0], 2))");
        assert_eq!(body("diff0"), "1.0");
        assert_eq!(body("diff1"), "0.0");
        assert_eq!(body("drif0"), "-y[0]");
    }

    #[test]
    fn test_wiring_2d_diffusion_scale() {
        let (_, text) = emitted("triple_well_2d");
        assert!(text.contains("    s = sqrt(2.0);\n"));
        assert!(text.contains("    sigma = 0.35;\n"));
        assert!(text.contains("    dxa = {{dxa00, dxa01}, {dxa10, dxa11}};\n"));
        assert!(text.contains("    drif = {drif0, drif1, drif2, drif3};\n"));
    }
}
