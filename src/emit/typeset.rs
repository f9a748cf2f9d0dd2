//! LaTeX rendering of the two-scale system

use std::io::Write;

use crate::derivation::CoefficientSet;
use crate::symbolic::{AlgebraEngine, Expr, Symbol};

/// Emitter for the `equation*` block
pub struct TypesetEmitter<'a, E: AlgebraEngine> {
    engine: &'a E,
    coefficients: &'a CoefficientSet,
}

impl<'a, E: AlgebraEngine> TypesetEmitter<'a, E> {
    pub fn new(engine: &'a E, coefficients: &'a CoefficientSet) -> Self {
        Self {
            engine,
            coefficients,
        }
    }

    fn tex(&self, expr: &Expr) -> String {
        self.engine.print_latex(expr)
    }

    fn slow_row(&self, i: usize) -> String {
        format!(
            "        d{x} &=  -\\frac{{1}}{{\\varepsilon}}\\,\\op{{L}}\\left[{g}\\right]\\,dt\\\\\n",
            x = self.tex(&Expr::sym(Symbol::slow(i))),
            g = self.tex(&self.coefficients.g[i]),
        )
    }

    fn fast_row(&self, i: usize) -> String {
        format!(
            "        d{y} &=  \\frac{{1}}{{\\varepsilon^2}}\\,\\partial_{{ {y} }} V(x,y)\\,dt + \\frac{{1}}{{\\varepsilon}}\\left[{h}\\right]+\\frac{{ {s} }}{{\\varepsilon}}\\,dW_{i}\\\\\n",
            y = self.tex(&Expr::sym(Symbol::fast(i))),
            h = self.tex(&self.coefficients.h[i]),
            s = self.tex(&self.coefficients.s),
            i = i,
        )
    }

    /// The complete typeset artifact
    pub fn render(&self) -> String {
        let c = self.coefficients;
        let mut out = String::from("\\begin{equation*}\n    \\left\\{\\begin{aligned}\n");
        for i in 0..c.ns {
            out.push_str(&self.slow_row(i));
        }
        for i in 0..c.nf {
            out.push_str(&self.fast_row(i));
        }
        out.push_str("    \\end{aligned}\\right.\n\\end{equation*}\n");
        out.push_str(&format!("with $V(x,y) = {}$.\n", self.tex(&c.v)));
        out
    }

    pub fn emit<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        tracing::debug!(
            "Typesetting {} slow and {} fast equations",
            self.coefficients.ns,
            self.coefficients.nf
        );
        out.write_all(self.render().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::Derivation;
    use crate::problem::ProblemLibrary;
    use crate::symbolic::NativeEngine;

    fn rendered(id: &str) -> String {
        let engine = NativeEngine::new();
        let spec = ProblemLibrary::builtin().spec(id).unwrap();
        let coefficients = Derivation::new(&engine, &spec).derive().unwrap();
        TypesetEmitter::new(&engine, &coefficients).render()
    }

    #[test]
    fn test_typeset_1d() {
        let text = rendered("quadratic_1d");
        let expected = r"\begin{equation*}
    \left\{\begin{aligned}
        dx_{0} &=  -\frac{1}{\varepsilon}\,\op{L}\left[\sin{\left(\frac{x_{0} y_{0}}{2} \right)} + x_{0} \cos{\left(\frac{y_{0}}{2} \right)}\right]\,dt\\
        dy_{0} &=  \frac{1}{\varepsilon^2}\,\partial_{ y_{0} } V(x,y)\,dt + \frac{1}{\varepsilon}\left[\cos{\left(x_{0} \right)} \cos{\left(0.5 y_{0} \right)}\right]+\frac{ 1 }{\varepsilon}\,dW_0\\
    \end{aligned}\right.
\end{equation*}
with $V(x,y) = y_{0}^{2}$.
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_typeset_rows_2d() {
        let text = rendered("triple_well_2d");
        assert_eq!(text.matches("        dx_{").count(), 2);
        assert_eq!(text.matches("        dy_{").count(), 2);
        assert!(text.contains(r"+\frac{ \sqrt{2} }{\varepsilon}\,dW_1\\"));
        assert!(text.starts_with("\\begin{equation*}\n"));
    }
}
