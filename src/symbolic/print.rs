//! Printers for C source text and LaTeX
//!
//! Both printers share the same product layout: numeric coefficient first,
//! then the numerator factors, with factors carrying a negative numeric
//! exponent moved below a fraction bar.

use crate::symbolic::expr::{Constant, Expr, Func, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Sum,
    Product,
    Atom,
}

/// Factors of a product sorted into coefficient, numerator and denominator
struct ProductParts<'a> {
    coeff: f64,
    numerator: Vec<&'a Expr>,
    denominator: Vec<Expr>,
}

fn split_product(factors: &[Expr]) -> ProductParts<'_> {
    let mut coeff = 1.0;
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for factor in factors {
        match factor {
            Expr::Num(v) => coeff *= v,
            Expr::Pow(base, exponent) => match exponent.as_num() {
                Some(n) if n < 0.0 => {
                    let base = base.as_ref().clone();
                    denominator.push(if n == -1.0 {
                        base
                    } else {
                        Expr::powf(base, -n)
                    });
                }
                _ => numerator.push(factor),
            },
            _ => numerator.push(factor),
        }
    }
    ProductParts {
        coeff,
        numerator,
        denominator,
    }
}

fn is_negative_power(expr: &Expr) -> bool {
    matches!(expr, Expr::Pow(_, exponent) if matches!(exponent.as_num(), Some(n) if n < 0.0))
}

// ─── C ───────────────────────────────────────────────────────────────────────

/// C expression text: `x[i]`/`y[i]` for state symbols, doubles for literals,
/// `pow`, `sqrt` and the `<cmath>` functions
pub fn code(expr: &Expr) -> String {
    code_prec(expr).0
}

fn c_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{:?}", value)
    }
}

fn code_wrap(expr: &Expr, min: Prec) -> String {
    let (text, prec) = code_prec(expr);
    if prec < min {
        format!("({})", text)
    } else {
        text
    }
}

fn code_prec(expr: &Expr) -> (String, Prec) {
    match expr {
        Expr::Num(v) if *v < 0.0 => (c_number(*v), Prec::Product),
        Expr::Num(v) => (c_number(*v), Prec::Atom),
        Expr::Const(Constant::Pi) => ("M_PI".to_string(), Prec::Atom),
        Expr::Const(Constant::E) => ("M_E".to_string(), Prec::Atom),
        Expr::Sym(symbol) => (
            match symbol.slot() {
                Slot::Slow(i) => format!("x[{}]", i),
                Slot::Fast(i) => format!("y[{}]", i),
            },
            Prec::Atom,
        ),
        Expr::Add(terms) => (code_sum(terms), Prec::Sum),
        Expr::Mul(factors) => (signed(code_product(factors)), Prec::Product),
        Expr::Pow(_, _) if is_negative_power(expr) => (
            signed(code_product(std::slice::from_ref(expr))),
            Prec::Product,
        ),
        Expr::Pow(base, exponent) => {
            if exponent.as_num() == Some(0.5) {
                return (format!("sqrt({})", code(base)), Prec::Atom);
            }
            let exponent = match exponent.as_integer() {
                Some(n) => n.to_string(),
                None => code(exponent),
            };
            (format!("pow({}, {})", code(base), exponent), Prec::Atom)
        }
        Expr::Call(func, arg) => {
            let name = match func {
                Func::Sin => "sin",
                Func::Cos => "cos",
                Func::Tan => "tan",
                Func::Exp => "exp",
                Func::Ln => "log",
            };
            (format!("{}({})", name, code(arg)), Prec::Atom)
        }
    }
}

fn signed((negative, body): (bool, String)) -> String {
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Sign and magnitude text of a product
fn code_product(factors: &[Expr]) -> (bool, String) {
    let parts = split_product(factors);
    let negative = parts.coeff < 0.0;
    let coeff = parts.coeff.abs();

    let mut numerator = Vec::with_capacity(parts.numerator.len() + 1);
    if coeff != 1.0 || parts.numerator.is_empty() {
        numerator.push(c_number(coeff));
    }
    numerator.extend(parts.numerator.iter().map(|f| code_wrap(f, Prec::Product)));
    let mut body = numerator.join("*");

    match parts.denominator.as_slice() {
        [] => {}
        [single] => {
            body.push('/');
            body.push_str(&code_wrap(single, Prec::Atom));
        }
        many => {
            let den: Vec<String> = many.iter().map(|f| code_wrap(f, Prec::Product)).collect();
            body.push_str(&format!("/({})", den.join("*")));
        }
    }
    (negative, body)
}

fn code_signed_term(term: &Expr) -> (bool, String) {
    match term {
        Expr::Num(v) => (*v < 0.0, c_number(v.abs())),
        Expr::Mul(factors) => code_product(factors),
        _ if is_negative_power(term) => code_product(std::slice::from_ref(term)),
        _ => (false, code_wrap(term, Prec::Sum)),
    }
}

fn code_sum(terms: &[Expr]) -> String {
    join_sum(terms.iter().map(code_signed_term))
}

fn join_sum(terms: impl Iterator<Item = (bool, String)>) -> String {
    let mut out = String::new();
    for (i, (negative, body)) in terms.enumerate() {
        match (i, negative) {
            (0, true) => out.push('-'),
            (0, false) => {}
            (_, true) => out.push_str(" - "),
            (_, false) => out.push_str(" + "),
        }
        out.push_str(&body);
    }
    out
}

// ─── LaTeX ───────────────────────────────────────────────────────────────────

/// LaTeX text in the style of a computer-algebra pretty printer
pub fn latex(expr: &Expr) -> String {
    latex_prec(expr).0
}

fn latex_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn paren(text: &str) -> String {
    format!("\\left({}\\right)", text)
}

fn latex_wrap(expr: &Expr, min: Prec) -> String {
    let (text, prec) = latex_prec(expr);
    if prec < min {
        paren(&text)
    } else {
        text
    }
}

fn latex_prec(expr: &Expr) -> (String, Prec) {
    match expr {
        Expr::Num(v) if *v < 0.0 => (latex_number(*v), Prec::Product),
        Expr::Num(v) => (latex_number(*v), Prec::Atom),
        Expr::Const(Constant::Pi) => ("\\pi".to_string(), Prec::Atom),
        Expr::Const(Constant::E) => ("e".to_string(), Prec::Atom),
        Expr::Sym(symbol) => (
            match symbol.slot() {
                Slot::Slow(i) => format!("x_{{{}}}", i),
                Slot::Fast(i) => format!("y_{{{}}}", i),
            },
            Prec::Atom,
        ),
        Expr::Add(terms) => (
            join_sum(terms.iter().map(latex_signed_term)),
            Prec::Sum,
        ),
        Expr::Mul(factors) => (signed(latex_product(factors)), Prec::Product),
        Expr::Pow(_, _) if is_negative_power(expr) => (
            signed(latex_product(std::slice::from_ref(expr))),
            Prec::Product,
        ),
        Expr::Pow(base, exponent) => {
            if exponent.as_num() == Some(0.5) {
                return (format!("\\sqrt{{{}}}", latex(base)), Prec::Atom);
            }
            let exponent = latex(exponent);
            let text = match base.as_ref() {
                Expr::Call(func, arg) if *func != Func::Exp => format!(
                    "\\{}^{{{}}}{{\\left({} \\right)}}",
                    func_name(*func),
                    exponent,
                    latex(arg)
                ),
                Expr::Sym(_) | Expr::Const(_) => format!("{}^{{{}}}", latex(base), exponent),
                Expr::Num(v) if *v >= 0.0 => format!("{}^{{{}}}", latex(base), exponent),
                _ => format!("{}^{{{}}}", paren(&latex(base)), exponent),
            };
            (text, Prec::Atom)
        }
        Expr::Call(Func::Exp, arg) => (format!("e^{{{}}}", latex(arg)), Prec::Atom),
        Expr::Call(func, arg) => (
            format!("\\{}{{\\left({} \\right)}}", func_name(*func), latex(arg)),
            Prec::Atom,
        ),
    }
}

fn func_name(func: Func) -> &'static str {
    match func {
        Func::Sin => "sin",
        Func::Cos => "cos",
        Func::Tan => "tan",
        Func::Exp => "exp",
        Func::Ln => "log",
    }
}

/// Denominator factors; a lone sum needs no parentheses under a fraction bar
fn latex_denominator(factors: &[Expr]) -> String {
    let min = if factors.len() > 1 {
        Prec::Product
    } else {
        Prec::Sum
    };
    factors
        .iter()
        .map(|f| latex_wrap(f, min))
        .collect::<Vec<_>>()
        .join(" ")
}

fn latex_product(factors: &[Expr]) -> (bool, String) {
    let parts = split_product(factors);
    let negative = parts.coeff < 0.0;
    let coeff = parts.coeff.abs();

    let mut numerator = Vec::with_capacity(parts.numerator.len() + 1);
    if coeff != 1.0 || parts.numerator.is_empty() {
        numerator.push(latex_number(coeff));
    }
    let items = numerator.len() + parts.numerator.len();
    let min = if items > 1 || parts.denominator.is_empty() {
        Prec::Product
    } else {
        Prec::Sum
    };
    numerator.extend(parts.numerator.iter().map(|f| latex_wrap(f, min)));
    let numerator = numerator.join(" ");

    if parts.denominator.is_empty() {
        return (negative, numerator);
    }
    let denominator = latex_denominator(&parts.denominator);
    (
        negative,
        format!("\\frac{{{}}}{{{}}}", numerator, denominator),
    )
}

fn latex_signed_term(term: &Expr) -> (bool, String) {
    match term {
        Expr::Num(v) => (*v < 0.0, latex_number(v.abs())),
        Expr::Mul(factors) => latex_product(factors),
        _ if is_negative_power(term) => latex_product(std::slice::from_ref(term)),
        _ => (false, latex_wrap(term, Prec::Sum)),
    }
}
