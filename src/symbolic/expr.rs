//! Expression tree and symbols
//!
//! Expressions are immutable values. Subtraction is represented as
//! `a + (-1)*b`, division as `a * b^-1` and square roots as `a^0.5`, so the
//! tree only needs n-ary sums and products, powers and unary calls.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Domain tag attached to every symbol, state variables are real
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    Real,
    Complex,
}

/// Position of a symbol in the slow or (extended) fast state vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Slow(usize),
    Fast(usize),
}

/// An algebraic variable
///
/// State symbols are created through [`Symbol::slow`] and [`Symbol::fast`],
/// which name them `x{i}` and `y{i}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    slot: Slot,
    name: String,
    domain: Domain,
}

impl Symbol {
    /// Slow state variable `x{index}`
    pub fn slow(index: usize) -> Self {
        Self {
            slot: Slot::Slow(index),
            name: format!("x{}", index),
            domain: Domain::Real,
        }
    }

    /// Fast state variable `y{index}`
    pub fn fast(index: usize) -> Self {
        Self {
            slot: Slot::Fast(index),
            name: format!("y{}", index),
            domain: Domain::Real,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Named mathematical constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Unary functions understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
}

impl Func {
    /// Look up a function by the name used in problem definitions
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "exp" => Some(Func::Exp),
            "ln" | "log" => Some(Func::Ln),
            _ => None,
        }
    }

    pub fn apply(self, arg: f64) -> f64 {
        match self {
            Func::Sin => arg.sin(),
            Func::Cos => arg.cos(),
            Func::Tan => arg.tan(),
            Func::Exp => arg.exp(),
            Func::Ln => arg.ln(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Num(f64),
    Const(Constant),
    Sym(Symbol),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Numeric literal; negative zero is normalized to zero
    pub fn num(value: f64) -> Self {
        if value == 0.0 {
            Expr::Num(0.0)
        } else {
            Expr::Num(value)
        }
    }

    pub fn zero() -> Self {
        Expr::Num(0.0)
    }

    pub fn one() -> Self {
        Expr::Num(1.0)
    }

    pub fn sym(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }

    pub fn constant(constant: Constant) -> Self {
        Expr::Const(constant)
    }

    /// Sum of all terms, flattening nested sums
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        for term in terms {
            match term {
                Expr::Add(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Expr::zero(),
            1 => flat.remove(0),
            _ => Expr::Add(flat),
        }
    }

    /// Product of all factors, flattening nested products
    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        for factor in factors {
            match factor {
                Expr::Mul(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Expr::one(),
            1 => flat.remove(0),
            _ => Expr::Mul(flat),
        }
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn powf(base: Expr, exponent: f64) -> Self {
        Expr::pow(base, Expr::num(exponent))
    }

    pub fn sqrt(arg: Expr) -> Self {
        Expr::powf(arg, 0.5)
    }

    pub fn recip(arg: Expr) -> Self {
        Expr::powf(arg, -1.0)
    }

    pub fn call(func: Func, arg: Expr) -> Self {
        Expr::Call(func, Box::new(arg))
    }

    pub fn exp(arg: Expr) -> Self {
        Expr::call(Func::Exp, arg)
    }

    pub fn ln(arg: Expr) -> Self {
        Expr::call(Func::Ln, arg)
    }

    pub fn sin(arg: Expr) -> Self {
        Expr::call(Func::Sin, arg)
    }

    pub fn cos(arg: Expr) -> Self {
        Expr::call(Func::Cos, arg)
    }

    pub fn tan(arg: Expr) -> Self {
        Expr::call(Func::Tan, arg)
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_num() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_num() == Some(1.0)
    }

    /// Integer value of a numeric literal, if it has one
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expr::Num(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(*v as i64),
            _ => None,
        }
    }

    /// Whether `symbol` occurs anywhere in the tree
    pub fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) => false,
            Expr::Sym(s) => s == symbol,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| e.contains(symbol)),
            Expr::Pow(base, exponent) => base.contains(symbol) || exponent.contains(symbol),
            Expr::Call(_, arg) => arg.contains(symbol),
        }
    }

    /// Whether `func` is applied anywhere in the tree
    pub fn contains_func(&self, func: Func) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) | Expr::Sym(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| e.contains_func(func)),
            Expr::Pow(base, exponent) => base.contains_func(func) || exponent.contains_func(func),
            Expr::Call(f, arg) => *f == func || arg.contains_func(func),
        }
    }

    /// All symbols of the tree, in symbol order
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Num(_) | Expr::Const(_) => {}
            Expr::Sym(s) => {
                out.insert(s.clone());
            }
            Expr::Add(items) | Expr::Mul(items) => {
                items.iter().for_each(|e| e.collect_symbols(out));
            }
            Expr::Pow(base, exponent) => {
                base.collect_symbols(out);
                exponent.collect_symbols(out);
            }
            Expr::Call(_, arg) => arg.collect_symbols(out),
        }
    }

    /// True when the expression has no symbols at all
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Const(_) => true,
            Expr::Sym(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().all(Expr::is_constant),
            Expr::Pow(base, exponent) => base.is_constant() && exponent.is_constant(),
            Expr::Call(_, arg) => arg.is_constant(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Expr::Num(_) => 0,
            Expr::Const(_) => 1,
            Expr::Sym(_) => 2,
            Expr::Call(..) => 3,
            Expr::Pow(..) => 4,
            Expr::Mul(_) => 5,
            Expr::Add(_) => 6,
        }
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Expr::Num(a), Expr::Num(b)) => a.total_cmp(b),
            (Expr::Const(a), Expr::Const(b)) => a.cmp(b),
            (Expr::Sym(a), Expr::Sym(b)) => a.cmp(b),
            (Expr::Call(f, a), Expr::Call(g, b)) => f.cmp(g).then_with(|| a.cmp(b)),
            (Expr::Pow(a, x), Expr::Pow(b, y)) => a.cmp(b).then_with(|| x.cmp(y)),
            (Expr::Mul(a), Expr::Mul(b)) | (Expr::Add(a), Expr::Add(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Expr {}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::num(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Sym(symbol)
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::sum([self, rhs])
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sum([self, -rhs])
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::product([self, rhs])
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::product([self, Expr::recip(rhs)])
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::product([Expr::num(-1.0), self])
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::print::code(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_names() {
        assert_eq!(Symbol::slow(3).name(), "x3");
        assert_eq!(Symbol::fast(0).name(), "y0");
        assert_eq!(Symbol::fast(2).slot(), Slot::Fast(2));
        assert_eq!(Symbol::slow(0).domain(), Domain::Real);
        assert_ne!(Symbol::slow(1), Symbol::fast(1));
    }

    #[test]
    fn test_constructors_flatten() {
        let x = Expr::sym(Symbol::slow(0));
        let y = Expr::sym(Symbol::fast(0));
        let e = (x.clone() + y.clone()) + x.clone();
        assert!(matches!(&e, Expr::Add(items) if items.len() == 3));

        let p = (x.clone() * y.clone()) * x;
        assert!(matches!(&p, Expr::Mul(items) if items.len() == 3));
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(Expr::num(-0.0), Expr::zero());
        assert!(Expr::num(-0.0).is_zero());
    }

    #[test]
    fn test_ordering_is_total() {
        let mut items = vec![
            Expr::sym(Symbol::fast(1)),
            Expr::num(2.0),
            Expr::sin(Expr::sym(Symbol::slow(0))),
            Expr::sym(Symbol::slow(0)),
            Expr::constant(Constant::Pi),
        ];
        items.sort();
        assert_eq!(items[0], Expr::num(2.0));
        assert_eq!(items[1], Expr::constant(Constant::Pi));
        assert_eq!(items[2], Expr::sym(Symbol::slow(0)));
        assert_eq!(items[3], Expr::sym(Symbol::fast(1)));
    }

    #[test]
    fn test_free_symbols_and_contains() {
        let x = Symbol::slow(0);
        let y = Symbol::fast(1);
        let e = Expr::sin(Expr::sym(x.clone()) * Expr::sym(y.clone())) + Expr::num(1.0);
        let symbols: Vec<_> = e.free_symbols().into_iter().collect();
        assert_eq!(symbols, vec![x.clone(), y.clone()]);
        assert!(e.contains(&x));
        assert!(!e.contains(&Symbol::fast(0)));
        assert!(e.contains_func(Func::Sin));
        assert!(!e.contains_func(Func::Exp));
        assert!(!e.is_constant());
        assert!(Expr::cos(Expr::constant(Constant::Pi)).is_constant());
    }
}
