//! Tokenizer and recursive-descent parser for infix expressions
//!
//! Accepts the expressions written in problem definitions as well as the
//! C text produced by [`super::print::code`], so emitted routines can be read
//! back and checked.

use crate::symbolic::errors::SymbolicError;
use crate::symbolic::expr::{Constant, Expr, Func, Symbol};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Num(f64),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Op(char),
    Pow,
}

/// Split expression text into tokens
pub fn tokenize(s: &str) -> Result<Vec<Token>, SymbolicError> {
    scan(s).map(|(toks, _)| toks)
}

/// Tokens together with the character offset each one starts at
fn scan(s: &str) -> Result<(Vec<Token>, Vec<usize>), SymbolicError> {
    let mut toks = Vec::new();
    let mut offsets = Vec::new();
    let mut chars = s.chars().enumerate().peekable();
    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        offsets.push(pos);
        if c.is_ascii_digit() || c == '.' {
            let mut num = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit()
                    || d == '.'
                    || d == 'e'
                    || d == 'E'
                    || ((d == '+' || d == '-') && (num.ends_with('e') || num.ends_with('E')))
                {
                    num.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = num
                .parse::<f64>()
                .map_err(|_| SymbolicError::parse(pos, format!("invalid number '{}'", num)))?;
            toks.push(Token::Num(value));
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            let mut id = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_alphanumeric() || d == '_' {
                    id.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            toks.push(Token::Ident(id));
            continue;
        }
        chars.next();
        match c {
            '(' => toks.push(Token::LParen),
            ')' => toks.push(Token::RParen),
            '[' => toks.push(Token::LBracket),
            ']' => toks.push(Token::RBracket),
            ',' => toks.push(Token::Comma),
            '^' => toks.push(Token::Pow),
            '*' => {
                if let Some(&(_, '*')) = chars.peek() {
                    chars.next();
                    toks.push(Token::Pow);
                } else {
                    toks.push(Token::Op('*'));
                }
            }
            '+' | '-' | '/' => toks.push(Token::Op(c)),
            other => {
                return Err(SymbolicError::parse(
                    pos,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }
    Ok((toks, offsets))
}

/// Parse a complete expression
pub fn parse(text: &str) -> Result<Expr, SymbolicError> {
    let (tokens, offsets) = scan(text)?;
    let mut parser = Parser::new(tokens, offsets, text.chars().count());
    let expr = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(SymbolicError::parse(
            parser.offset(parser.pos),
            format!("unexpected trailing token {:?}", tok),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    offsets: Vec<usize>,
    end: usize,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>, offsets: Vec<usize>, end: usize) -> Self {
        Self {
            tokens,
            offsets,
            end,
            pos: 0,
        }
    }

    /// Character offset of the token at `index`, or the end of the text
    fn offset(&self, index: usize) -> usize {
        self.offsets.get(index).copied().unwrap_or(self.end)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), SymbolicError> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(SymbolicError::parse(
                self.offset(self.pos - 1),
                format!("expected {:?}, found {:?}", expected, tok),
            )),
            None => Err(SymbolicError::parse(
                self.end,
                format!("expected {:?}, found end of input", expected),
            )),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, SymbolicError> {
        self.parse_add_sub()
    }

    fn parse_add_sub(&mut self) -> Result<Expr, SymbolicError> {
        let mut node = self.parse_mul_div()?;
        loop {
            match self.peek() {
                Some(Token::Op('+')) => {
                    self.next();
                    let rhs = self.parse_mul_div()?;
                    node = node + rhs;
                }
                Some(Token::Op('-')) => {
                    self.next();
                    let rhs = self.parse_mul_div()?;
                    node = node - rhs;
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_mul_div(&mut self) -> Result<Expr, SymbolicError> {
        let mut node = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Op('*')) => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    node = node * rhs;
                }
                Some(Token::Op('/')) => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    node = node / rhs;
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Expr, SymbolicError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.next();
                let rhs = self.parse_unary()?;
                // keep literals like -2.0 as a single number
                Ok(match rhs {
                    Expr::Num(v) => Expr::num(-v),
                    other => -other,
                })
            }
            Some(Token::Op('+')) => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, SymbolicError> {
        let base = self.parse_primary()?;
        if let Some(Token::Pow) = self.peek() {
            self.next();
            let exponent = self.parse_unary()?;
            return Ok(Expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, SymbolicError> {
        let start = self.offset(self.pos);
        match self.next() {
            Some(Token::Num(v)) => Ok(Expr::num(v)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(id)) => match self.peek() {
                Some(Token::LParen) => {
                    self.next();
                    let args = self.parse_args()?;
                    self.build_call(start, &id, args)
                }
                Some(Token::LBracket) => {
                    self.next();
                    let index = match self.next() {
                        Some(Token::Num(v)) if v >= 0.0 && v.fract() == 0.0 => v as usize,
                        Some(other) => {
                            return Err(SymbolicError::parse(
                                self.offset(self.pos - 1),
                                format!("expected a non-negative integer index, found {:?}", other),
                            ))
                        }
                        None => {
                            return Err(SymbolicError::parse(
                                self.end,
                                "expected a non-negative integer index, found end of input",
                            ))
                        }
                    };
                    self.expect(Token::RBracket)?;
                    match id.as_str() {
                        "x" => Ok(Expr::sym(Symbol::slow(index))),
                        "y" => Ok(Expr::sym(Symbol::fast(index))),
                        _ => Err(SymbolicError::parse(
                            start,
                            format!("unknown indexed symbol '{}'", id),
                        )),
                    }
                }
                _ => resolve_ident(start, &id),
            },
            Some(tok) => Err(SymbolicError::parse(
                start,
                format!("unexpected token {:?}", tok),
            )),
            None => Err(SymbolicError::parse(start, "unexpected end of input")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SymbolicError> {
        let mut args = Vec::new();
        if let Some(Token::RParen) = self.peek() {
            self.next();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(other) => {
                    return Err(SymbolicError::parse(
                        self.offset(self.pos - 1),
                        format!("expected ',' or ')', found {:?}", other),
                    ))
                }
                None => {
                    return Err(SymbolicError::parse(
                        self.end,
                        "expected ',' or ')', found end of input",
                    ))
                }
            }
        }
        Ok(args)
    }

    fn build_call(&self, pos: usize, name: &str, mut args: Vec<Expr>) -> Result<Expr, SymbolicError> {
        let arity = match name {
            "pow" => 2,
            _ => 1,
        };
        if args.len() != arity {
            return Err(SymbolicError::parse(
                pos,
                format!("{}() takes {} argument(s), got {}", name, arity, args.len()),
            ));
        }
        if name == "pow" {
            let exponent = args.remove(1);
            let base = args.remove(0);
            return Ok(Expr::pow(base, exponent));
        }
        let arg = args.remove(0);
        if name == "sqrt" {
            return Ok(Expr::sqrt(arg));
        }
        match Func::from_name(name) {
            Some(func) => Ok(Expr::call(func, arg)),
            None => Err(SymbolicError::parse(
                pos,
                format!("unknown function '{}'", name),
            )),
        }
    }
}

fn resolve_ident(pos: usize, id: &str) -> Result<Expr, SymbolicError> {
    match id {
        "pi" | "M_PI" => return Ok(Expr::constant(Constant::Pi)),
        "e" | "M_E" => return Ok(Expr::constant(Constant::E)),
        _ => {}
    }
    let (head, digits) = id.split_at(1);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(index) = digits.parse::<usize>() {
            match head {
                "x" => return Ok(Expr::sym(Symbol::slow(index))),
                "y" => return Ok(Expr::sym(Symbol::fast(index))),
                _ => {}
            }
        }
    }
    Err(SymbolicError::parse(pos, format!("unknown symbol '{}'", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: usize) -> Expr {
        Expr::sym(Symbol::slow(i))
    }

    fn y(i: usize) -> Expr {
        Expr::sym(Symbol::fast(i))
    }

    #[test]
    fn test_tokenize_power_forms() {
        let toks = tokenize("y0**2 + y1^3").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident("y0".into()),
                Token::Pow,
                Token::Num(2.0),
                Token::Op('+'),
                Token::Ident("y1".into()),
                Token::Pow,
                Token::Num(3.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_scientific() {
        let toks = tokenize("1.5e-3*x0").unwrap();
        assert_eq!(toks[0], Token::Num(1.5e-3));
    }

    #[test]
    fn test_parse_symbols_both_forms() {
        assert_eq!(parse("x0").unwrap(), x(0));
        assert_eq!(parse("x[0]").unwrap(), x(0));
        assert_eq!(parse("y[12]").unwrap(), y(12));
        assert_eq!(parse("y3").unwrap(), y(3));
    }

    #[test]
    fn test_parse_precedence() {
        // -y0^2 is -(y0^2)
        let e = parse("-y0^2").unwrap();
        assert_eq!(e, -Expr::powf(y(0), 2.0));

        let e = parse("x0 + x1*y0").unwrap();
        assert_eq!(e, x(0) + x(1) * y(0));
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse("sin(x0)").unwrap(), Expr::sin(x(0)));
        assert_eq!(parse("log(y0)").unwrap(), Expr::ln(y(0)));
        assert_eq!(parse("sqrt(2)").unwrap(), Expr::sqrt(Expr::num(2.0)));
        assert_eq!(
            parse("pow(y[0], 2)").unwrap(),
            Expr::powf(y(0), 2.0)
        );
        assert_eq!(parse("M_PI").unwrap(), Expr::constant(Constant::Pi));
    }

    #[test]
    fn test_parse_negative_literal() {
        assert_eq!(parse("-2.5").unwrap(), Expr::num(-2.5));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("z0 + 1"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("sin(x0"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("foo(x0)"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("x0 $ 1"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("pow(x0)"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse("x0 x1"), Err(SymbolicError::Parse { .. })));
        assert!(matches!(parse(""), Err(SymbolicError::Parse { .. })));
    }

    fn error_offset(text: &str) -> usize {
        match parse(text) {
            Err(SymbolicError::Parse { offset, .. }) => offset,
            other => panic!("expected a parse error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_error_offsets_count_characters() {
        // tokenizer errors
        assert_eq!(error_offset("x0 $ 1"), 3);
        assert_eq!(error_offset("1.2.3 + y0"), 0);
        // parser errors point at the offending token's first character
        assert_eq!(error_offset("y0**2 + z1"), 8);
        assert_eq!(error_offset("x0  x1"), 4);
        assert_eq!(error_offset("exp(y0, y1)"), 0);
        assert_eq!(error_offset("y[x0]"), 2);
        // running out of input reports the text length
        assert_eq!(error_offset("sin(x0"), 6);
        assert_eq!(error_offset("x0 +"), 4);

        let message = parse("y0**2 + z1").unwrap_err().to_string();
        assert!(message.starts_with("Parse error at character 8:"));
    }
}
