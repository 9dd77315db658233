//! Constraint expressions over a single argument value.
//!
//! A constraint such as `x > 2 and x < 10` is parsed once into an [`Expr`]
//! tree and evaluated with the argument's parsed value bound to its name (or
//! short name). The language only has literals, one kind of variable,
//! comparisons (chainable, `1 < x <= 5`), unary minus, and `and`/`or`/`not`
//! with parentheses.
//!
//! # Examples
//!
//! ```
//! use lazyarg_core::{Expression, Value};
//!
//! let expr = Expression::new("1 < n <= 5 or n == 42");
//! assert_eq!(expr.evaluate("n", &Value::Int(3)), Ok(true));
//! assert_eq!(expr.evaluate("n", &Value::Int(42)), Ok(true));
//! assert_eq!(expr.evaluate("n", &Value::Int(7)), Ok(false));
//! ```

use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::types::Value;

/// Why an expression could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("cannot compare {0} with {1}")]
    TypeMismatch(&'static str, &'static str),
    #[error("a list value cannot be used in an expression")]
    ListValue,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Num(f64),
    Str(String),
    Bool(bool),
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Var(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    /// `first op1 a op2 b ...`, true when every adjacent pair holds.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
}

impl Expr {
    /// Collects every variable name the tree refers to.
    pub fn names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Var(name) => {
                names.insert(name.as_str());
            }
            Self::Neg(inner) | Self::Not(inner) => inner.collect_names(names),
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_names(names);
                b.collect_names(names);
            }
            Self::Compare { first, rest } => {
                first.collect_names(names);
                for (_, operand) in rest {
                    operand.collect_names(names);
                }
            }
        }
    }
}

/// A constraint template together with its parse result.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    parsed: Result<Expr, ExprError>,
}

impl Expression {
    /// Parses `template`. Parse failures are kept and reported when the
    /// constraint is checked.
    pub fn new(template: &str) -> Self {
        Self {
            source: format!(" {template} "),
            parsed: parse(template),
        }
    }

    /// The template, padded with one space on each side.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parsed(&self) -> Result<&Expr, &ExprError> {
        self.parsed.as_ref()
    }

    /// Returns the first of `candidates` the expression refers to.
    pub fn bound_name<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        let expr = self.parsed.as_ref().ok()?;
        let names = expr.names();
        candidates.iter().copied().find(|c| names.contains(c))
    }

    /// Evaluates the expression with `name` bound to `value`.
    ///
    /// # Errors
    ///
    /// The parse error, if any, or an evaluation error (unknown name,
    /// incomparable operands, list value).
    pub fn evaluate(&self, name: &str, value: &Value) -> Result<bool, ExprError> {
        let expr = self.parsed.as_ref().map_err(Clone::clone)?;
        let bound = Operand::from_value(value)?;
        Ok(eval(expr, name, &bound)?.truthy())
    }
}

/// Parses an expression.
///
/// # Errors
///
/// Returns an [`ExprError`] describing the first syntax problem.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Str(String),
    Ident(String),
    And,
    Or,
    Not,
    True,
    False,
    Cmp(CmpOp),
    Minus,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Ident(name) => f.write_str(name),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Not => f.write_str("not"),
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::Cmp(op) => f.write_str(match op {
                CmpOp::Lt => "<",
                CmpOp::Le => "<=",
                CmpOp::Gt => ">",
                CmpOp::Ge => ">=",
                CmpOp::Eq => "==",
                CmpOp::Ne => "!=",
            }),
            Self::Minus => f.write_str("-"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '<' | '>' | '=' | '!' => {
                chars.next();
                let followed_by_eq = chars.next_if(|&(_, c)| c == '=').is_some();
                let op = match (ch, followed_by_eq) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    ('>', true) => CmpOp::Ge,
                    ('=', true) => CmpOp::Eq,
                    ('!', true) => CmpOp::Ne,
                    _ => return Err(ExprError::UnexpectedChar(ch, offset)),
                };
                tokens.push(Token::Cmp(op));
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == ch).is_none() {
                    return Err(ExprError::UnexpectedChar(ch, offset));
                }
                tokens.push(if ch == '&' { Token::And } else { Token::Or });
            }
            '\'' | '"' => tokens.push(Token::Str(string_literal(&mut chars)?)),
            c if c.is_ascii_digit() || c == '.' => tokens.push(number(&mut chars)?),
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_alphanumeric() || c == '_') {
                    word.push(c);
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "True" | "true" => Token::True,
                    "False" | "false" => Token::False,
                    _ => Token::Ident(word),
                });
            }
            other => return Err(ExprError::UnexpectedChar(other, offset)),
        }
    }

    Ok(tokens)
}

fn string_literal(chars: &mut Peekable<CharIndices<'_>>) -> Result<String, ExprError> {
    let Some((_, quote)) = chars.next() else {
        return Err(ExprError::UnterminatedString);
    };
    let mut text = String::new();
    for (_, c) in chars.by_ref() {
        if c == quote {
            return Ok(text);
        }
        text.push(c);
    }
    Err(ExprError::UnterminatedString)
}

fn number(chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, ExprError> {
    let mut text = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '.' || c == '_') {
        text.push(c);
    }
    text.replace('_', "")
        .parse()
        .map(Token::Num)
        .map_err(|_| ExprError::InvalidNumber(text))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.not()?;
        while self.eat(&Token::And) {
            let rhs = self.not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.operand()?;
        let mut rest = Vec::new();
        while let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            rest.push((op, self.operand()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn operand(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.operand()?)));
        }
        match self.advance() {
            Some(Token::Num(n)) => Ok(Expr::Literal(Literal::Num(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Literal::Str(s))),
            Some(Token::True) => Ok(Expr::Literal(Literal::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(Literal::Bool(false))),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.or()?;
                if self.eat(&Token::RParen) {
                    Ok(inner)
                } else {
                    Err(self.peek().map_or(ExprError::UnexpectedEnd, |t| {
                        ExprError::UnexpectedToken(t.to_string())
                    }))
                }
            }
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Num(f64),
    Str(String),
    Bool(bool),
}

impl Operand {
    fn from_value(value: &Value) -> Result<Self, ExprError> {
        match value {
            Value::Int(i) => Ok(Self::Num(*i as f64)),
            Value::Float(f) => Ok(Self::Num(*f)),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Str(s) => Ok(Self::Str(s.clone())),
            Value::List(_) => Err(ExprError::ListValue),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Num(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Self::Num(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
        }
    }
}

fn eval(expr: &Expr, name: &str, bound: &Operand) -> Result<Operand, ExprError> {
    match expr {
        Expr::Literal(Literal::Num(n)) => Ok(Operand::Num(*n)),
        Expr::Literal(Literal::Str(s)) => Ok(Operand::Str(s.clone())),
        Expr::Literal(Literal::Bool(b)) => Ok(Operand::Bool(*b)),
        Expr::Var(var) if var == name => Ok(bound.clone()),
        Expr::Var(var) => Err(ExprError::UnknownName(var.clone())),
        Expr::Neg(inner) => match eval(inner, name, bound)? {
            Operand::Num(n) => Ok(Operand::Num(-n)),
            other => Err(ExprError::TypeMismatch("number", other.kind())),
        },
        Expr::Not(inner) => Ok(Operand::Bool(!eval(inner, name, bound)?.truthy())),
        Expr::And(a, b) => {
            let ok = eval(a, name, bound)?.truthy() && eval(b, name, bound)?.truthy();
            Ok(Operand::Bool(ok))
        }
        Expr::Or(a, b) => {
            let ok = eval(a, name, bound)?.truthy() || eval(b, name, bound)?.truthy();
            Ok(Operand::Bool(ok))
        }
        Expr::Compare { first, rest } => {
            let mut lhs = eval(first, name, bound)?;
            for (op, operand) in rest {
                let rhs = eval(operand, name, bound)?;
                if !compare(&lhs, *op, &rhs)? {
                    return Ok(Operand::Bool(false));
                }
                lhs = rhs;
            }
            Ok(Operand::Bool(true))
        }
    }
}

fn compare(lhs: &Operand, op: CmpOp, rhs: &Operand) -> Result<bool, ExprError> {
    use std::cmp::Ordering;

    let ordering = match (lhs, rhs) {
        (Operand::Num(a), Operand::Num(b)) => a.partial_cmp(b),
        (Operand::Str(a), Operand::Str(b)) => Some(a.cmp(b)),
        (Operand::Bool(a), Operand::Bool(b)) if matches!(op, CmpOp::Eq | CmpOp::Ne) => {
            Some(a.cmp(b))
        }
        _ => return Err(ExprError::TypeMismatch(lhs.kind(), rhs.kind())),
    };
    let Some(ordering) = ordering else {
        return Ok(op == CmpOp::Ne);
    };
    Ok(match op {
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
    })
}
