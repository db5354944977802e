//! Arithmetic calculator flavor
//!
//! Grammar (usual precedence, left associative):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/' | '%') unary)*
//! unary  := '-' unary | atom
//! atom   := number | '(' expr ')'
//! ```
//!
//! Integers stay integers until an operation overflows or a division
//! doesn't come out even.

use repline_core::{Evaluator, FlavorConfig};
use std::fmt;
use thiserror::Error;

/// Calculator failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("unexpected '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

pub fn flavor() -> FlavorConfig {
    FlavorConfig::new("Calculator", "source.arithmetic")
}

/// Evaluates arithmetic expressions
#[derive(Debug, Default)]
pub struct Calculator;

impl Evaluator for Calculator {
    type Error = CalcError;

    fn execute(&mut self, expression: &str) -> Result<String, CalcError> {
        let tokens = tokenize(expression)?;
        let mut parser = Parser { tokens, pos: 0 };
        let value = parser.expr()?;
        match parser.peek() {
            None => Ok(value.to_string()),
            Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
        }
    }

    fn format_error(&self, error: &CalcError) -> String {
        format!("error: {}", error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    fn apply(self, op: char, rhs: Number) -> Result<Number, CalcError> {
        if matches!(op, '/' | '%') && rhs.is_zero() {
            return Err(CalcError::DivisionByZero);
        }

        if let (Self::Int(a), Self::Int(b)) = (self, rhs) {
            let exact = match op {
                '+' => a.checked_add(b),
                '-' => a.checked_sub(b),
                '*' => a.checked_mul(b),
                '/' if a.checked_rem(b) == Some(0) => a.checked_div(b),
                '%' => a.checked_rem(b),
                _ => None,
            };
            if let Some(n) = exact {
                return Ok(Self::Int(n));
            }
        }

        let (a, b) = (self.as_f64(), rhs.as_f64());
        Ok(Self::Float(match op {
            '+' => a + b,
            '-' => a - b,
            '*' => a * b,
            '/' => a / b,
            _ => a % b,
        }))
    }

    fn negate(self) -> Number {
        match self {
            Self::Int(n) => n.checked_neg().map_or(Self::Float(-(n as f64)), Self::Int),
            Self::Float(f) => Self::Float(-f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Op(char),
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Op(c) => write!(f, "{}", c),
            Self::Open => write!(f, "("),
            Self::Close => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '+' | '-' | '*' | '/' | '%' => tokens.push(Token::Op(c)),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(parse_number(&input[start..end])?));
            }
            other => return Err(CalcError::UnexpectedToken(other.to_string())),
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, CalcError> {
    let invalid = || CalcError::InvalidNumber(literal.to_string());
    if literal.contains('.') {
        literal.parse().map(Number::Float).map_err(|_| invalid())
    } else {
        literal.parse().map(Number::Int).map_err(|_| invalid())
    }
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
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Number, CalcError> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            value = value.apply(op, self.term()?)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Number, CalcError> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek().cloned() {
            self.pos += 1;
            value = value.apply(op, self.unary()?)?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Number, CalcError> {
        if let Some(Token::Op('-')) = self.peek() {
            self.pos += 1;
            return Ok(self.unary()?.negate());
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Number, CalcError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}
