//! Arithmetic stimuli: typed expression trees and difficulty tiers.
//!
//! Questions are built as trees and evaluated with checked integer
//! arithmetic. Division must be exact; a generated question whose division
//! leaves a remainder is an error, never a truncated answer.

use crate::Stimulus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Hard];

    /// Scoring weight of the tier.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Easy => 1,
            Self::Moderate => 2,
            Self::Hard => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{dividend} is not divisible by {divisor}")]
    InexactDivision { dividend: i64, divisor: i64 },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("integer literal out of range at offset {0}")]
    LiteralRange(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    fn from_symbol(c: u8) -> Option<Self> {
        match c {
            b'+' => Some(Self::Add),
            b'-' => Some(Self::Sub),
            b'*' => Some(Self::Mul),
            b'/' => Some(Self::Div),
            _ => None,
        }
    }

    fn apply(&self, lhs: i64, rhs: i64) -> Result<i64, ExprError> {
        match self {
            Self::Add => lhs.checked_add(rhs).ok_or(ExprError::Overflow),
            Self::Sub => lhs.checked_sub(rhs).ok_or(ExprError::Overflow),
            Self::Mul => lhs.checked_mul(rhs).ok_or(ExprError::Overflow),
            Self::Div => {
                if rhs == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                if lhs.checked_rem(rhs).ok_or(ExprError::Overflow)? != 0 {
                    return Err(ExprError::InexactDivision {
                        dividend: lhs,
                        divisor: rhs,
                    });
                }
                lhs.checked_div(rhs).ok_or(ExprError::Overflow)
            }
        }
    }
}

/// Expression tree. `Group` is an explicit pair of parentheses, so the tree
/// renders back to the exact text the participant sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Num(i64),
    Binary {
        op: Op,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Group(Box<Expr>),
}

impl Expr {
    pub fn num(n: i64) -> Self {
        Self::Num(n)
    }

    pub fn binary(op: Op, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(Op::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(Op::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(Op::Mul, lhs, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(Op::Div, lhs, rhs)
    }

    pub fn group(inner: Expr) -> Self {
        Self::Group(Box::new(inner))
    }

    pub fn eval(&self) -> Result<i64, ExprError> {
        match self {
            Self::Num(n) => Ok(*n),
            Self::Group(inner) => inner.eval(),
            Self::Binary { op, lhs, rhs } => op.apply(lhs.eval()?, rhs.eval()?),
        }
    }

    pub fn has_division(&self) -> bool {
        match self {
            Self::Num(_) => false,
            Self::Group(inner) => inner.has_division(),
            Self::Binary { op, lhs, rhs } => {
                *op == Op::Div || lhs.has_division() || rhs.has_division()
            }
        }
    }

    /// Parses `+ - * /`, parentheses and non-negative integer literals with
    /// the usual precedence and left associativity.
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let mut parser = Parser {
            src: text.as_bytes(),
            pos: 0,
        };
        let expr = parser.expr()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(expr),
            Some(_) => Err(parser.unexpected()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Group(inner) => write!(f, "({inner})"),
            Self::Binary { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
        }
    }
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn unexpected(&self) -> ExprError {
        match self.peek() {
            Some(c) => ExprError::Unexpected {
                found: c as char,
                offset: self.pos,
            },
            None => ExprError::UnexpectedEnd,
        }
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        loop {
            self.skip_ws();
            match self.peek().and_then(Op::from_symbol) {
                Some(op @ (Op::Add | Op::Sub)) => {
                    self.pos += 1;
                    lhs = Expr::binary(op, lhs, self.term()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek().and_then(Op::from_symbol) {
                Some(op @ (Op::Mul | Op::Div)) => {
                    self.pos += 1;
                    lhs = Expr::binary(op, lhs, self.factor()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn factor(&mut self) -> Result<Expr, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.expr()?;
                self.skip_ws();
                if self.peek() != Some(b')') {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(Expr::group(inner))
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits = std::str::from_utf8(&self.src[start..self.pos])
                    .map_err(|_| ExprError::LiteralRange(start))?;
                digits
                    .parse()
                    .map(Expr::Num)
                    .map_err(|_| ExprError::LiteralRange(start))
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// One arithmetic question with its precomputed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticQuestion {
    pub expr: Expr,
    pub text: String,
    pub answer: i64,
    pub difficulty: Difficulty,
}

impl ArithmeticQuestion {
    pub fn new(expr: Expr, difficulty: Difficulty) -> Result<Self, ExprError> {
        let answer = expr.eval()?;
        Ok(Self {
            text: expr.to_string(),
            expr,
            answer,
            difficulty,
        })
    }

    pub fn parse(text: &str, difficulty: Difficulty) -> Result<Self, ExprError> {
        Self::new(Expr::parse(text)?, difficulty)
    }
}

impl Stimulus for ArithmeticQuestion {
    const COLUMNS: &'static [&'static str] = &["question", "difficulty"];

    fn label(&self) -> &'static str {
        self.difficulty.as_str()
    }

    fn expected(&self) -> String {
        self.answer.to_string()
    }

    fn column_values(&self) -> Vec<String> {
        vec![self.text.clone(), self.difficulty.as_str().to_string()]
    }
}
