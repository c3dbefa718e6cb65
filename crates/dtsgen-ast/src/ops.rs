//! Operator tokens.
//!
//! Operators travel through the JSON tree format as their source tokens
//! (`"+"`, `">>>="`, `"typeof"`, ...). Anything else is rejected at load time.

use crate::error::AstError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BinaryOp {
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Assign,
    PlusAssign,
    MinusAssign,
    MultAssign,
    DivAssign,
    ModAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    And,
    Or,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    InstanceOf,
    In,
}

const BINARY_TOKENS: &[(&str, BinaryOp)] = &[
    ("+", BinaryOp::Plus),
    ("-", BinaryOp::Minus),
    ("*", BinaryOp::Mult),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Mod),
    ("=", BinaryOp::Assign),
    ("+=", BinaryOp::PlusAssign),
    ("-=", BinaryOp::MinusAssign),
    ("*=", BinaryOp::MultAssign),
    ("/=", BinaryOp::DivAssign),
    ("%=", BinaryOp::ModAssign),
    ("<<=", BinaryOp::LeftShiftAssign),
    (">>=", BinaryOp::RightShiftAssign),
    (">>>=", BinaryOp::UnsignedRightShiftAssign),
    ("&=", BinaryOp::BitwiseAndAssign),
    ("|=", BinaryOp::BitwiseOrAssign),
    ("^=", BinaryOp::BitwiseXorAssign),
    ("==", BinaryOp::Equal),
    ("!=", BinaryOp::NotEqual),
    ("===", BinaryOp::StrictEqual),
    ("!==", BinaryOp::StrictNotEqual),
    ("<", BinaryOp::LessThan),
    ("<=", BinaryOp::LessThanEqual),
    (">", BinaryOp::GreaterThan),
    (">=", BinaryOp::GreaterThanEqual),
    ("&&", BinaryOp::And),
    ("||", BinaryOp::Or),
    ("&", BinaryOp::BitwiseAnd),
    ("|", BinaryOp::BitwiseOr),
    ("^", BinaryOp::BitwiseXor),
    ("<<", BinaryOp::LeftShift),
    (">>", BinaryOp::RightShift),
    (">>>", BinaryOp::UnsignedRightShift),
    ("instanceof", BinaryOp::InstanceOf),
    ("in", BinaryOp::In),
];

impl BinaryOp {
    pub fn token(self) -> &'static str {
        BINARY_TOKENS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(token, _)| *token)
            .unwrap_or("?")
    }

    /// Compound assignments other than `+=` always store a number.
    pub const fn is_numeric_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::MinusAssign
                | BinaryOp::MultAssign
                | BinaryOp::DivAssign
                | BinaryOp::ModAssign
                | BinaryOp::LeftShiftAssign
                | BinaryOp::RightShiftAssign
                | BinaryOp::UnsignedRightShiftAssign
                | BinaryOp::BitwiseAndAssign
                | BinaryOp::BitwiseOrAssign
                | BinaryOp::BitwiseXorAssign
        )
    }
}

impl FromStr for BinaryOp {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BINARY_TOKENS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| AstError::UnknownOperator(s.to_string()))
    }
}

impl TryFrom<String> for BinaryOp {
    type Error = AstError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BinaryOp> for String {
    fn from(op: BinaryOp) -> Self {
        op.token().to_string()
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UnaryOp {
    Minus,
    Plus,
    Increment,
    Decrement,
    BitwiseNot,
    Not,
    TypeOf,
    Void,
    Delete,
}

const UNARY_TOKENS: &[(&str, UnaryOp)] = &[
    ("-", UnaryOp::Minus),
    ("+", UnaryOp::Plus),
    ("++", UnaryOp::Increment),
    ("--", UnaryOp::Decrement),
    ("~", UnaryOp::BitwiseNot),
    ("!", UnaryOp::Not),
    ("typeof", UnaryOp::TypeOf),
    ("void", UnaryOp::Void),
    ("delete", UnaryOp::Delete),
];

impl UnaryOp {
    pub fn token(self) -> &'static str {
        UNARY_TOKENS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(token, _)| *token)
            .unwrap_or("?")
    }
}

impl FromStr for UnaryOp {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UNARY_TOKENS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| AstError::UnknownOperator(s.to_string()))
    }
}

impl TryFrom<String> for UnaryOp {
    type Error = AstError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UnaryOp> for String {
    fn from(op: UnaryOp) -> Self {
        op.token().to_string()
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
#[path = "../tests/ops_tests.rs"]
mod tests;
