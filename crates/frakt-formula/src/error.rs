use std::fmt;

use thiserror::Error;

/// Why a construct was rejected by the sandbox whitelist.
///
/// The lexer and parser classify hostile input precisely so rejections are
/// observable as sandbox decisions rather than generic parse noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisallowedKind {
    Comparison,
    BooleanLogic,
    Conditional,
    Assignment,
    AttributeAccess,
    Indexing,
    Collection,
    StringLiteral,
    BitwiseOperator,
    Lambda,
    Import,
    UnknownFunction(String),
    UnknownVariable(String),
}

impl fmt::Display for DisallowedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisallowedKind::Comparison => write!(f, "comparison operators are not allowed"),
            DisallowedKind::BooleanLogic => write!(f, "boolean operators are not allowed"),
            DisallowedKind::Conditional => write!(f, "conditional expressions are not allowed"),
            DisallowedKind::Assignment => write!(f, "assignment is not allowed"),
            DisallowedKind::AttributeAccess => write!(f, "attribute access is not allowed"),
            DisallowedKind::Indexing => write!(f, "subscript access is not allowed"),
            DisallowedKind::Collection => write!(f, "collection literals are not allowed"),
            DisallowedKind::StringLiteral => write!(f, "string literals are not allowed"),
            DisallowedKind::BitwiseOperator => write!(f, "bitwise operators are not allowed"),
            DisallowedKind::Lambda => write!(f, "lambda expressions are not allowed"),
            DisallowedKind::Import => write!(f, "imports are not allowed"),
            DisallowedKind::UnknownFunction(name) => {
                write!(f, "function '{name}' is not allowed")
            }
            DisallowedKind::UnknownVariable(name) => {
                write!(f, "variable '{name}' is not allowed")
            }
        }
    }
}

/// Compile-time rejection. A formula that produces one of these never runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("formula cannot be empty")]
    Empty,

    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("disallowed construct at byte {position}: {kind}")]
    Disallowed {
        position: usize,
        kind: DisallowedKind,
    },
}

impl FormulaError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        FormulaError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn disallowed(position: usize, kind: DisallowedKind) -> Self {
        FormulaError::Disallowed { position, kind }
    }
}

/// Per-evaluation numeric failure. The escape-time loop interprets any of
/// these as "the orbit diverged at the current iteration".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow")]
    Overflow,

    #[error("domain error")]
    Domain,
}
