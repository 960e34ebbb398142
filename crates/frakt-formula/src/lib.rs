#![forbid(unsafe_code)]
//! frakt-formula: sandboxed formula compiler/evaluator.
//!
//! User-supplied iteration formulas (`z**2 + c`, `sin(z) + c`, ...) are
//! compiled into an immutable, whitelisted AST and evaluated per
//! `(z, c, n)`. The sandbox is fail-closed: the parser can only construct
//! nodes from a fixed operator/function/variable whitelist, and every other
//! token class is a typed compile error. Nothing here executes user code;
//! there is no name lookup at evaluation time.
//!
//! Evaluation never panics and never leaks numeric failure modes: division
//! by zero, overflow to non-finite values, and domain violations all come
//! back as [`EvalError`], which the escape-time loop treats as divergence.

pub mod ast;
mod compile;
mod eval;
pub mod error;
mod lexer;
mod parser;
pub mod templates;

pub use ast::{Arity, BinaryOp, Expr, Func, UnaryOp, Variable};
pub use compile::{compile, CompiledFormula};
pub use error::{DisallowedKind, EvalError, FormulaError};
pub use templates::{builtin_templates, find_template, FormulaTemplate, RecommendedSettings};
