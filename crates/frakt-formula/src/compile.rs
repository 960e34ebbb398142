//! Formula compilation entry point.

use std::collections::BTreeSet;

use num_complex::Complex64;

use crate::ast::{Expr, Func, Variable};
use crate::error::{EvalError, FormulaError};
use crate::eval;
use crate::lexer;
use crate::parser::Parser;

/// Compile a formula string into an immutable, re-evaluable form.
///
/// Validation is the parse itself: the token stream and AST can only hold
/// whitelisted constructs, so a successful compile is the sandbox proof.
pub fn compile(text: &str) -> Result<CompiledFormula, FormulaError> {
    let source = text.trim();
    if source.is_empty() {
        return Err(FormulaError::Empty);
    }

    let tokens = lexer::lex(source)?;
    let root = Parser::new(tokens, source.len()).parse()?;

    let mut used_variables = BTreeSet::new();
    root.collect_variables(&mut used_variables);
    let mut used_functions = BTreeSet::new();
    root.collect_functions(&mut used_functions);
    let complexity_score = root.complexity();

    Ok(CompiledFormula {
        source: source.to_string(),
        root,
        used_variables,
        used_functions,
        complexity_score,
    })
}

/// A validated formula plus its introspection metadata.
///
/// Immutable and `Send + Sync`: one compiled instance is shared read-only
/// across all worker threads of a computation.
#[derive(Debug, Clone)]
pub struct CompiledFormula {
    source: String,
    root: Expr,
    used_variables: BTreeSet<Variable>,
    used_functions: BTreeSet<Func>,
    complexity_score: f64,
}

impl CompiledFormula {
    /// Evaluate at `(z, c, n)`. All numeric failure modes come back as a
    /// typed [`EvalError`]; nothing escapes this boundary.
    pub fn evaluate(&self, z: Complex64, c: Complex64, n: u32) -> Result<Complex64, EvalError> {
        eval::evaluate(&self.root, z, c, n)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn used_variables(&self) -> &BTreeSet<Variable> {
        &self.used_variables
    }

    pub fn used_functions(&self) -> &BTreeSet<Func> {
        &self.used_functions
    }

    pub fn complexity_score(&self) -> f64 {
        self.complexity_score
    }

    pub fn uses_variable(&self, var: Variable) -> bool {
        self.used_variables.contains(&var)
    }
}
