//! Whitelisted formula AST.
//!
//! The syntax tree is a closed tagged union: the parser can only build
//! nodes out of these enums, so "unknown construct accepted by accident"
//! is unrepresentable, and a new variant without handling is a compile
//! error at every exhaustive match (evaluator, scorer, printer).

use std::collections::BTreeSet;

/// The seven allowed variable/constant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// Current iterate.
    Z,
    /// Complex parameter.
    C,
    /// Iteration counter.
    N,
    Pi,
    E,
    /// Imaginary unit.
    I,
    /// Imaginary unit, engineering spelling.
    J,
}

impl Variable {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "z" => Some(Variable::Z),
            "c" => Some(Variable::C),
            "n" => Some(Variable::N),
            "pi" => Some(Variable::Pi),
            "e" => Some(Variable::E),
            "i" => Some(Variable::I),
            "j" => Some(Variable::J),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variable::Z => "z",
            Variable::C => "c",
            Variable::N => "n",
            Variable::Pi => "pi",
            Variable::E => "e",
            Variable::I => "i",
            Variable::J => "j",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Real-valued floored modulo (Python `%` semantics).
    Rem,
    Pow,
}

/// Number of arguments a whitelisted function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

/// The fixed function whitelist. Every variant has a fixed arity; nothing
/// outside this list is callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Asin,
    Acos,
    Atan,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Log,
    Log10,
    Sqrt,
    Abs,
    Conj,
    Real,
    Imag,
    Phase,
    Polar,
    Rect,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl Func {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "sinh" => Some(Func::Sinh),
            "cosh" => Some(Func::Cosh),
            "tanh" => Some(Func::Tanh),
            "asin" => Some(Func::Asin),
            "acos" => Some(Func::Acos),
            "atan" => Some(Func::Atan),
            "asinh" => Some(Func::Asinh),
            "acosh" => Some(Func::Acosh),
            "atanh" => Some(Func::Atanh),
            "exp" => Some(Func::Exp),
            "log" => Some(Func::Log),
            "log10" => Some(Func::Log10),
            "sqrt" => Some(Func::Sqrt),
            "abs" => Some(Func::Abs),
            "conj" => Some(Func::Conj),
            "real" => Some(Func::Real),
            "imag" => Some(Func::Imag),
            "phase" => Some(Func::Phase),
            "polar" => Some(Func::Polar),
            "rect" => Some(Func::Rect),
            "floor" => Some(Func::Floor),
            "ceil" => Some(Func::Ceil),
            "round" => Some(Func::Round),
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Asinh => "asinh",
            Func::Acosh => "acosh",
            Func::Atanh => "atanh",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Log10 => "log10",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
            Func::Conj => "conj",
            Func::Real => "real",
            Func::Imag => "imag",
            Func::Phase => "phase",
            Func::Polar => "polar",
            Func::Rect => "rect",
            Func::Floor => "floor",
            Func::Ceil => "ceil",
            Func::Round => "round",
            Func::Min => "min",
            Func::Max => "max",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Func::Min | Func::Max => Arity::AtLeast(2),
            Func::Rect => Arity::Exactly(2),
            _ => Arity::Exactly(1),
        }
    }
}

/// Formula syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(Variable),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Func,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Complexity score: +1 per unary/binary op, +2 per call, +0.5 per
    /// variable reference, +0.1 per literal. Callers use this to pick sane
    /// default iteration counts for exotic formulas.
    pub fn complexity(&self) -> f64 {
        match self {
            Expr::Number(_) => 0.1,
            Expr::Var(_) => 0.5,
            Expr::Unary { operand, .. } => 1.0 + operand.complexity(),
            Expr::Binary { lhs, rhs, .. } => 1.0 + lhs.complexity() + rhs.complexity(),
            Expr::Call { args, .. } => {
                2.0 + args.iter().map(Expr::complexity).sum::<f64>()
            }
        }
    }

    /// Collect every variable referenced anywhere in the tree.
    pub fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Expr::Number(_) => {}
            Expr::Var(v) => {
                out.insert(*v);
            }
            Expr::Unary { operand, .. } => operand.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Collect every whitelisted function called anywhere in the tree.
    pub fn collect_functions(&self, out: &mut BTreeSet<Func>) {
        match self {
            Expr::Number(_) | Expr::Var(_) => {}
            Expr::Unary { operand, .. } => operand.collect_functions(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_functions(out);
                rhs.collect_functions(out);
            }
            Expr::Call { func, args } => {
                out.insert(*func);
                for arg in args {
                    arg.collect_functions(out);
                }
            }
        }
    }
}
