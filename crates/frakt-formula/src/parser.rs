//! Precedence-climbing parser from token stream to whitelisted AST.
//!
//! Precedence mirrors the grammar the formulas were written against:
//! `**` binds tightest and is right-associative, unary sign binds tighter
//! than `* / %` but looser than `**` (so `-z**2` is `-(z**2)` and `2**-n`
//! parses), and `+ -` bind loosest.

use crate::ast::{BinaryOp, Expr, Func, UnaryOp, Variable};
use crate::error::{DisallowedKind, FormulaError};
use crate::lexer::{SpannedTok, Tok};

const BP_ADD: (u8, u8) = (10, 11);
const BP_MUL: (u8, u8) = (20, 21);
const BP_UNARY: u8 = 25;
const BP_POW: (u8, u8) = (31, 30); // right-associative

pub(crate) struct Parser {
    tokens: Vec<SpannedTok>,
    cursor: usize,
    src_len: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<SpannedTok>, src_len: usize) -> Self {
        Self {
            tokens,
            cursor: 0,
            src_len,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_expr(0)?;
        if let Some(tok) = self.peek() {
            if tok.tok == Tok::Comma {
                // A top-level comma would build a tuple.
                return Err(FormulaError::disallowed(tok.pos, DisallowedKind::Collection));
            }
            return Err(FormulaError::syntax(tok.pos, "unexpected trailing input"));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&SpannedTok> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<SpannedTok> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn eof_error(&self) -> FormulaError {
        FormulaError::syntax(self.src_len, "unexpected end of formula")
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_prefix()?;

        while let Some(tok) = self.peek() {
            let (op, lbp, rbp) = match tok.tok {
                Tok::Plus => (BinaryOp::Add, BP_ADD.0, BP_ADD.1),
                Tok::Minus => (BinaryOp::Sub, BP_ADD.0, BP_ADD.1),
                Tok::Star => (BinaryOp::Mul, BP_MUL.0, BP_MUL.1),
                Tok::Slash => (BinaryOp::Div, BP_MUL.0, BP_MUL.1),
                Tok::Percent => (BinaryOp::Rem, BP_MUL.0, BP_MUL.1),
                Tok::DoubleStar => (BinaryOp::Pow, BP_POW.0, BP_POW.1),
                _ => break,
            };
            if lbp < min_bp {
                break;
            }
            self.cursor += 1;
            let rhs = self.parse_expr(rbp)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, FormulaError> {
        let tok = self.next().ok_or_else(|| self.eof_error())?;
        match tok.tok {
            Tok::Number(value) => Ok(Expr::Number(value)),
            Tok::Minus => {
                let operand = self.parse_expr(BP_UNARY)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            Tok::Plus => {
                let operand = self.parse_expr(BP_UNARY)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Pos,
                    operand: Box::new(operand),
                })
            }
            Tok::LParen => {
                let inner = self.parse_expr(0)?;
                match self.next() {
                    Some(SpannedTok {
                        tok: Tok::RParen, ..
                    }) => Ok(inner),
                    Some(SpannedTok {
                        tok: Tok::Comma,
                        pos,
                    }) => Err(FormulaError::disallowed(pos, DisallowedKind::Collection)),
                    Some(other) => {
                        Err(FormulaError::syntax(other.pos, "expected ')'"))
                    }
                    None => Err(self.eof_error()),
                }
            }
            Tok::Ident(name) => {
                let is_call = matches!(
                    self.peek(),
                    Some(SpannedTok {
                        tok: Tok::LParen,
                        ..
                    })
                );
                if is_call {
                    let func = Func::parse(&name).ok_or_else(|| {
                        FormulaError::disallowed(tok.pos, DisallowedKind::UnknownFunction(name.clone()))
                    })?;
                    self.cursor += 1; // consume '('
                    let args = self.parse_args()?;
                    if !func.arity().accepts(args.len()) {
                        return Err(FormulaError::syntax(
                            tok.pos,
                            format!(
                                "function '{}' does not accept {} argument(s)",
                                func.name(),
                                args.len()
                            ),
                        ));
                    }
                    Ok(Expr::Call { func, args })
                } else {
                    let var = Variable::parse(&name).ok_or_else(|| {
                        FormulaError::disallowed(tok.pos, DisallowedKind::UnknownVariable(name.clone()))
                    })?;
                    Ok(Expr::Var(var))
                }
            }
            Tok::Star | Tok::DoubleStar | Tok::Slash | Tok::Percent => {
                Err(FormulaError::syntax(tok.pos, "operator needs a left operand"))
            }
            Tok::RParen => Err(FormulaError::syntax(tok.pos, "unmatched ')'")),
            Tok::Comma => Err(FormulaError::syntax(tok.pos, "unexpected ','")),
        }
    }

    /// Parse a parenthesized, comma-separated argument list. The opening
    /// paren has already been consumed.
    fn parse_args(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut args = Vec::new();

        if matches!(
            self.peek(),
            Some(SpannedTok {
                tok: Tok::RParen,
                ..
            })
        ) {
            self.cursor += 1;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr(0)?);
            match self.next() {
                Some(SpannedTok {
                    tok: Tok::RParen, ..
                }) => return Ok(args),
                Some(SpannedTok {
                    tok: Tok::Comma, ..
                }) => continue,
                Some(other) => {
                    return Err(FormulaError::syntax(other.pos, "expected ',' or ')'"))
                }
                None => return Err(self.eof_error()),
            }
        }
    }
}
