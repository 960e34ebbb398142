//! Formula tokenizer.
//!
//! Only the token classes of the formula grammar exist: numbers,
//! identifiers, the arithmetic operators, parentheses, and commas. Every
//! other character class is rejected here, classified as a
//! [`DisallowedKind`](crate::error::DisallowedKind) where the construct is a
//! recognizable sandbox escape attempt (comparisons, subscripts, strings,
//! attribute access, ...) and as a syntax error otherwise.

use crate::error::{DisallowedKind, FormulaError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpannedTok {
    pub tok: Tok,
    pub pos: usize,
}

/// Python keywords that would otherwise lex as identifiers; each maps to
/// the construct it introduces.
fn keyword_kind(word: &str) -> Option<DisallowedKind> {
    match word {
        "if" | "else" => Some(DisallowedKind::Conditional),
        "and" | "or" | "not" => Some(DisallowedKind::BooleanLogic),
        "lambda" => Some(DisallowedKind::Lambda),
        "import" => Some(DisallowedKind::Import),
        "in" | "is" => Some(DisallowedKind::Comparison),
        _ => None,
    }
}

pub(crate) fn lex(src: &str) -> Result<Vec<SpannedTok>, FormulaError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    // Whether the previous token can end a value; decides whether `[` means
    // indexing or a collection literal, and whether `.` is attribute access.
    let mut prev_is_value = false;

    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
            }
            b'0'..=b'9' => {
                let (value, end) = scan_number(src, pos)?;
                tokens.push(SpannedTok {
                    tok: Tok::Number(value),
                    pos,
                });
                pos = end;
                prev_is_value = true;
            }
            b'.' => {
                if prev_is_value {
                    return Err(FormulaError::disallowed(
                        pos,
                        DisallowedKind::AttributeAccess,
                    ));
                }
                if pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_digit() {
                    let (value, end) = scan_number(src, pos)?;
                    tokens.push(SpannedTok {
                        tok: Tok::Number(value),
                        pos,
                    });
                    pos = end;
                    prev_is_value = true;
                } else {
                    return Err(FormulaError::syntax(pos, "unexpected '.'"));
                }
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = pos;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                let word = &src[start..pos];
                if let Some(kind) = keyword_kind(word) {
                    return Err(FormulaError::disallowed(start, kind));
                }
                tokens.push(SpannedTok {
                    tok: Tok::Ident(word.to_string()),
                    pos: start,
                });
                prev_is_value = true;
            }
            b'+' => {
                tokens.push(SpannedTok {
                    tok: Tok::Plus,
                    pos,
                });
                pos += 1;
                prev_is_value = false;
            }
            b'-' => {
                tokens.push(SpannedTok {
                    tok: Tok::Minus,
                    pos,
                });
                pos += 1;
                prev_is_value = false;
            }
            b'*' => {
                if bytes.get(pos + 1) == Some(&b'*') {
                    tokens.push(SpannedTok {
                        tok: Tok::DoubleStar,
                        pos,
                    });
                    pos += 2;
                } else {
                    tokens.push(SpannedTok {
                        tok: Tok::Star,
                        pos,
                    });
                    pos += 1;
                }
                prev_is_value = false;
            }
            b'/' => {
                tokens.push(SpannedTok {
                    tok: Tok::Slash,
                    pos,
                });
                pos += 1;
                prev_is_value = false;
            }
            b'%' => {
                tokens.push(SpannedTok {
                    tok: Tok::Percent,
                    pos,
                });
                pos += 1;
                prev_is_value = false;
            }
            b'(' => {
                tokens.push(SpannedTok {
                    tok: Tok::LParen,
                    pos,
                });
                pos += 1;
                prev_is_value = false;
            }
            b')' => {
                tokens.push(SpannedTok {
                    tok: Tok::RParen,
                    pos,
                });
                pos += 1;
                prev_is_value = true;
            }
            b',' => {
                tokens.push(SpannedTok {
                    tok: Tok::Comma,
                    pos,
                });
                pos += 1;
                prev_is_value = false;
            }
            // --- rejected token classes, classified for the error ---
            b'=' => {
                let kind = if bytes.get(pos + 1) == Some(&b'=') {
                    DisallowedKind::Comparison
                } else {
                    DisallowedKind::Assignment
                };
                return Err(FormulaError::disallowed(pos, kind));
            }
            b'<' | b'>' => {
                return Err(FormulaError::disallowed(pos, DisallowedKind::Comparison));
            }
            b'!' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    return Err(FormulaError::disallowed(pos, DisallowedKind::Comparison));
                }
                return Err(FormulaError::syntax(pos, "unexpected '!'"));
            }
            b'&' | b'|' | b'^' | b'~' => {
                return Err(FormulaError::disallowed(
                    pos,
                    DisallowedKind::BitwiseOperator,
                ));
            }
            b'[' | b']' => {
                let kind = if prev_is_value {
                    DisallowedKind::Indexing
                } else {
                    DisallowedKind::Collection
                };
                return Err(FormulaError::disallowed(pos, kind));
            }
            b'{' | b'}' => {
                return Err(FormulaError::disallowed(pos, DisallowedKind::Collection));
            }
            b'\'' | b'"' => {
                return Err(FormulaError::disallowed(
                    pos,
                    DisallowedKind::StringLiteral,
                ));
            }
            _ => {
                return Err(FormulaError::syntax(
                    pos,
                    format!("unexpected character {:?}", src[pos..].chars().next().unwrap_or('?')),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Scan a numeric literal starting at `start`. Supports integers, decimals
/// and scientific notation. `e`/`E` only starts an exponent when followed
/// by a digit (optionally signed), so `2*e` still lexes as `2 * e`.
fn scan_number(src: &str, start: usize) -> Result<(f64, usize), FormulaError> {
    let bytes = src.as_bytes();
    let mut end = start;
    let mut seen_dot = false;

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                // `1.e` style attribute access is impossible here: a dot is
                // only consumed when it continues the literal.
                seen_dot = true;
                end += 1;
            }
            b'e' | b'E' => {
                let mut probe = end + 1;
                if bytes.get(probe) == Some(&b'+') || bytes.get(probe) == Some(&b'-') {
                    probe += 1;
                }
                if bytes.get(probe).is_some_and(u8::is_ascii_digit) {
                    end = probe + 1;
                    while end < bytes.len() && bytes[end].is_ascii_digit() {
                        end += 1;
                    }
                }
                break;
            }
            _ => break,
        }
    }

    src[start..end]
        .parse::<f64>()
        .map(|value| (value, end))
        .map_err(|_| FormulaError::syntax(start, format!("invalid number '{}'", &src[start..end])))
}
