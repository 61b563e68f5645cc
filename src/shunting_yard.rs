//! The Boolean Expression Evaluator: converts an infix string of terms
//! joined by `AND`, `OR`, `NOT`, grouped by `( )`, into a single predicate
//! via Dijkstra's shunting-yard algorithm.
//!
//! Rather than materializing a postfix program and then re-walking it, the
//! shunting-yard here folds directly into nested closures as each operator
//! is reduced. The output "stack" holds `Event -> bool` thunks instead of
//! booleans, so Rust's native `&&`/`||` short-circuiting gets AND/OR
//! short-circuit evaluation for free, while still following the textbook
//! postfix-reduction order.

use std::sync::Arc;

use crate::error::{BuildError, STAGE};
use crate::expr::EvalFn;
use crate::registry::OperatorRegistry;
use crate::term;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RawToken {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Term(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    LParen,
    And,
    Or,
    Not,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Self::LParen => 0,
            Self::Or => 1,
            Self::And => 2,
            Self::Not => 3,
        }
    }

    fn is_left_associative(self) -> bool {
        !matches!(self, Self::Not)
    }
}

/// Whitespace separates tokens; `(`/`)` are single-char tokens regardless
/// of adjacent whitespace; `NOT`/`AND`/`OR` are case-sensitive keyword
/// operators; everything else is a term token passed verbatim to the term
/// parser.
fn tokenize(source: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut buf = String::new();

    let flush = |buf: &mut String, tokens: &mut Vec<RawToken>| {
        if buf.is_empty() {
            return;
        }
        let token = match buf.as_str() {
            "AND" => RawToken::And,
            "OR" => RawToken::Or,
            "NOT" => RawToken::Not,
            _ => RawToken::Term(buf.clone()),
        };
        tokens.push(token);
        buf.clear();
    };

    for c in source.chars() {
        match c {
            '(' => {
                flush(&mut buf, &mut tokens);
                tokens.push(RawToken::LParen);
            }
            ')' => {
                flush(&mut buf, &mut tokens);
                tokens.push(RawToken::RParen);
            }
            c if c.is_whitespace() => flush(&mut buf, &mut tokens),
            c => buf.push(c),
        }
    }
    flush(&mut buf, &mut tokens);
    tokens
}

/// Compiles an infix boolean-expression string into a single `Event -> bool`
/// closure.
pub fn build_evaluator(registry: &OperatorRegistry, source: &str) -> Result<EvalFn, BuildError> {
    let tokens = tokenize(source);
    if tokens.is_empty() {
        return Err(BuildError::shape(STAGE, "a non-empty boolean expression", "empty string"));
    }

    let mut output: Vec<EvalFn> = Vec::new();
    let mut operators: Vec<Op> = Vec::new();

    let apply = |op: Op, output: &mut Vec<EvalFn>| -> Result<(), BuildError> {
        match op {
            Op::Not => {
                let a = output
                    .pop()
                    .ok_or_else(|| BuildError::syntax(STAGE, "NOT with no operand"))?;
                output.push(Arc::new(move |event| !a(event)));
            }
            Op::And => {
                let b = output
                    .pop()
                    .ok_or_else(|| BuildError::syntax(STAGE, "AND with missing right operand"))?;
                let a = output
                    .pop()
                    .ok_or_else(|| BuildError::syntax(STAGE, "AND with missing left operand"))?;
                output.push(Arc::new(move |event| a(event) && b(event)));
            }
            Op::Or => {
                let b = output
                    .pop()
                    .ok_or_else(|| BuildError::syntax(STAGE, "OR with missing right operand"))?;
                let a = output
                    .pop()
                    .ok_or_else(|| BuildError::syntax(STAGE, "OR with missing left operand"))?;
                output.push(Arc::new(move |event| a(event) || b(event)));
            }
            Op::LParen => unreachable!("LParen is never applied, only matched by RParen"),
        }
        Ok(())
    };

    for token in tokens {
        match token {
            RawToken::Term(s) => {
                output.push(term::from_token(registry, &s)?);
            }
            RawToken::Not => {
                // right-associative: never pop an equal-precedence NOT
                // before stacking another one.
                while let Some(&top) = operators.last() {
                    if top != Op::LParen && top.precedence() > Op::Not.precedence() {
                        let op = operators.pop().unwrap();
                        apply(op, &mut output)?;
                    } else {
                        break;
                    }
                }
                operators.push(Op::Not);
            }
            RawToken::And => {
                while let Some(&top) = operators.last() {
                    if top != Op::LParen
                        && (top.precedence() > Op::And.precedence()
                            || (top.precedence() == Op::And.precedence() && Op::And.is_left_associative()))
                    {
                        let op = operators.pop().unwrap();
                        apply(op, &mut output)?;
                    } else {
                        break;
                    }
                }
                operators.push(Op::And);
            }
            RawToken::Or => {
                while let Some(&top) = operators.last() {
                    if top != Op::LParen
                        && (top.precedence() > Op::Or.precedence()
                            || (top.precedence() == Op::Or.precedence() && Op::Or.is_left_associative()))
                    {
                        let op = operators.pop().unwrap();
                        apply(op, &mut output)?;
                    } else {
                        break;
                    }
                }
                operators.push(Op::Or);
            }
            RawToken::LParen => operators.push(Op::LParen),
            RawToken::RParen => {
                loop {
                    match operators.pop() {
                        Some(Op::LParen) => break,
                        Some(op) => apply(op, &mut output)?,
                        None => return Err(BuildError::syntax(STAGE, "unbalanced parenthesis")),
                    }
                }
            }
        }
    }

    while let Some(op) = operators.pop() {
        if op == Op::LParen {
            return Err(BuildError::syntax(STAGE, "unbalanced parenthesis"));
        }
        apply(op, &mut output)?;
    }

    if output.len() != 1 {
        return Err(BuildError::syntax(STAGE, "unexpected operator sequence"));
    }
    Ok(output.pop().expect("checked len == 1 above"))
}
