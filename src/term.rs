//! The Term Parser: turns either a one-key list-form object or a free-form
//! expression token into a compiled [`Expression`] by way of the
//! [`OperatorRegistry`]'s `operation.condition` dispatcher.

use serde_json::Value as Json;

use crate::error::{BuildError, STAGE};
use crate::expr::{EvalFn, Expression};
use crate::registry::{OperatorRegistry, CONDITION_DISPATCHER};
use crate::value::{self, Value};
use std::sync::Arc;

/// List-form: a one-entry object `{ field: operand }`. The key is
/// normalized (`.` -> `/`, leading `/` ensured); the value is handed to
/// `operation.condition` unchanged.
pub fn from_list_entry(registry: &OperatorRegistry, definition: &Value) -> Result<Expression, BuildError> {
    let object = definition
        .as_object()
        .ok_or_else(|| BuildError::shape(STAGE, "object", value::type_name(definition)))?;
    if object.len() != 1 {
        return Err(BuildError::shape(
            STAGE,
            "exactly one key/value pair",
            format!("{} entries", object.len()),
        ));
    }
    let (key, operand) = object.iter().next().expect("checked len == 1 above");
    let field_path = value::normalize_field_path(key);
    registry.build(CONDITION_DISPATCHER, &field_path, operand)
}

/// The outcome of parsing a single expression-string token: either a
/// straightforward term, or (for `!=`, and for bare equality against an
/// object operand) a flattened set of leaf functions combined with a
/// negation flag, since the shunting-yard evaluator only deals in plain
/// `Event -> bool` closures.
pub fn from_token(registry: &OperatorRegistry, token: &str) -> Result<EvalFn, BuildError> {
    let (field_path, operand, negate) = parse_token(token)?;
    let expr = registry.build(CONDITION_DISPATCHER, &field_path, &operand)?;
    flatten(expr, negate)
}

/// Splits the token into `(field_path, operand, negate)`. `negate` is set
/// only for the `!=` comparison form. A single trace event is preserved
/// for `!=` by negating the leaf function directly instead of wrapping in
/// a `Not` node.
fn parse_token(token: &str) -> Result<(String, Value, bool), BuildError> {
    if let Some(rest) = token.strip_prefix('+') {
        return parse_helper_token(rest);
    }
    parse_comparison_token(token)
}

/// `+helper_name/field_path[/arg1[/arg2...]]`. The field path is always the
/// segment right after the helper name; everything following is
/// reassembled into the operand string handed to `operation.condition`.
fn parse_helper_token(rest: &str) -> Result<(String, Value, bool), BuildError> {
    let pos1 = rest
        .find('/')
        .ok_or_else(|| BuildError::syntax(STAGE, format!("+{rest}")))?;
    let after_helper = &rest[pos1 + 1..];
    let pos2_rel = after_helper.find('/');
    let field_path = match pos2_rel {
        Some(p) => &after_helper[..p],
        None => after_helper,
    };
    let helper_name = &rest[..pos1];
    let trailing = match pos2_rel {
        Some(p) => &after_helper[p..], // includes the leading '/'
        None => "",
    };
    let operand = Value::String(format!("+{helper_name}{trailing}"));
    Ok((value::normalize_field_path(field_path), operand, false))
}

/// Recognizes the anchored pattern `^[^=<>!]+(<=|>=|<|>|==|!=)` with a
/// hand-written left-to-right micro-lexer. Regex is deliberately avoided
/// here for deterministic, backtracking-free matching.
fn parse_comparison_token(token: &str) -> Result<(String, Value, bool), BuildError> {
    let (split_at, op_len, op) = find_operator(token)
        .ok_or_else(|| BuildError::syntax(STAGE, token.to_string()))?;
    let field_path = &token[..split_at];
    let operand_str = &token[split_at + op_len..];

    match op {
        "==" | "!=" => {
            let operand = parse_literal_or_string(operand_str);
            Ok((value::normalize_field_path(field_path), operand, op == "!="))
        }
        "<" | "<=" | ">" | ">=" => {
            let parsed = parse_literal_or_string(operand_str);
            let (prefix, suffix) = match (&parsed, op) {
                (Value::Number(n), _) if n.is_i64() => ("int_", order_suffix(op)),
                (Value::String(_), _) => ("string_", order_suffix(op)),
                _ => {
                    return Err(BuildError::type_error(STAGE, op));
                }
            };
            let operand = Value::String(format!("+{prefix}{suffix}/{operand_str}"));
            Ok((value::normalize_field_path(field_path), operand, false))
        }
        _ => unreachable!("find_operator only returns the six recognized operators"),
    }
}

fn order_suffix(op: &str) -> &'static str {
    match op {
        "<" => "less",
        "<=" => "less_or_equal",
        ">" => "greater",
        ">=" => "greater_or_equal",
        _ => unreachable!(),
    }
}

/// Left-anchored scan for the first of the six recognized operators,
/// longest-match first so `<=`/`>=`/`==`/`!=` are not mis-split as `<`/`>`.
/// The field-path prefix must be non-empty, matching the anchored pattern
/// `^[^=<>!]+(<=|>=|<|>|==|!=)`; an operator found at position 0 (no
/// preceding field path) is not a match.
/// Returns `(byte offset of operator start, operator byte length, operator str)`.
fn find_operator(token: &str) -> Option<(usize, usize, &'static str)> {
    let bytes = token.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'=' || c == b'<' || c == b'>' || c == b'!' {
            if i == 0 {
                return None;
            }
            let two = token.get(i..i + 2);
            for op in ["<=", ">=", "==", "!="] {
                if two == Some(op) {
                    return Some((i, 2, op));
                }
            }
            if c == b'<' {
                return Some((i, 1, "<"));
            }
            if c == b'>' {
                return Some((i, 1, ">"));
            }
            // a lone '=' or '!' that isn't part of a two-char operator is
            // not a recognized operator; the pattern `[^=<>!]+` requires
            // the field-path prefix to contain none of these characters,
            // so encountering one here that doesn't form `==`/`!=` is a
            // syntax error at this position.
            return None;
        }
        i += 1;
    }
    None
}

/// `==`/`!=`/ordered-comparison operand interpretation: attempt a JSON
/// literal parse, falling back to a bare string on failure, including
/// for tokens that merely resemble malformed JSON (see DESIGN.md).
fn parse_literal_or_string(raw: &str) -> Value {
    serde_json::from_str::<Json>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Flattens a (possibly composite) `operation.condition` result into a
/// single closure, applying `negate` for `!=`. A composite result whose
/// direct children are not all terms (deeper nesting than the one
/// level `operation.condition` itself allows) is rejected with
/// `UnsupportedNestedObjectComparison`; in practice `operation.condition`
/// never returns such a shape (it rejects nesting eagerly, see
/// `registry::build_equal`), so this is defense in depth rather than the
/// primary enforcement point.
fn flatten(expr: Expression, negate: bool) -> Result<EvalFn, BuildError> {
    if expr.is_term() {
        let Expression::Term(term) = expr else {
            unreachable!("is_term() just confirmed this")
        };
        let fn_ = term.eval_fn.clone();
        if negate {
            return Ok(Arc::new(move |event| !fn_(event)));
        }
        return Ok(fn_);
    }

    let leaves = expr
        .as_flat_terms()
        .ok_or_else(|| BuildError::unsupported_nested_object(STAGE))?;
    let fns: Vec<EvalFn> = leaves.into_iter().map(|t| t.eval_fn.clone()).collect();
    Ok(Arc::new(move |event| {
        for f in &fns {
            if negate == f(event) {
                return false;
            }
        }
        true
    }))
}
