//! The in-memory representation of an event and of literal operand values.
//!
//! Both are the same algebraic domain: null, bool, signed 64-bit integer,
//! double, string, array, and ordered object. `serde_json` already gives us
//! exactly this shape, so `Value` is a thin alias rather than a hand-rolled
//! enum.

use serde_json::Value as Json;

/// An event or literal value. Events are read-only during check evaluation;
/// the evaluator only ever holds a shared reference to one.
pub type Value = Json;

/// A type tag used in error messages and in dispatch decisions.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Json::Number(_) => "double",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Resolves a JSON-pointer-style path (`/a/b/0/c`, or `""` for the root)
/// against an event, returning `None` when any segment is missing.
pub fn at<'a>(event: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(event);
    }
    event.pointer(path)
}

/// Returns whether `path` resolves to *any* value in `event`, including an
/// explicit `null`, matching the semantics required by the `exists` helper.
pub fn exists(event: &Value, path: &str) -> bool {
    at(event, path).is_some()
}

/// Integer extraction: only true JSON integers count, never a numeric
/// string and never a double that happens to have no fractional part.
pub fn as_i64(value: &Value) -> Option<i64> {
    value.as_i64()
}

pub fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

/// Normalizes a dotted field path (`a.b.0`) into a JSON-pointer path
/// (`/a/b/0`), escaping `~` and `/` inside individual segments per RFC 6901
/// (`~` -> `~0`, `/` -> `~1`). A path that already starts with `/` is
/// assumed to be pointer-form already and is returned unchanged; the
/// special empty string (root) is also passed through unchanged.
pub fn normalize_field_path(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with('/') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 1);
    for segment in raw.split('.') {
        out.push('/');
        out.push_str(&escape_pointer_segment(segment));
    }
    out
}

fn escape_pointer_segment(segment: &str) -> String {
    if !segment.contains('~') && !segment.contains('/') {
        return segment.to_string();
    }
    segment.replace('~', "~0").replace('/', "~1")
}

/// Well-formedness check for an expression-tree field path: it must either
/// be the empty root or start with `/`.
pub fn is_well_formed_path(path: &str) -> bool {
    path.is_empty() || path.starts_with('/')
}

/// Appends a single already-raw (un-normalized) key segment to a pointer
/// path that is already in `/`-token form, escaping the segment per
/// RFC 6901. Used when expanding an object-equality operand into one
/// per-key leaf term.
pub fn join_pointer(base: &str, key: &str) -> String {
    let mut out = String::with_capacity(base.len() + key.len() + 1);
    out.push_str(base);
    out.push('/');
    out.push_str(&escape_pointer_segment(key));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_dotted_paths() {
        assert_eq!(normalize_field_path("a.b.c"), "/a/b/c");
        assert_eq!(normalize_field_path("a.b.0"), "/a/b/0");
        assert_eq!(normalize_field_path("/already/pointer"), "/already/pointer");
        assert_eq!(normalize_field_path(""), "");
    }

    #[test]
    fn escapes_tilde_and_slash_in_segments() {
        assert_eq!(normalize_field_path("a~b.c"), "/a~0b/c");
        // a literal "/" inside a single dotted segment is unusual but must
        // still escape correctly.
        let mut seg = String::from("x");
        seg.push('/');
        seg.push('y');
        assert_eq!(escape_pointer_segment(&seg), "x~1y");
    }

    #[test]
    fn resolves_root_and_nested_paths() {
        let event = json!({"a": {"b": [1, 2, {"c": "deep"}]}});
        assert_eq!(at(&event, ""), Some(&event));
        assert_eq!(at(&event, "/a/b/2/c"), Some(&json!("deep")));
        assert_eq!(at(&event, "/a/missing"), None);
    }

    #[test]
    fn exists_is_true_for_explicit_null() {
        let event = json!({"field": null});
        assert!(exists(&event, "/field"));
        assert!(!exists(&event, "/other"));
    }

    #[test]
    fn type_name_distinguishes_integer_and_double() {
        assert_eq!(type_name(&json!(42)), "integer");
        assert_eq!(type_name(&json!(42.5)), "double");
        assert_eq!(type_name(&json!("42")), "string");
    }
}
