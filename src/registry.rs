//! The Operator Registry: a name-to-factory mapping that produces leaf
//! predicates, populated once at bootstrap and read-only afterwards. The
//! bootstrap entry point, [`OperatorRegistry::with_defaults`], plays the
//! role of this crate's configuration layer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::BuildError;
use crate::expr::{EvalFn, Expression, Term};
use crate::value::{self, Value};

/// `(field_path, operand) -> Expression`, the common factory signature: a
/// type-erased closure that returns a typed [`Expression`].
pub type Factory = Arc<dyn Fn(&str, &Value) -> Result<Expression, BuildError> + Send + Sync>;

pub const CONDITION_DISPATCHER: &str = "operation.condition";

/// A name-to-factory mapping, read-only after bootstrap.
#[derive(Clone)]
pub struct OperatorRegistry {
    builders: HashMap<String, Factory>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorRegistry {
    /// An empty registry: nothing is registered yet.
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registers the builtin operator set and the `operation.condition`
    /// dispatcher. This is the registry a host process builds once, before
    /// any check stage is compiled.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, factory) in builtins() {
            registry
                .register(name, factory)
                .expect("builtin operator names are unique by construction");
        }
        registry
    }

    /// Fails with [`BuildError::DuplicateBuilder`] if `name` is already
    /// registered.
    pub fn register(&mut self, name: impl Into<String>, factory: Factory) -> Result<(), BuildError> {
        let name = name.into();
        if self.builders.contains_key(&name) {
            return Err(BuildError::duplicate_builder("registry", name));
        }
        debug!(builder = %name, "registering operator builder");
        self.builders.insert(name, factory);
        Ok(())
    }

    /// Fails with [`BuildError::UnknownBuilder`] if `name` is missing.
    pub fn get(&self, name: &str) -> Result<&Factory, BuildError> {
        self.builders
            .get(name)
            .ok_or_else(|| BuildError::unknown_builder("registry", name))
    }

    /// Invokes the named builder with `(field_path, operand)`.
    pub fn build(&self, name: &str, field_path: &str, operand: &Value) -> Result<Expression, BuildError> {
        (self.get(name)?)(field_path, operand)
    }
}

fn builtins() -> Vec<(&'static str, Factory)> {
    vec![
        ("exists", Arc::new(|field, _operand| Ok(build_exists(field)))),
        (
            "not_exists",
            Arc::new(|field, _operand| Ok(build_not_exists(field))),
        ),
        (
            "equal",
            Arc::new(|field, operand| build_equal(field, operand)),
        ),
        (
            "not_equal",
            Arc::new(|field, operand| Ok(Expression::Term(build_equal_leaf(field, operand.clone()).negated()))),
        ),
        (
            "int_equal",
            Arc::new(|field, operand| build_int_cmp(IntCmp::Equal, field, operand)),
        ),
        (
            "int_not_equal",
            Arc::new(|field, operand| build_int_cmp(IntCmp::NotEqual, field, operand)),
        ),
        (
            "int_less",
            Arc::new(|field, operand| build_int_cmp(IntCmp::Less, field, operand)),
        ),
        (
            "int_less_or_equal",
            Arc::new(|field, operand| build_int_cmp(IntCmp::LessOrEqual, field, operand)),
        ),
        (
            "int_greater",
            Arc::new(|field, operand| build_int_cmp(IntCmp::Greater, field, operand)),
        ),
        (
            "int_greater_or_equal",
            Arc::new(|field, operand| build_int_cmp(IntCmp::GreaterOrEqual, field, operand)),
        ),
        (
            "string_less",
            Arc::new(|field, operand| build_string_cmp(StringCmp::Less, field, operand)),
        ),
        (
            "string_less_or_equal",
            Arc::new(|field, operand| build_string_cmp(StringCmp::LessOrEqual, field, operand)),
        ),
        (
            "string_greater",
            Arc::new(|field, operand| build_string_cmp(StringCmp::Greater, field, operand)),
        ),
        (
            "string_greater_or_equal",
            Arc::new(|field, operand| build_string_cmp(StringCmp::GreaterOrEqual, field, operand)),
        ),
        (
            CONDITION_DISPATCHER,
            Arc::new(|field, operand| dispatch_condition(field, operand)),
        ),
    ]
}

/// The `operation.condition` dispatcher: inspects the operand and routes
/// to a concrete operator.
pub fn dispatch_condition(field_path: &str, operand: &Value) -> Result<Expression, BuildError> {
    if let Value::String(s) = operand {
        if let Some(rest) = s.strip_prefix('+') {
            let mut parts = rest.splitn(2, '/');
            let helper_name = parts.next().unwrap_or_default();
            let arg = parts.next();
            return dispatch_helper(helper_name, field_path, arg);
        }
    }
    build_equal(field_path, operand)
}

fn dispatch_helper(helper_name: &str, field_path: &str, arg: Option<&str>) -> Result<Expression, BuildError> {
    match helper_name {
        "exists" => Ok(build_exists(field_path)),
        "not_exists" => Ok(build_not_exists(field_path)),
        "int_equal" => build_int_cmp_from_arg(IntCmp::Equal, field_path, arg),
        "int_not_equal" => build_int_cmp_from_arg(IntCmp::NotEqual, field_path, arg),
        "int_less" => build_int_cmp_from_arg(IntCmp::Less, field_path, arg),
        "int_less_or_equal" => build_int_cmp_from_arg(IntCmp::LessOrEqual, field_path, arg),
        "int_greater" => build_int_cmp_from_arg(IntCmp::Greater, field_path, arg),
        "int_greater_or_equal" => build_int_cmp_from_arg(IntCmp::GreaterOrEqual, field_path, arg),
        "string_less" => build_string_cmp_from_arg(StringCmp::Less, field_path, arg),
        "string_less_or_equal" => build_string_cmp_from_arg(StringCmp::LessOrEqual, field_path, arg),
        "string_greater" => build_string_cmp_from_arg(StringCmp::Greater, field_path, arg),
        "string_greater_or_equal" => build_string_cmp_from_arg(StringCmp::GreaterOrEqual, field_path, arg),
        other => Err(BuildError::unknown_builder(CONDITION_DISPATCHER, other)),
    }
}

fn build_exists(field_path: &str) -> Expression {
    let field = field_path.to_string();
    let eval_fn: EvalFn = Arc::new(move |event| value::exists(event, &field));
    Expression::Term(Term::new(field_path, "exists", None, eval_fn))
}

fn build_not_exists(field_path: &str) -> Expression {
    let field = field_path.to_string();
    let eval_fn: EvalFn = Arc::new(move |event| !value::exists(event, &field));
    Expression::Term(Term::new(field_path, "not_exists", None, eval_fn))
}

fn build_equal_leaf(field_path: &str, operand: Value) -> Term {
    let field = field_path.to_string();
    let expected = operand.clone();
    let eval_fn: EvalFn = Arc::new(move |event| value::at(event, &field) == Some(&expected));
    Term::new(field_path, "equal", Some(operand), eval_fn)
}

/// Bare equality (no `+` prefix): deep structural equality with the
/// operand. An object operand expands into a conjunction of per-key leaf
/// terms; a nested object one level further in is rejected with
/// [`BuildError::UnsupportedNestedObjectComparison`].
fn build_equal(field_path: &str, operand: &Value) -> Result<Expression, BuildError> {
    match operand {
        Value::Object(map) if !map.is_empty() => {
            let mut children = Vec::with_capacity(map.len());
            for (key, value) in map {
                if matches!(value, Value::Object(inner) if !inner.is_empty()) {
                    return Err(BuildError::unsupported_nested_object(CONDITION_DISPATCHER));
                }
                let child_path = value::join_pointer(field_path, key);
                children.push(Expression::Term(build_equal_leaf(&child_path, value.clone())));
            }
            Expression::and(format!("equal: {field_path}"), children)
        }
        _ => Ok(Expression::Term(build_equal_leaf(field_path, operand.clone()))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntCmp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl IntCmp {
    fn name(self) -> &'static str {
        match self {
            Self::Equal => "int_equal",
            Self::NotEqual => "int_not_equal",
            Self::Less => "int_less",
            Self::LessOrEqual => "int_less_or_equal",
            Self::Greater => "int_greater",
            Self::GreaterOrEqual => "int_greater_or_equal",
        }
    }

    fn apply(self, a: i64, b: i64) -> bool {
        match self {
            Self::Equal => a == b,
            Self::NotEqual => a != b,
            Self::Less => a < b,
            Self::LessOrEqual => a <= b,
            Self::Greater => a > b,
            Self::GreaterOrEqual => a >= b,
        }
    }
}

/// Both operand and event value must be integer; a missing or
/// non-integer field evaluates to `false`.
fn build_int_cmp(cmp: IntCmp, field_path: &str, operand: &Value) -> Result<Expression, BuildError> {
    let expected = value::as_i64(operand).ok_or_else(|| BuildError::type_error(CONDITION_DISPATCHER, cmp.name()))?;
    Ok(make_int_cmp_term(cmp, field_path, expected, operand.clone()))
}

fn build_int_cmp_from_arg(cmp: IntCmp, field_path: &str, arg: Option<&str>) -> Result<Expression, BuildError> {
    let raw = arg.ok_or_else(|| BuildError::type_error(CONDITION_DISPATCHER, cmp.name()))?;
    let expected: i64 = raw
        .parse()
        .map_err(|_| BuildError::type_error(CONDITION_DISPATCHER, cmp.name()))?;
    Ok(make_int_cmp_term(cmp, field_path, expected, Value::from(expected)))
}

fn make_int_cmp_term(cmp: IntCmp, field_path: &str, expected: i64, operand: Value) -> Expression {
    let field = field_path.to_string();
    let eval_fn: EvalFn = Arc::new(move |event| match value::at(event, &field).and_then(value::as_i64) {
        Some(actual) => cmp.apply(actual, expected),
        None => false,
    });
    Expression::Term(Term::new(field_path, cmp.name(), Some(operand), eval_fn))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringCmp {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl StringCmp {
    fn name(self) -> &'static str {
        match self {
            Self::Less => "string_less",
            Self::LessOrEqual => "string_less_or_equal",
            Self::Greater => "string_greater",
            Self::GreaterOrEqual => "string_greater_or_equal",
        }
    }

    fn apply(self, a: &str, b: &str) -> bool {
        match self {
            Self::Less => a < b,
            Self::LessOrEqual => a <= b,
            Self::Greater => a > b,
            Self::GreaterOrEqual => a >= b,
        }
    }
}

/// Lexicographic on code units; both operand and event value must be
/// strings.
fn build_string_cmp(cmp: StringCmp, field_path: &str, operand: &Value) -> Result<Expression, BuildError> {
    let expected = value::as_str(operand)
        .ok_or_else(|| BuildError::type_error(CONDITION_DISPATCHER, cmp.name()))?
        .to_string();
    Ok(make_string_cmp_term(cmp, field_path, expected))
}

fn build_string_cmp_from_arg(cmp: StringCmp, field_path: &str, arg: Option<&str>) -> Result<Expression, BuildError> {
    let expected = arg
        .ok_or_else(|| BuildError::type_error(CONDITION_DISPATCHER, cmp.name()))?
        .to_string();
    Ok(make_string_cmp_term(cmp, field_path, expected))
}

fn make_string_cmp_term(cmp: StringCmp, field_path: &str, expected: String) -> Expression {
    let field = field_path.to_string();
    let operand = Value::String(expected.clone());
    let eval_fn: EvalFn = Arc::new(move |event| match value::at(event, &field).and_then(value::as_str) {
        Some(actual) => cmp.apply(actual, &expected),
        None => false,
    });
    Expression::Term(Term::new(field_path, cmp.name(), Some(operand), eval_fn))
}
