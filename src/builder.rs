//! The Check-Stage Builder: the top-level entry point. Dispatches on the
//! JSON shape of the check definition and returns a composed predicate
//! [`Expression`] (array -> list form, string -> expression form, anything
//! else rejected).

use tracing::debug;

use crate::error::{BuildError, STAGE};
use crate::expr::{Expression, Term};
use crate::registry::OperatorRegistry;
use crate::shunting_yard;
use crate::term;
use crate::value::{self, Value};

/// The trace-node name given to the top-level `And` a list-form check
/// stage compiles into. Distinct from [`STAGE`], the error-surface name.
const TRACE_NODE: &str = "stage.check";

/// Builds a check stage from its JSON definition. Construction is eager
/// and fails fast on any malformed term.
pub fn build_check_stage(registry: &OperatorRegistry, definition: &Value) -> Result<Expression, BuildError> {
    match definition {
        Value::Array(items) => build_list_form(registry, items),
        Value::String(source) => build_expression_form(registry, source),
        other => Err(BuildError::shape(STAGE, "array or string", value::type_name(other))),
    }
}

fn build_list_form(registry: &OperatorRegistry, items: &[Value]) -> Result<Expression, BuildError> {
    debug!(terms = items.len(), "building check stage from list form");
    if items.is_empty() {
        return Err(BuildError::shape(STAGE, "at least one check term", "0 terms"));
    }
    let mut children = Vec::with_capacity(items.len());
    for item in items {
        children.push(term::from_list_entry(registry, item)?);
    }
    Expression::and(TRACE_NODE, children)
}

fn build_expression_form(registry: &OperatorRegistry, source: &str) -> Result<Expression, BuildError> {
    debug!(expression = %source, "building check stage from expression form");
    let eval_fn = shunting_yard::build_evaluator(registry, source)?;
    let name = format!("{STAGE}: {source}");
    Ok(Expression::Term(Term::named(name, eval_fn)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> OperatorRegistry {
        OperatorRegistry::with_defaults()
    }

    #[test]
    fn list_form_builds_and_over_terms() {
        let registry = registry();
        let definition = json!([{"field": "+exists"}]);
        let expr = build_check_stage(&registry, &definition).unwrap();
        match &expr {
            Expression::And { name, children } => {
                assert_eq!(name, "stage.check");
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn string_form_builds_a_single_term() {
        let registry = registry();
        let definition = json!("age>=18 AND age<65");
        let expr = build_check_stage(&registry, &definition).unwrap();
        assert!(expr.is_term());
        assert!(expr.name().starts_with("check: age>=18"));
    }

    #[test]
    fn other_shapes_are_rejected() {
        let registry = registry();
        assert!(build_check_stage(&registry, &json!(42)).is_err());
        assert!(build_check_stage(&registry, &json!({"a": 1})).is_err());
    }

    #[test]
    fn list_form_fails_fast_on_malformed_term() {
        let registry = registry();
        let definition = json!([{"a": 1}, {"b": 2, "c": 3}]);
        assert!(build_check_stage(&registry, &definition).is_err());
    }

    #[test]
    fn empty_list_form_is_rejected_with_the_check_stage_name() {
        let registry = registry();
        let err = build_check_stage(&registry, &json!([])).unwrap_err();
        assert!(err.to_string().starts_with("check:"));
    }
}
