//! Concrete end-to-end scenarios covering list-form existence checks,
//! expression-form numeric and equality comparisons, short-circuit
//! tracing, and the nested-object-comparison rejection.

use checkeval::{build_check_stage, evaluate, evaluate_with_sink, OperatorRegistry, VecSink};
use serde_json::json;

fn registry() -> OperatorRegistry {
    OperatorRegistry::with_defaults()
}

#[test]
fn list_form_existence() {
    let registry = registry();
    let definition = json!([{"field": "+exists"}]);
    let expr = build_check_stage(&registry, &definition).unwrap();

    assert!(evaluate(&expr, &json!({"field": 1})).success);
    assert!(evaluate(&expr, &json!({"field": "1"})).success);
    assert!(!evaluate(&expr, &json!({"other": 1})).success);
}

#[test]
fn list_form_not_exists() {
    let registry = registry();
    let definition = json!([{"field": "+not_exists"}]);
    let expr = build_check_stage(&registry, &definition).unwrap();

    assert!(!evaluate(&expr, &json!({"field": 1})).success);
    assert!(evaluate(&expr, &json!({"other": 1})).success);
}

#[test]
fn expression_form_numeric_compare() {
    let registry = registry();
    let definition = json!("age>=18 AND age<65");
    let expr = build_check_stage(&registry, &definition).unwrap();

    assert!(evaluate(&expr, &json!({"age": 42})).success);
    assert!(!evaluate(&expr, &json!({"age": 17})).success);
    assert!(!evaluate(&expr, &json!({"age": 65})).success);
    assert!(!evaluate(&expr, &json!({"age": "42"})).success); // type mismatch -> false, not error
}

#[test]
fn expression_form_equality_with_json_literal() {
    let registry = registry();

    let level = build_check_stage(&registry, &json!("level==3")).unwrap();
    assert!(evaluate(&level, &json!({"level": 3})).success);
    assert!(!evaluate(&level, &json!({"level": "3"})).success); // literal parses as integer

    let name = build_check_stage(&registry, &json!("name==admin")).unwrap();
    assert!(evaluate(&name, &json!({"name": "admin"})).success);
}

#[test]
fn short_circuit_trace() {
    let registry = registry();
    let definition = json!([{"a": "+exists"}, {"b": "+exists"}]);
    let expr = build_check_stage(&registry, &definition).unwrap();
    let event = json!({"a": 1});

    let mut sink = VecSink::new();
    let result = evaluate_with_sink(&expr, &event, &mut sink);

    assert!(!result.success);
    // exactly two traces: success for `a`, failure for `b`, then the
    // And's failure trace, no further traces.
    assert_eq!(sink.events().len(), 3);
    assert!(sink.events()[0].success);
    assert!(!sink.events()[1].success);
    assert!(!sink.events()[2].success);
}

#[test]
fn nested_object_comparison_is_unsupported() {
    let registry = registry();
    let definition = json!([{"f": {"inner": {"deep": 1}}}]);
    let err = build_check_stage(&registry, &definition).unwrap_err();
    assert!(matches!(
        err,
        checkeval::BuildError::UnsupportedNestedObjectComparison { .. }
    ));
}
