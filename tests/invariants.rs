//! Property-based checks for the evaluator's core invariants: non-mutation
//! of events, And/Or short-circuit semantics, Not inversion, missing-field
//! equality, construction determinism, operator precedence, and `!=` as
//! the negation of `==`.

use checkeval::{build_check_stage, evaluate, evaluate_with_sink, Expression, OperatorRegistry, VecSink};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use serde_json::json;

fn registry() -> OperatorRegistry {
    OperatorRegistry::with_defaults()
}

fn age_event(age: i64) -> serde_json::Value {
    json!({"age": age})
}

/// Evaluating an expression never mutates the event.
#[quickcheck]
fn evaluation_does_not_mutate_event(age: i64) -> bool {
    let registry = registry();
    let expr = build_check_stage(&registry, &json!("age>=0")).unwrap();
    let event = age_event(age);
    let before = event.clone();
    let _ = evaluate(&expr, &event);
    event == before
}

/// `And(a, b)` succeeds iff both succeed; if `a` fails, `b` is never
/// evaluated (observable via absence of its trace).
#[quickcheck]
fn and_semantics_and_short_circuit(a: bool, b: bool) -> bool {
    let registry = registry();
    let a_expr = build_check_stage(&registry, &json!(if a { "age>=0" } else { "age<0" })).unwrap();
    let b_expr = build_check_stage(&registry, &json!(if b { "age>=0" } else { "age<0" })).unwrap();
    let and_expr = Expression::and("probe", vec![a_expr, b_expr]).unwrap();

    let mut sink = VecSink::new();
    let event = age_event(1);
    let result = evaluate_with_sink(&and_expr, &event, &mut sink);

    let semantics_hold = result.success == (a && b);
    let short_circuit_holds = if !a { sink.events().len() == 2 } else { true };
    semantics_hold && short_circuit_holds
}

/// `Or(a, b)` succeeds iff either succeeds; if `a` succeeds, `b` is never
/// evaluated.
#[quickcheck]
fn or_semantics_and_short_circuit(a: bool, b: bool) -> bool {
    let registry = registry();
    let a_expr = build_check_stage(&registry, &json!(if a { "age>=0" } else { "age<0" })).unwrap();
    let b_expr = build_check_stage(&registry, &json!(if b { "age>=0" } else { "age<0" })).unwrap();
    let or_expr = Expression::or("probe", vec![a_expr, b_expr]).unwrap();

    let mut sink = VecSink::new();
    let event = age_event(1);
    let result = evaluate_with_sink(&or_expr, &event, &mut sink);

    let semantics_hold = result.success == (a || b);
    let short_circuit_holds = if a { sink.events().len() == 2 } else { true };
    semantics_hold && short_circuit_holds
}

/// `Not(x)` succeeds iff `x` fails.
#[quickcheck]
fn not_inverts(x: bool) -> bool {
    let registry = registry();
    let inner = build_check_stage(&registry, &json!(if x { "age>=0" } else { "age<0" })).unwrap();
    let not_expr = Expression::not("probe", inner);
    let event = age_event(1);
    evaluate(&not_expr, &event).success == !x
}

/// `equal(path, v)` on an event missing `path` evaluates to false for any
/// non-null literal `v`.
#[quickcheck]
fn equal_on_missing_field_is_false(v: i64) -> bool {
    let registry = registry();
    let definition = json!([{"missing": v}]);
    let expr = build_check_stage(&registry, &definition).unwrap();
    !evaluate(&expr, &json!({"present": 1})).success
}

/// Construction is deterministic: building the same definition twice
/// yields structurally identical trace names.
#[quickcheck]
fn construction_is_deterministic(age: i64) -> bool {
    let registry = registry();
    let definition = json!([{ "age": age }]);
    let a = build_check_stage(&registry, &definition).unwrap();
    let b = build_check_stage(&registry, &definition).unwrap();
    a.name() == b.name()
}

/// `!=` is the logical negation of `==`.
#[quickcheck]
fn not_equal_negates_equal(age: i64, probe: i64) -> TestResult {
    if age == probe {
        // negation is trivially consistent but not interesting to assert
        // on directly since both sides degenerate to the same boolean;
        // skip to keep the property meaningful.
        return TestResult::discard();
    }
    let registry = registry();
    let eq = build_check_stage(&registry, &json!(format!("age=={probe}"))).unwrap();
    let neq = build_check_stage(&registry, &json!(format!("age!={probe}"))).unwrap();
    let event = age_event(age);
    TestResult::from_bool(evaluate(&eq, &event).success != evaluate(&neq, &event).success)
}

/// Precedence is a fixed grammar fact, not a quantified claim over
/// arbitrary inputs, so this is a plain concrete test rather than a
/// property: `"x AND y OR z"` parses as `Or(And(x,y), z)`.
#[test]
fn and_binds_tighter_than_or() {
    let registry = registry();
    let expr = build_check_stage(&registry, &json!("age>=10 AND age<20 OR age==99")).unwrap();

    assert!(evaluate(&expr, &json!({"age": 15})).success); // And branch
    assert!(evaluate(&expr, &json!({"age": 99})).success); // Or branch
    assert!(!evaluate(&expr, &json!({"age": 50})).success);
}
