/*!
Compiles a declarative check specification, either a list of field/operand
pairs or a free-form boolean expression string, into a composed
[`Expression`] over structured events, and evaluates that expression with
per-node tracing and short-circuit semantics.

A check definition is built once, at policy-load time, then evaluated many
times against a stream of events:

```
use checkeval::{build_check_stage, evaluate, OperatorRegistry};
use serde_json::json;

let registry = OperatorRegistry::with_defaults();

// list form: a conjunction of field/operator pairs
let definition = json!([
    { "field": "+exists" },
    { "age": "+int_greater_or_equal/18" },
]);
let expr = build_check_stage(&registry, &definition).unwrap();

assert!(evaluate(&expr, &json!({"field": 1, "age": 42})).success);
assert!(!evaluate(&expr, &json!({"field": 1, "age": 10})).success);

// expression form: a free-form boolean expression string
let definition = json!("(+exists/field OR field==42) AND NOT other.field<10");
let expr = build_check_stage(&registry, &definition).unwrap();

assert!(evaluate(&expr, &json!({"field": 1, "other": {"field": 20}})).success);
assert!(!evaluate(&expr, &json!({"other": {"field": 5}})).success);
```

# Scope

This crate is the check-stage compiler and evaluator core of a larger
event-processing engine. It deliberately says nothing about how check
definitions arrive (a CLI, an RPC client, a YAML file) or how the rest of a
policy (decoders, rules, outputs) is built; those are external
collaborators, described only through the interfaces this crate exposes.
The core itself does not persist state, does not perform I/O during
evaluation, and does not mutate events; it produces pure predicates.
*/

pub mod builder;
pub mod error;
pub mod executor;
pub mod expr;
pub mod registry;
pub mod shunting_yard;
pub mod term;
pub mod trace;
pub mod value;

pub use builder::build_check_stage;
pub use error::{BuildError, Result};
pub use executor::{evaluate, evaluate_with_sink, EvalResult};
pub use expr::{EvalFn, Expression, Term};
pub use registry::{Factory, OperatorRegistry, CONDITION_DISPATCHER};
pub use trace::{NullSink, TraceEvent, TraceSink, VecSink};
pub use value::Value;
