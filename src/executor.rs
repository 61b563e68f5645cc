//! The Executor: applies a composed [`Expression`] to an event and returns
//! an [`EvalResult`] carrying the outcome plus a trace string, optionally
//! also recording every traversed node into a [`TraceSink`].
//!
//! Short-circuit rules are observable through traces: `And` only emits its
//! own trace after walking every child successfully, or stops (without
//! emitting any further child trace) at the first failing child; `Or` is
//! symmetric; `Not` inverts both the result and which child trace is
//! propagated.

use crate::expr::Expression;
use crate::trace::{NullSink, TraceEvent, TraceSink};
use crate::value::Value;

/// The outcome of evaluating a check expression against one event. The
/// event itself is not carried here. Callers already hold the shared
/// reference they passed in, and the evaluator does not mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalResult {
    pub success: bool,
    pub trace: String,
}

/// Evaluates `expr` against `event`, discarding per-node trace events
/// (the common hot-path case, see [`crate::trace::NullSink`]).
pub fn evaluate(expr: &Expression, event: &Value) -> EvalResult {
    evaluate_with_sink(expr, event, &mut NullSink)
}

/// Evaluates `expr` against `event`, recording every traversed node's
/// outcome into `sink` in strict left-to-right order.
pub fn evaluate_with_sink(expr: &Expression, event: &Value, sink: &mut dyn TraceSink) -> EvalResult {
    match expr {
        Expression::Term(term) => {
            let success = term.eval(event);
            let message = if success {
                term.success_trace.clone()
            } else {
                term.failure_trace.clone()
            };
            sink.record(TraceEvent {
                node: term.name.clone(),
                success,
                message: message.clone(),
            });
            EvalResult { success, trace: message }
        }
        Expression::And { name, children } => {
            let mut last = EvalResult {
                success: true,
                trace: String::new(),
            };
            for child in children {
                last = evaluate_with_sink(child, event, sink);
                if !last.success {
                    let message = format!("[{name}] -> Failure");
                    sink.record(TraceEvent {
                        node: name.clone(),
                        success: false,
                        message: message.clone(),
                    });
                    return EvalResult { success: false, trace: message };
                }
            }
            let message = format!("[{name}] -> Success");
            sink.record(TraceEvent {
                node: name.clone(),
                success: true,
                message: message.clone(),
            });
            EvalResult { success: true, trace: message }
        }
        Expression::Or { name, children } => {
            for child in children {
                let result = evaluate_with_sink(child, event, sink);
                if result.success {
                    let message = format!("[{name}] -> Success");
                    sink.record(TraceEvent {
                        node: name.clone(),
                        success: true,
                        message: message.clone(),
                    });
                    return EvalResult { success: true, trace: message };
                }
            }
            let message = format!("[{name}] -> Failure");
            sink.record(TraceEvent {
                node: name.clone(),
                success: false,
                message: message.clone(),
            });
            EvalResult { success: false, trace: message }
        }
        Expression::Not { name, child } => {
            let inner = evaluate_with_sink(child, event, sink);
            let success = !inner.success;
            let message = if success {
                format!("[{name}] -> Success")
            } else {
                format!("[{name}] -> Failure")
            };
            sink.record(TraceEvent {
                node: name.clone(),
                success,
                message: message.clone(),
            });
            EvalResult { success, trace: message }
        }
        Expression::Chain { name, .. } | Expression::Broadcast { name, .. } => {
            unreachable!(
                "the check core never constructs {name}: Chain/Broadcast belong to sibling stage builders"
            )
        }
    }
}
