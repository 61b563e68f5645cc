//! The Expression Tree: a tagged sum over `{Term, And, Or, Not, Chain,
//! Broadcast}`. The check core only ever constructs `Term`, `And`, `Or` and
//! `Not`; `Chain` and `Broadcast` exist on the enum because sibling stage
//! builders (map/parse/normalize/output) share this same type, but they
//! are out of scope here and are never produced by anything in this crate.
//!
//! An expression tree is immutable after construction and owned by value,
//! single-tree, no sharing between siblings. Each node owns its children
//! directly rather than through an index into a flat arena, since the
//! check core never mutates a tree in place after it's built.

use std::fmt;
use std::sync::Arc;

use crate::error::BuildError;
use crate::value::Value;

/// The compiled leaf function: evaluates a single field/operator/operand
/// triple against an event. Must be side-effect-free.
pub type EvalFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A leaf predicate over a single field.
#[derive(Clone)]
pub struct Term {
    pub field_path: String,
    pub op_name: String,
    pub operand: Option<Value>,
    pub eval_fn: EvalFn,
    pub name: String,
    pub success_trace: String,
    pub failure_trace: String,
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term")
            .field("field_path", &self.field_path)
            .field("op_name", &self.op_name)
            .field("operand", &self.operand)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Term {
    pub fn new(
        field_path: impl Into<String>,
        op_name: impl Into<String>,
        operand: Option<Value>,
        eval_fn: EvalFn,
    ) -> Self {
        let field_path = field_path.into();
        let op_name = op_name.into();
        let name = format!("{}: {}", op_name, field_path);
        let success_trace = format!("[{name}] -> Success");
        let failure_trace = format!("[{name}] -> Failure");
        Self {
            field_path,
            op_name,
            operand,
            eval_fn,
            name,
            success_trace,
            failure_trace,
        }
    }

    /// Builds a term whose `name` is exactly `name`, rather than the
    /// `"<op>: <field_path>"` template `new` derives. Used for the
    /// expression-string check stage, where the whole compiled boolean
    /// expression is the "operation", not a single field.
    pub fn named(name: impl Into<String>, eval_fn: EvalFn) -> Self {
        let name = name.into();
        let success_trace = format!("[{name}] -> Success");
        let failure_trace = format!("[{name}] -> Failure");
        Self {
            field_path: String::new(),
            op_name: name.clone(),
            operand: None,
            eval_fn,
            name,
            success_trace,
            failure_trace,
        }
    }

    pub fn eval(&self, event: &Value) -> bool {
        (self.eval_fn)(event)
    }

    /// Returns a copy of this term whose evaluation is the logical negation
    /// of the original, keeping a single trace event rather than wrapping
    /// in a `Not` node. Used for the `!=` case.
    pub fn negated(&self) -> Self {
        let fn_ = self.eval_fn.clone();
        let negated_fn: EvalFn = Arc::new(move |event| !fn_(event));
        let op_name = format!("not_{}", self.op_name);
        Self::new(self.field_path.clone(), op_name, self.operand.clone(), negated_fn)
    }
}

/// Tagged sum over the node kinds of an expression tree.
#[derive(Debug, Clone)]
pub enum Expression {
    Term(Term),
    And { name: String, children: Vec<Expression> },
    Or { name: String, children: Vec<Expression> },
    Not { name: String, child: Box<Expression> },
    /// Reserved for sibling stage builders; unused by the check core.
    Chain { name: String, children: Vec<Expression> },
    /// Reserved for sibling stage builders; unused by the check core.
    Broadcast { name: String, children: Vec<Expression> },
}

impl Expression {
    pub fn term(term: Term) -> Self {
        Self::Term(term)
    }

    pub fn and(name: impl Into<String>, children: Vec<Expression>) -> Result<Self, BuildError> {
        let name = name.into();
        if children.is_empty() {
            return Err(BuildError::shape(name, "at least one child", "0 children"));
        }
        Ok(Self::And { name, children })
    }

    pub fn or(name: impl Into<String>, children: Vec<Expression>) -> Result<Self, BuildError> {
        let name = name.into();
        if children.is_empty() {
            return Err(BuildError::shape(name, "at least one child", "0 children"));
        }
        Ok(Self::Or { name, children })
    }

    pub fn not(name: impl Into<String>, child: Expression) -> Self {
        Self::Not {
            name: name.into(),
            child: Box::new(child),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Term(t) => &t.name,
            Self::And { name, .. }
            | Self::Or { name, .. }
            | Self::Not { name, .. }
            | Self::Chain { name, .. }
            | Self::Broadcast { name, .. } => name,
        }
    }

    pub fn is_term(&self) -> bool {
        matches!(self, Self::Term(_))
    }

    /// Returns the flat list of child terms if this expression is either a
    /// bare `Term` or a composite whose direct children are all terms
    /// (object-equality expansion). `None` if any child is itself
    /// composite.
    pub fn as_flat_terms(&self) -> Option<Vec<&Term>> {
        match self {
            Self::Term(t) => Some(vec![t]),
            Self::And { children, .. } | Self::Or { children, .. } => {
                let mut out = Vec::with_capacity(children.len());
                for child in children {
                    match child {
                        Self::Term(t) => out.push(t),
                        _ => return None,
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }
}
