//! Construction-time errors. Evaluation never produces one of these; a
//! type mismatch at evaluation time is a plain `false`, not an `Err`.

use thiserror::Error;

/// The canonical stage name used to prefix every construction error raised
/// anywhere in the check-stage compiler, regardless of which internal
/// function raises it. Distinct from the `Expression` node name the check
/// stage's top-level `And` carries in traces, which identifies the node,
/// not the error surface.
pub(crate) const STAGE: &str = "check";

/// All construction-time failures, always surfaced with the owning stage
/// name, the offending token or JSON shape, and a human-readable reason.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BuildError {
    #[error("{stage}: invalid shape, expected \"{expected}\" but got \"{actual}\"")]
    ShapeError {
        stage: String,
        expected: String,
        actual: String,
    },

    #[error("{stage}: invalid operator \"{token}\"")]
    SyntaxError { stage: String, token: String },

    #[error("{stage}: unknown builder \"{name}\"")]
    UnknownBuilder { stage: String, name: String },

    #[error("{stage}: the \"{operator}\" operator only allows operating on numbers or strings")]
    TypeError { stage: String, operator: String },

    #[error("{stage}: comparison of objects that have objects inside is not supported")]
    UnsupportedNestedObjectComparison { stage: String },

    #[error("{stage}: builder \"{name}\" is already registered")]
    DuplicateBuilder { stage: String, name: String },
}

impl BuildError {
    pub fn shape(stage: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeError {
            stage: stage.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn syntax(stage: impl Into<String>, token: impl Into<String>) -> Self {
        Self::SyntaxError {
            stage: stage.into(),
            token: token.into(),
        }
    }

    pub fn unknown_builder(stage: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownBuilder {
            stage: stage.into(),
            name: name.into(),
        }
    }

    pub fn type_error(stage: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::TypeError {
            stage: stage.into(),
            operator: operator.into(),
        }
    }

    pub fn unsupported_nested_object(stage: impl Into<String>) -> Self {
        Self::UnsupportedNestedObjectComparison { stage: stage.into() }
    }

    pub fn duplicate_builder(stage: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateBuilder {
            stage: stage.into(),
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_prefix_the_stage_name() {
        let err = BuildError::unknown_builder("check", "int_frobnicate");
        assert_eq!(
            err.to_string(),
            "check: unknown builder \"int_frobnicate\""
        );
    }
}
