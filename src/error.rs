//! Error types for schema validation and mock generation.
//!
//! Two classes of failure exist. Validation failures are expected and
//! data-dependent: they are always represented as [`ValidationError`] values
//! carrying structured [`Issue`]s, never panics. Mock-generation failures
//! ([`MockError`]) are programmer or configuration errors with no sensible
//! partial result, so the mock entry points fail fast with them.

use crate::issue::{Issue, format_issues};
use serde_json::Value;

/// Result of parsing an input value against a schema.
pub type ParseOutcome = Result<Value, ValidationError>;

/// A failed validation, carrying every issue collected during the parse.
///
/// Composite schemas do not short-circuit: all per-child issues are
/// aggregated before the parse fails, so `issues` reflects every violation
/// found in the input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("validation failed with {} issue(s):\n{}", .issues.len(), format_issues(.issues))]
pub struct ValidationError {
    /// The collected issues, in discovery order.
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Wrap a list of issues.
    pub fn new(issues: Vec<Issue>) -> Self {
        ValidationError { issues }
    }

    /// Wrap a single issue.
    pub fn single(issue: Issue) -> Self {
        ValidationError {
            issues: vec![issue],
        }
    }
}

/// Fatal mock-generation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    /// Generation recursed past the configured depth limit, typically on a
    /// self-referential schema.
    #[error("maximum recursion depth exceeded at depth {depth}")]
    MaxDepthExceeded { depth: usize },

    /// No candidate value could be synthesized that the schema accepts.
    #[error("cannot generate mock data for {kind} schema")]
    CannotGenerate { kind: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_includes_paths() {
        let error = ValidationError::new(vec![
            Issue::new("Expected a string, but received boolean").prefixed("name"),
            Issue::new("Number must be at least 1").prefixed("count"),
        ]);
        let rendered = error.to_string();
        assert!(rendered.contains("2 issue(s)"));
        assert!(rendered.contains("name: Expected a string, but received boolean"));
        assert!(rendered.contains("count: Number must be at least 1"));
    }

    #[test]
    fn mock_error_display() {
        let error = MockError::MaxDepthExceeded { depth: 4 };
        assert_eq!(
            error.to_string(),
            "maximum recursion depth exceeded at depth 4"
        );
    }
}
