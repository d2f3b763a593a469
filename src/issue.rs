//! Structured validation issues with exact-location paths.
//!
//! Every validation failure in this crate is reported as one or more
//! [`Issue`] values. An issue pinpoints the offending field or index through
//! its `path` (ordered from the root of the input), carries a human-readable
//! message, and optionally a machine-readable `code` plus the constraint
//! details that were violated. The serialized shape of [`Issue`] is a stable
//! interface other tooling may depend on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable issue codes.
///
/// Codes are optional on an issue; these constants cover the conditions the
/// engine itself reports. Custom refinements may introduce their own.
pub mod code {
    /// Input value has the wrong type for the schema kind.
    pub const INVALID_TYPE: &str = "invalid_type";
    /// Input does not equal the expected literal value.
    pub const INVALID_LITERAL: &str = "invalid_literal";
    /// A length or numeric lower bound was violated.
    pub const TOO_SMALL: &str = "too_small";
    /// A length or numeric upper bound was violated.
    pub const TOO_BIG: &str = "too_big";
    /// A string failed its pattern constraint.
    pub const INVALID_STRING: &str = "invalid_string";
    /// A strict-policy object received a key absent from its shape.
    pub const UNRECOGNIZED_KEY: &str = "unrecognized_key";
    /// No union member accepted the input.
    pub const INVALID_UNION: &str = "invalid_union";
    /// A discriminated union found no usable discriminator value.
    pub const INVALID_DISCRIMINATOR: &str = "invalid_discriminator";
    /// A tuple received the wrong number of elements.
    pub const INVALID_ARITY: &str = "invalid_arity";
    /// A refinement or conditional schema rejected the input.
    pub const CUSTOM: &str = "custom";
}

/// One step in an issue path: an object key or an array index.
///
/// Serializes untagged, so a path renders as the JSON array
/// `["profile", "emails", 0, "value"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object member key.
    Key(String),
    /// Array element index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single structured validation error.
///
/// `path` is ordered from the root of the input to the offending field or
/// index and always reflects the true nesting depth, no matter how many
/// combinators wrap the schema that produced the issue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Machine-readable code, one of the [`code`] constants where the engine
    /// produced the issue itself.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<String>,
    /// Human-readable description of the failure.
    pub message: String,
    /// Location of the offending value, root first.
    pub path: Vec<PathSegment>,
    /// What the schema expected, when a type or literal mismatch occurred.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected: Option<String>,
    /// What was actually received, as a type name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub received: Option<String>,
    /// Violated lower bound, for length and range constraints.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub minimum: Option<f64>,
    /// Violated upper bound, for length and range constraints.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub maximum: Option<f64>,
    /// Violated pattern, for string constraints.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pattern: Option<String>,
    /// Per-member failures aggregated by a union that matched no member.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub union_issues: Vec<Issue>,
}

impl Issue {
    /// Create a bare issue with a message and an empty (root) path.
    pub fn new(message: impl Into<String>) -> Self {
        Issue {
            message: message.into(),
            ..Issue::default()
        }
    }

    /// Attach a machine-readable code.
    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    /// Prepend a path segment, moving the issue one nesting level deeper.
    pub fn prefixed(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.insert(0, segment.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = format_path(&self.path);
        if path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{path}: {}", self.message)
        }
    }
}

/// Prefix every issue in `issues` with `segment`.
pub(crate) fn prefix_issues(
    issues: Vec<Issue>,
    segment: impl Into<PathSegment> + Clone,
) -> Vec<Issue> {
    issues
        .into_iter()
        .map(|issue| issue.prefixed(segment.clone()))
        .collect()
}

/// Render a path as `profile.emails[0].value`.
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// Render issues as one human-readable line per issue.
///
/// Union aggregates are flattened with their member failures indented below
/// the aggregate line.
pub fn format_issues(issues: &[Issue]) -> String {
    let mut lines = Vec::new();
    for issue in issues {
        lines.push(issue.to_string());
        for nested in &issue.union_issues {
            lines.push(format!("  - {nested}"));
        }
    }
    lines.join("\n")
}
