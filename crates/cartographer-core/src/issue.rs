//! Validation issues reported by the schema engine.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One step of the path from the validated root to the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Machine-readable classification of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// The value has the wrong JSON type.
    InvalidType,
    /// A required object field is missing.
    Required,
    /// A string, number or array is below its lower bound.
    TooSmall,
    /// A string, number or array is above its upper bound.
    TooBig,
    /// A string does not match its pattern.
    InvalidString,
    /// A value is not one of the allowed enum members.
    InvalidEnumValue,
    /// A value differs from the expected literal.
    InvalidLiteral,
    /// No member of a union accepted the value.
    InvalidUnion,
    /// A strict object received keys it does not declare.
    UnrecognizedKeys,
    /// A transform rejected the value.
    Custom,
}

impl IssueCode {
    /// Returns the snake_case name used in error payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::Required => "required",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::InvalidString => "invalid_string",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::InvalidLiteral => "invalid_literal",
            Self::InvalidUnion => "invalid_union",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::Custom => "custom",
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Location of the offending value.
    pub path: Vec<PathSegment>,
    /// Classification.
    pub code: IssueCode,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    /// Creates an issue at the given path.
    #[must_use]
    pub fn new(path: &[PathSegment], code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            code,
            message: message.into(),
        }
    }

    /// Returns the path joined with dots (`items.0.name`); empty for the root.
    #[must_use]
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.dotted_path(), self.message)
        }
    }
}

/// The failure outcome of [`Schema::validate`](crate::Schema::validate).
///
/// Issues are collected across the whole value rather than stopping at the
/// first one, and keep the order in which they were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.issues))]
pub struct SchemaError {
    /// All issues found, in traversal order.
    pub issues: Vec<Issue>,
}

impl SchemaError {
    /// Wraps a list of issues.
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Returns the first issue, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Issue> {
        self.issues.first()
    }
}

fn summarize(issues: &[Issue]) -> String {
    match issues {
        [] => "validation failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_path() {
        let issue = Issue::new(
            &[PathSegment::Key("items".into()), PathSegment::Index(2), PathSegment::Key("name".into())],
            IssueCode::Required,
            "Required",
        );
        assert_eq!(issue.dotted_path(), "items.2.name");
        assert_eq!(issue.to_string(), "items.2.name: Required");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::new(vec![
            Issue::new(&[PathSegment::Key("a".into())], IssueCode::Required, "Required"),
            Issue::new(&[PathSegment::Key("b".into())], IssueCode::Required, "Required"),
        ]);
        assert_eq!(err.to_string(), "a: Required (and 1 more)");
    }

    #[test]
    fn test_issue_serializes_path_segments() {
        let issue = Issue::new(
            &[PathSegment::Key("tags".into()), PathSegment::Index(0)],
            IssueCode::InvalidType,
            "Expected string",
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], serde_json::json!(["tags", 0]));
        assert_eq!(json["code"], "invalid_type");
    }
}
