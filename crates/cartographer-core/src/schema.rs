//! The schema engine.
//!
//! A [`Schema`] describes the expected shape of a JSON value. It can
//! [validate](Schema::validate) a value (collecting every issue, coercing and
//! transforming where configured) and [derive](Schema::to_json_schema) a
//! JSON-schema document from itself.
//!
//! # Example
//!
//! ```rust
//! use cartographer_core::Schema;
//! use serde_json::json;
//!
//! let user = Schema::object()
//!     .field("name", Schema::string().min_length(1))
//!     .field("age", Schema::integer().min(0.0).optional());
//!
//! assert!(user.validate(&json!({"name": "Ada"})).is_ok());
//! assert!(user.validate(&json!({"name": ""})).is_err());
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;

use crate::issue::{Issue, IssueCode, PathSegment, SchemaError};

/// A post-validation mapping applied to an accepted value.
///
/// Returning `Err(message)` turns the value into a [`IssueCode::Custom`] issue.
#[derive(Clone)]
pub struct Transform(Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>);

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// How an object schema treats keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop undeclared keys from the output.
    #[default]
    Strip,
    /// Copy undeclared keys to the output unchanged.
    Passthrough,
    /// Report undeclared keys as an issue.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StringRules {
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<Regex>,
    pub(crate) coerce: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NumberRules {
    pub(crate) integer: bool,
    pub(crate) minimum: Option<f64>,
    pub(crate) maximum: Option<f64>,
    pub(crate) coerce: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ArrayRules {
    pub(crate) items: Box<Schema>,
    pub(crate) min_items: Option<usize>,
    pub(crate) max_items: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectRules {
    pub(crate) fields: IndexMap<String, Schema>,
    pub(crate) unknown_keys: UnknownKeys,
}

#[derive(Debug, Clone)]
pub(crate) enum Kind {
    Any,
    String(StringRules),
    Number(NumberRules),
    Boolean { coerce: bool },
    Literal(Value),
    Enum(Vec<String>),
    Array(ArrayRules),
    Object(ObjectRules),
    Union(Vec<Schema>),
}

/// A declarative description of a JSON value.
///
/// Schemas are immutable values built with chained constructors and
/// modifiers. Cloning is cheap enough for configuration-time use; transforms
/// are shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) kind: Kind,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
    pub(crate) description: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) transforms: Vec<Transform>,
}

impl Schema {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            description: None,
            default: None,
            transforms: Vec::new(),
        }
    }

    /// Accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    /// Accepts strings.
    #[must_use]
    pub fn string() -> Self {
        Self::of(Kind::String(StringRules::default()))
    }

    /// Accepts any JSON number.
    #[must_use]
    pub fn number() -> Self {
        Self::of(Kind::Number(NumberRules::default()))
    }

    /// Accepts integral JSON numbers.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(Kind::Number(NumberRules {
            integer: true,
            ..NumberRules::default()
        }))
    }

    /// Accepts booleans.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(Kind::Boolean { coerce: false })
    }

    /// Accepts exactly `value`.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::of(Kind::Literal(value.into()))
    }

    /// Accepts one of the given strings.
    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(Kind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// Accepts arrays whose items all match `items`.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::of(Kind::Array(ArrayRules {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }))
    }

    /// Accepts objects; declare fields with [`Schema::field`].
    #[must_use]
    pub fn object() -> Self {
        Self::of(Kind::Object(ObjectRules::default()))
    }

    /// Builds an object schema from a field map, keeping its order.
    #[must_use]
    pub fn object_from(fields: IndexMap<String, Schema>) -> Self {
        Self::of(Kind::Object(ObjectRules {
            fields,
            unknown_keys: UnknownKeys::Strip,
        }))
    }

    /// Accepts a value matching any of `variants`; the first match wins.
    #[must_use]
    pub fn union<I: IntoIterator<Item = Schema>>(variants: I) -> Self {
        Self::of(Kind::Union(variants.into_iter().collect()))
    }

    /// Declares an object field. Has no effect on non-object schemas.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        if let Kind::Object(rules) = &mut self.kind {
            rules.fields.insert(name.into(), schema);
        }
        self
    }

    /// Rejects undeclared object keys.
    #[must_use]
    pub fn strict(mut self) -> Self {
        if let Kind::Object(rules) = &mut self.kind {
            rules.unknown_keys = UnknownKeys::Strict;
        }
        self
    }

    /// Keeps undeclared object keys in the output.
    #[must_use]
    pub fn passthrough(mut self) -> Self {
        if let Kind::Object(rules) = &mut self.kind {
            rules.unknown_keys = UnknownKeys::Passthrough;
        }
        self
    }

    /// Allows the value to be absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Allows the value to be `null`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attaches a description, rendered into derived JSON schemas.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Value substituted when the field is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Converts string input to the target scalar type before checking it.
    ///
    /// Query strings only carry strings, so numeric and boolean query fields
    /// usually need this.
    #[must_use]
    pub fn coerce(mut self) -> Self {
        match &mut self.kind {
            Kind::String(rules) => rules.coerce = true,
            Kind::Number(rules) => rules.coerce = true,
            Kind::Boolean { coerce } => *coerce = true,
            _ => {}
        }
        self
    }

    /// Minimum string length in characters.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.min_length = Some(len);
        }
        self
    }

    /// Maximum string length in characters.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.max_length = Some(len);
        }
        self
    }

    /// Pattern the string must match.
    ///
    /// The match is unanchored, as with JSON Schema `pattern`; use `^` and
    /// `$` to constrain the whole string.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.pattern = Some(pattern);
        }
        self
    }

    /// Inclusive lower bound for numbers.
    #[must_use]
    pub fn min(mut self, minimum: f64) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.minimum = Some(minimum);
        }
        self
    }

    /// Inclusive upper bound for numbers.
    #[must_use]
    pub fn max(mut self, maximum: f64) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.maximum = Some(maximum);
        }
        self
    }

    /// Minimum number of array items.
    #[must_use]
    pub fn min_items(mut self, count: usize) -> Self {
        if let Kind::Array(rules) = &mut self.kind {
            rules.min_items = Some(count);
        }
        self
    }

    /// Maximum number of array items.
    #[must_use]
    pub fn max_items(mut self, count: usize) -> Self {
        if let Kind::Array(rules) = &mut self.kind {
            rules.max_items = Some(count);
        }
        self
    }

    /// Maps the accepted value; transforms run in the order they were added.
    #[must_use]
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.transforms.push(Transform(Arc::new(f)));
        self
    }

    /// Returns true if the value may be absent (optional or defaulted).
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }

    /// Returns true if `null` is accepted.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the declared fields for object schemas.
    #[must_use]
    pub fn object_fields(&self) -> Option<&IndexMap<String, Schema>> {
        match &self.kind {
            Kind::Object(rules) => Some(&rules.fields),
            _ => None,
        }
    }

    /// Validates `value`, returning the (possibly coerced and transformed)
    /// output or every issue found.
    ///
    /// A root `null` is treated as an absent value: it is accepted by
    /// optional schemas (yielding the default, if any).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] listing every issue when the value does not
    /// conform.
    pub fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        if value.is_null() && !self.nullable && self.is_optional() {
            return Ok(self.default.clone().unwrap_or(Value::Null));
        }

        let mut issues = Vec::new();
        let mut path = Vec::new();
        match self.check(value, &mut path, &mut issues) {
            Some(output) if issues.is_empty() => Ok(output),
            _ => Err(SchemaError::new(issues)),
        }
    }

    fn check(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        let accepted = if value.is_null() && self.nullable {
            Some(Value::Null)
        } else {
            let before = issues.len();
            let output = self.check_kind(value, path, issues);
            if issues.len() > before {
                return None;
            }
            output
        }?;

        let mut output = accepted;
        for Transform(f) in &self.transforms {
            match f(output) {
                Ok(next) => output = next,
                Err(message) => {
                    issues.push(Issue::new(path, IssueCode::Custom, message));
                    return None;
                }
            }
        }
        Some(output)
    }

    fn check_kind(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        match &self.kind {
            Kind::Any => Some(value.clone()),
            Kind::String(rules) => check_string(rules, value, path, issues),
            Kind::Number(rules) => check_number(rules, value, path, issues),
            Kind::Boolean { coerce } => check_boolean(*coerce, value, path, issues),
            Kind::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    issues.push(Issue::new(
                        path,
                        IssueCode::InvalidLiteral,
                        format!("Invalid literal value, expected {expected}"),
                    ));
                    None
                }
            }
            Kind::Enum(members) => match value.as_str() {
                Some(s) if members.iter().any(|m| m == s) => Some(value.clone()),
                _ => {
                    let expected = members
                        .iter()
                        .map(|m| format!("'{m}'"))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    issues.push(Issue::new(
                        path,
                        IssueCode::InvalidEnumValue,
                        format!("Invalid enum value. Expected {expected}, received {value}"),
                    ));
                    None
                }
            },
            Kind::Array(rules) => check_array(rules, value, path, issues),
            Kind::Object(rules) => check_object(rules, value, path, issues),
            Kind::Union(variants) => {
                for variant in variants {
                    let mut scratch = Vec::new();
                    if let Some(output) = variant.check(value, path, &mut scratch) {
                        if scratch.is_empty() {
                            return Some(output);
                        }
                    }
                }
                issues.push(Issue::new(path, IssueCode::InvalidUnion, "Invalid input"));
                None
            }
        }
    }
}

fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(path: &[PathSegment], expected: &str, value: &Value) -> Issue {
    Issue::new(
        path,
        IssueCode::InvalidType,
        format!("Expected {expected}, received {}", received(value)),
    )
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if rules.coerce => n.to_string(),
        Value::Bool(b) if rules.coerce => b.to_string(),
        other => {
            issues.push(invalid_type(path, "string", other));
            return None;
        }
    };

    let len = text.chars().count();
    if let Some(min) = rules.min_length {
        if len < min {
            issues.push(Issue::new(
                path,
                IssueCode::TooSmall,
                format!("String must contain at least {min} character(s)"),
            ));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            issues.push(Issue::new(
                path,
                IssueCode::TooBig,
                format!("String must contain at most {max} character(s)"),
            ));
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(&text) {
            issues.push(Issue::new(
                path,
                IssueCode::InvalidString,
                format!("String does not match pattern {}", pattern.as_str()),
            ));
        }
    }
    Some(Value::String(text))
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let expected = if rules.integer { "integer" } else { "number" };
    let (number, output) = match value {
        Value::Number(n) => (n.as_f64()?, value.clone()),
        Value::String(s) if rules.coerce => match s.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && !s.trim().is_empty() => {
                (parsed, number_value(parsed))
            }
            _ => {
                issues.push(invalid_type(path, expected, value));
                return None;
            }
        },
        other => {
            issues.push(invalid_type(path, expected, other));
            return None;
        }
    };

    if rules.integer && number.fract() != 0.0 {
        issues.push(Issue::new(
            path,
            IssueCode::InvalidType,
            "Expected integer, received float",
        ));
        return None;
    }
    if let Some(min) = rules.minimum {
        if number < min {
            issues.push(Issue::new(
                path,
                IssueCode::TooSmall,
                format!("Number must be greater than or equal to {min}"),
            ));
        }
    }
    if let Some(max) = rules.maximum {
        if number > max {
            issues.push(Issue::new(
                path,
                IssueCode::TooBig,
                format!("Number must be less than or equal to {max}"),
            ));
        }
    }
    Some(output)
}

/// Integral values stay integral in the output.
#[allow(clippy::cast_possible_truncation)]
fn number_value(parsed: f64) -> Value {
    if parsed.fract() == 0.0 && parsed.abs() < 9.0e15 {
        Value::Number(Number::from(parsed as i64))
    } else {
        Number::from_f64(parsed).map_or(Value::Null, Value::Number)
    }
}

fn check_boolean(
    coerce: bool,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) if coerce => match s.as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => {
                issues.push(invalid_type(path, "boolean", value));
                None
            }
        },
        other => {
            issues.push(invalid_type(path, "boolean", other));
            None
        }
    }
}

fn check_array(
    rules: &ArrayRules,
    value: &Value,
    path: &mut Vec<PathSegment>,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::Array(items) = value else {
        issues.push(invalid_type(path, "array", value));
        return None;
    };

    if let Some(min) = rules.min_items {
        if items.len() < min {
            issues.push(Issue::new(
                path,
                IssueCode::TooSmall,
                format!("Array must contain at least {min} element(s)"),
            ));
        }
    }
    if let Some(max) = rules.max_items {
        if items.len() > max {
            issues.push(Issue::new(
                path,
                IssueCode::TooBig,
                format!("Array must contain at most {max} element(s)"),
            ));
        }
    }

    let mut output = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        path.push(PathSegment::Index(index));
        if let Some(checked) = rules.items.check(item, path, issues) {
            output.push(checked);
        }
        path.pop();
    }
    Some(Value::Array(output))
}

fn check_object(
    rules: &ObjectRules,
    value: &Value,
    path: &mut Vec<PathSegment>,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::Object(input) = value else {
        issues.push(invalid_type(path, "object", value));
        return None;
    };

    let mut output = Map::new();
    for (name, field) in &rules.fields {
        path.push(PathSegment::Key(name.clone()));
        match input.get(name) {
            Some(present) => {
                if let Some(checked) = field.check(present, path, issues) {
                    output.insert(name.clone(), checked);
                }
            }
            None => {
                if let Some(default) = &field.default {
                    output.insert(name.clone(), default.clone());
                } else if !field.optional {
                    issues.push(Issue::new(path, IssueCode::Required, "Required"));
                }
            }
        }
        path.pop();
    }

    let unknown: Vec<&String> = input
        .keys()
        .filter(|key| !rules.fields.contains_key(key.as_str()))
        .collect();
    match rules.unknown_keys {
        UnknownKeys::Strip => {}
        UnknownKeys::Passthrough => {
            for key in unknown {
                output.insert(key.clone(), input[key.as_str()].clone());
            }
        }
        UnknownKeys::Strict if !unknown.is_empty() => {
            let keys = unknown
                .iter()
                .map(|k| format!("'{k}'"))
                .collect::<Vec<_>>()
                .join(", ");
            issues.push(Issue::new(
                path,
                IssueCode::UnrecognizedKeys,
                format!("Unrecognized key(s) in object: {keys}"),
            ));
        }
        UnknownKeys::Strict => {}
    }

    Some(Value::Object(output))
}
