//! JSON-schema derivation for [`Schema`].
//!
//! Two dialects are supported. [`Dialect::OpenApi3`] is the flavour embedded
//! in OpenAPI 3.0 documents (`nullable: true`, no `const`), while
//! [`Dialect::JsonSchema7`] produces a standalone draft-07 document.

use serde_json::{json, Map, Value};

use crate::schema::{Kind, Schema, UnknownKeys};

/// The `$schema` URI emitted at the root of draft-07 documents.
pub const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Output flavour for [`Schema::to_json_schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// The OpenAPI 3.0 schema object subset.
    OpenApi3,
    /// JSON Schema draft-07.
    JsonSchema7,
}

impl Dialect {
    /// Returns the dialect's short name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenApi3 => "openApi3",
            Self::JsonSchema7 => "jsonSchema7",
        }
    }
}

impl Schema {
    /// Derives a JSON-schema document describing accepted input.
    ///
    /// Transforms do not affect the result.
    #[must_use]
    pub fn to_json_schema(&self, dialect: Dialect) -> Value {
        let rendered = render(self, dialect);
        match (dialect, rendered) {
            (Dialect::JsonSchema7, Value::Object(body)) => {
                let mut root = Map::new();
                root.insert("$schema".to_string(), Value::from(DRAFT_07_URI));
                root.extend(body);
                Value::Object(root)
            }
            (_, other) => other,
        }
    }
}

fn render(schema: &Schema, dialect: Dialect) -> Value {
    let mut out = Map::new();

    match &schema.kind {
        Kind::Any => {}
        Kind::String(rules) => {
            out.insert("type".into(), "string".into());
            if let Some(min) = rules.min_length {
                out.insert("minLength".into(), min.into());
            }
            if let Some(max) = rules.max_length {
                out.insert("maxLength".into(), max.into());
            }
            if let Some(pattern) = &rules.pattern {
                out.insert("pattern".into(), pattern.as_str().into());
            }
        }
        Kind::Number(rules) => {
            let ty = if rules.integer { "integer" } else { "number" };
            out.insert("type".into(), ty.into());
            if let Some(min) = rules.minimum {
                out.insert("minimum".into(), bound(min, rules.integer));
            }
            if let Some(max) = rules.maximum {
                out.insert("maximum".into(), bound(max, rules.integer));
            }
        }
        Kind::Boolean { .. } => {
            out.insert("type".into(), "boolean".into());
        }
        Kind::Literal(value) => {
            if let Some(ty) = literal_type(value) {
                out.insert("type".into(), ty.into());
            }
            match dialect {
                Dialect::OpenApi3 => {
                    out.insert("enum".into(), json!([value]));
                }
                Dialect::JsonSchema7 => {
                    out.insert("const".into(), value.clone());
                }
            }
        }
        Kind::Enum(members) => {
            out.insert("type".into(), "string".into());
            out.insert("enum".into(), json!(members));
        }
        Kind::Array(rules) => {
            out.insert("type".into(), "array".into());
            out.insert("items".into(), render(&rules.items, dialect));
            if let Some(min) = rules.min_items {
                out.insert("minItems".into(), min.into());
            }
            if let Some(max) = rules.max_items {
                out.insert("maxItems".into(), max.into());
            }
        }
        Kind::Object(rules) => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (name, field) in &rules.fields {
                properties.insert(name.clone(), render(field, dialect));
                if !field.is_optional() {
                    required.push(Value::from(name.as_str()));
                }
            }
            out.insert("type".into(), "object".into());
            out.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                out.insert("required".into(), Value::Array(required));
            }
            out.insert(
                "additionalProperties".into(),
                Value::Bool(rules.unknown_keys == UnknownKeys::Passthrough),
            );
        }
        Kind::Union(variants) => {
            let any_of: Vec<Value> = variants.iter().map(|v| render(v, dialect)).collect();
            out.insert("anyOf".into(), Value::Array(any_of));
        }
    }

    if schema.nullable {
        out = make_nullable(out, dialect);
    }
    if let Some(description) = &schema.description {
        out.insert("description".into(), description.as_str().into());
    }
    if let Some(default) = &schema.default {
        out.insert("default".into(), default.clone());
    }

    Value::Object(out)
}

fn make_nullable(mut out: Map<String, Value>, dialect: Dialect) -> Map<String, Value> {
    match dialect {
        Dialect::OpenApi3 => {
            out.insert("nullable".into(), Value::Bool(true));
            out
        }
        Dialect::JsonSchema7 => match out.get("type").and_then(Value::as_str).map(str::to_owned) {
            Some(ty) => {
                out.insert("type".into(), json!([ty, "null"]));
                out
            }
            None if out.is_empty() => out,
            None => {
                let mut wrapped = Map::new();
                wrapped.insert(
                    "anyOf".into(),
                    json!([Value::Object(out), {"type": "null"}]),
                );
                wrapped
            }
        },
    }
}

fn literal_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(n) if n.is_f64() => Some("number"),
        Value::Number(_) => Some("integer"),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn bound(value: f64, integer: bool) -> Value {
    if integer && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_openapi3() {
        let schema = Schema::object()
            .field("name", Schema::string())
            .field("age", Schema::integer().optional());

        assert_eq!(
            schema.to_json_schema(Dialect::OpenApi3),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "age": {"type": "integer"}
                },
                "required": ["name"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_required_omitted_when_empty() {
        let schema = Schema::object().field("a", Schema::string().optional());
        let rendered = schema.to_json_schema(Dialect::OpenApi3);
        assert!(rendered.get("required").is_none());
    }

    #[test]
    fn test_passthrough_allows_additional_properties() {
        let rendered = Schema::object().passthrough().to_json_schema(Dialect::OpenApi3);
        assert_eq!(rendered["additionalProperties"], json!(true));
    }

    #[test]
    fn test_nullable_per_dialect() {
        let schema = Schema::string().nullable();
        assert_eq!(
            schema.to_json_schema(Dialect::OpenApi3),
            json!({"type": "string", "nullable": true})
        );
        assert_eq!(
            schema.to_json_schema(Dialect::JsonSchema7),
            json!({"$schema": DRAFT_07_URI, "type": ["string", "null"]})
        );
    }

    #[test]
    fn test_literal_per_dialect() {
        let schema = Schema::literal("v1");
        assert_eq!(
            schema.to_json_schema(Dialect::OpenApi3),
            json!({"type": "string", "enum": ["v1"]})
        );
        assert_eq!(
            schema.to_json_schema(Dialect::JsonSchema7)["const"],
            json!("v1")
        );
    }

    #[test]
    fn test_openapi3_has_no_schema_uri() {
        let rendered = Schema::string().to_json_schema(Dialect::OpenApi3);
        assert!(rendered.get("$schema").is_none());
    }

    #[test]
    fn test_constraints_rendered() {
        let schema = Schema::array(Schema::integer().min(1.0).max(5.0))
            .min_items(1)
            .describe("ids");
        assert_eq!(
            schema.to_json_schema(Dialect::OpenApi3),
            json!({
                "type": "array",
                "items": {"type": "integer", "minimum": 1, "maximum": 5},
                "minItems": 1,
                "description": "ids"
            })
        );
    }

    #[test]
    fn test_union_and_any() {
        let schema = Schema::union([Schema::string(), Schema::boolean()]);
        assert_eq!(
            schema.to_json_schema(Dialect::OpenApi3),
            json!({"anyOf": [{"type": "string"}, {"type": "boolean"}]})
        );
        assert_eq!(Schema::any().to_json_schema(Dialect::OpenApi3), json!({}));
    }

    #[test]
    fn test_defaulted_field_not_required() {
        let schema = Schema::object().field("limit", Schema::integer().default_value(10));
        let rendered = schema.to_json_schema(Dialect::OpenApi3);
        assert!(rendered.get("required").is_none());
        assert_eq!(rendered["properties"]["limit"]["default"], json!(10));
    }
}
