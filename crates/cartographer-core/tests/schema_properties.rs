//! Property tests for the schema engine.

use cartographer_core::{decode_query, Schema};
use proptest::prelude::*;
use serde_json::{json, Value};

proptest! {
    #[test]
    fn test_string_schema_is_identity(s in ".*") {
        let value = Value::String(s);
        prop_assert_eq!(Schema::string().validate(&value).unwrap(), value);
    }

    #[test]
    fn test_coerced_integer_parses_query_text(n in any::<i32>()) {
        let schema = Schema::integer().coerce();
        let out = schema.validate(&Value::String(n.to_string())).unwrap();
        prop_assert_eq!(out, json!(n));
    }

    #[test]
    fn test_length_bounds(s in "[a-z]{0,12}", min in 0usize..6, extra in 0usize..6) {
        let max = min + extra;
        let schema = Schema::string().min_length(min).max_length(max);
        let len = s.len();
        let result = schema.validate(&Value::String(s));
        prop_assert_eq!(result.is_ok(), (min..=max).contains(&len));
    }

    #[test]
    fn test_issue_count_matches_wrong_fields(
        flags in proptest::collection::vec(any::<bool>(), 1..8)
    ) {
        let mut schema = Schema::object();
        let mut input = serde_json::Map::new();
        for (i, wrong) in flags.iter().enumerate() {
            let name = format!("f{i}");
            schema = schema.field(name.clone(), Schema::string());
            input.insert(name, if *wrong { json!(i) } else { json!("ok") });
        }

        let wrong = flags.iter().filter(|w| **w).count();
        match schema.validate(&Value::Object(input)) {
            Ok(_) => prop_assert_eq!(wrong, 0),
            Err(error) => prop_assert_eq!(error.issues.len(), wrong),
        }
    }

    #[test]
    fn test_decode_query_single_pairs(
        pairs in proptest::collection::btree_map("[a-z]{1,6}", "[a-zA-Z0-9]{0,6}", 0..6)
    ) {
        let raw = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let decoded = decode_query(&raw).unwrap();
        for (k, v) in &pairs {
            prop_assert_eq!(&decoded[k], &json!(v));
        }
        prop_assert_eq!(decoded.as_object().unwrap().len(), pairs.len());
    }
}
