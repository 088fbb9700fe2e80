//! Template-safe conversion between structured values and YAML, JSON and TOML
//!
//! Every conversion comes in two shapes:
//! - `try_*` functions return a [`CodecError`] like any other Rust API.
//! - The tolerant functions never fail. Encoders degrade to an empty string and
//!   decoders return a map holding a single [`ERROR_KEY`] entry, so a template
//!   can branch on `doc.Error` instead of aborting the render.
//!
//! This is not a general-purpose parser: multi-document streams, anchors,
//! comments and schemas are out of scope.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::CodecError;

/// Generic string-keyed document produced by the decoders
pub type Document = serde_json::Map<String, JsonValue>;

/// Key under which a tolerant decoder reports its failure
pub const ERROR_KEY: &str = "Error";

/// Marshal a value to YAML
pub fn try_to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Marshal a value to YAML, returning an empty string on failure
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> String {
    try_to_yaml(value).unwrap_or_else(|e| swallow("toYaml", e))
}

/// Unmarshal a YAML document into a map
///
/// Empty and `null` documents decode to an empty map.
pub fn try_from_yaml(text: &str) -> Result<Document, CodecError> {
    if text.trim().is_empty() {
        return Ok(Document::new());
    }
    let value: JsonValue = serde_yaml::from_str(text)?;
    into_document(value)
}

/// Unmarshal a YAML document, reporting failure through the `Error` key
pub fn from_yaml(text: &str) -> Document {
    into_template_map(try_from_yaml(text))
}

/// Marshal a value to TOML
///
/// The root value must be a table.
pub fn try_to_toml<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(toml::to_string(value)?)
}

/// Marshal a value to TOML
///
/// Unlike [`to_yaml`] and [`to_json`], a failure returns the error description
/// itself rather than an empty string. Templates rendering TOML see the reason
/// inline; this difference is covered by tests and must not be unified.
pub fn to_toml<T: Serialize + ?Sized>(value: &T) -> String {
    try_to_toml(value).unwrap_or_else(|e| e.to_string())
}

/// Marshal a value to compact JSON
pub fn try_to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Marshal a value to compact JSON, returning an empty string on failure
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    try_to_json(value).unwrap_or_else(|e| swallow("toJson", e))
}

/// Unmarshal a JSON object into a map
///
/// `null` decodes to an empty map.
pub fn try_from_json(text: &str) -> Result<Document, CodecError> {
    let value: JsonValue = serde_json::from_str(text)?;
    into_document(value)
}

/// Unmarshal a JSON object, reporting failure through the `Error` key
pub fn from_json(text: &str) -> Document {
    into_template_map(try_from_json(text))
}

/// Flatten a decode result into the map shape templates expect
///
/// `Err` becomes `{"Error": "<message>"}`.
pub fn into_template_map(result: Result<Document, CodecError>) -> Document {
    result.unwrap_or_else(|err| {
        tracing::debug!(error = %err, "decode failed, returning error map");
        let mut map = Document::new();
        map.insert(ERROR_KEY.to_string(), JsonValue::String(err.to_string()));
        map
    })
}

fn into_document(value: JsonValue) -> Result<Document, CodecError> {
    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Document::new()),
        JsonValue::Bool(_) => Err(CodecError::NotAMap { found: "bool" }),
        JsonValue::Number(_) => Err(CodecError::NotAMap { found: "number" }),
        JsonValue::String(_) => Err(CodecError::NotAMap { found: "string" }),
        JsonValue::Array(_) => Err(CodecError::NotAMap { found: "sequence" }),
    }
}

fn swallow(op: &str, err: CodecError) -> String {
    tracing::debug!(op, error = %err, "encode failed, returning empty string");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;
    use serde_json::json;
    use std::collections::BTreeMap;

    /// Value whose serialization always fails
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut input = BTreeMap::new();
        input.insert("k", "v");

        let yaml = to_yaml(&input);
        let doc = from_yaml(&yaml);

        assert!(!doc.contains_key(ERROR_KEY));
        assert_eq!(doc.get("k"), Some(&json!("v")));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_to_yaml_nested() {
        let value = json!({"image": {"repository": "nginx", "tag": "1.25"}});
        let doc = from_yaml(&to_yaml(&value));
        assert_eq!(JsonValue::Object(doc), value);
    }

    #[test]
    fn test_from_yaml_malformed_sets_error() {
        let doc = from_yaml("not: valid: yaml: :");

        let message = doc.get(ERROR_KEY).and_then(JsonValue::as_str);
        assert!(message.is_some_and(|m| !m.is_empty()));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_from_yaml_empty_document() {
        assert!(from_yaml("").is_empty());
        assert!(from_yaml("   \n").is_empty());
        assert!(from_yaml("~").is_empty());
    }

    #[test]
    fn test_from_yaml_not_a_map() {
        let doc = from_yaml("- a\n- b\n");
        assert_eq!(
            doc.get(ERROR_KEY),
            Some(&json!("cannot unmarshal sequence into a map"))
        );
    }

    #[test]
    fn test_try_from_yaml_is_result() {
        assert!(try_from_yaml("a: [1, 2").is_err());
        assert!(try_from_yaml("a: 1").is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let value = json!({
            "name": "app",
            "replicas": 3,
            "ratio": 0.5,
            "enabled": true,
            "ports": [80, 443],
            "labels": {"tier": "web"},
            "empty": null
        });

        let doc = from_json(&to_json(&value));
        assert_eq!(JsonValue::Object(doc), value);
    }

    #[test]
    fn test_to_json_is_compact() {
        let value = json!({"a": 1, "b": [true, null]});
        insta::assert_snapshot!(to_json(&value), @r#"{"a":1,"b":[true,null]}"#);
    }

    #[test]
    fn test_to_json_scalars() {
        assert_eq!(to_json("text"), "\"text\"");
        assert_eq!(to_json(&42), "42");
        assert_eq!(to_json(&vec!["a", "b"]), r#"["a","b"]"#);
    }

    #[test]
    fn test_from_json_malformed_sets_error() {
        let doc = from_json("{\"a\": ");
        assert!(doc.get(ERROR_KEY).and_then(JsonValue::as_str).is_some());

        let doc = from_json("");
        assert!(doc.contains_key(ERROR_KEY));
    }

    #[test]
    fn test_from_json_null_and_non_object() {
        assert!(from_json("null").is_empty());
        assert_eq!(
            from_json("[1, 2]").get(ERROR_KEY),
            Some(&json!("cannot unmarshal sequence into a map"))
        );
    }

    #[test]
    fn test_to_toml_table() {
        let value = json!({"name": "app", "port": 8080});
        let toml = to_toml(&value);

        assert!(toml.contains("name = \"app\""));
        assert!(toml.contains("port = 8080"));
    }

    #[test]
    fn test_failed_encoding_asymmetry() {
        // YAML and JSON swallow the failure
        assert_eq!(to_yaml(&Unencodable), "");
        assert_eq!(to_json(&Unencodable), "");

        // TOML hands back the error description
        let toml = to_toml(&Unencodable);
        assert!(!toml.is_empty());
        assert!(toml.contains("refusing to serialize"));
    }

    #[test]
    fn test_to_toml_non_table_root_returns_error_text() {
        let value = json!([1, 2, 3]);
        let expected = try_to_toml(&value).unwrap_err().to_string();

        assert!(!expected.is_empty());
        assert_eq!(to_toml(&value), expected);
    }

    #[test]
    fn test_into_template_map_ok_passthrough() {
        let mut doc = Document::new();
        doc.insert("a".to_string(), json!(1));

        assert_eq!(into_template_map(Ok(doc.clone())), doc);
    }
}
