//! Format and embedding filters
//!
//! The conversion filters never fail: encoders degrade to an empty string
//! (`totoml` to the error text) and decoders return a map with an `Error` key.
//!
//! ```jinja2
//! {% set cfg = files.get("config/app.yaml") | fromyaml %}
//! {% if cfg.Error is defined %}# invalid: {{ cfg.Error }}{% endif %}
//! ```

use base64::Engine as _;
use minijinja::value::ValueKind;
use minijinja::{Error, ErrorKind, Value};
use packfiles_core::{Files, codec};

use crate::files_object::FileCollectionObject;

/// Usage: {{ values.config | toyaml }}
pub fn toyaml(value: Value) -> String {
    codec::to_yaml(&value)
}

/// Usage: {% set doc = text | fromyaml %}
pub fn fromyaml(text: String) -> Value {
    Value::from_serialize(codec::from_yaml(&text))
}

/// Usage: {{ values.settings | totoml }}
pub fn totoml(value: Value) -> String {
    codec::to_toml(&value)
}

/// Usage: {{ values.config | tojson }}
pub fn tojson(value: Value) -> String {
    codec::to_json(&value)
}

/// Usage: {% set doc = text | fromjson %}
pub fn fromjson(text: String) -> Value {
    Value::from_serialize(codec::from_json(&text))
}

/// Render a file collection as ConfigMap data
///
/// Usage: {{ files.glob("config/*") | asconfig | indent(2) }}
pub fn asconfig(value: Value) -> Result<String, Error> {
    Ok(collection_of(&value, "asconfig")?.as_config())
}

/// Render a file collection as base64 Secret data
///
/// Usage: {{ files.glob("secrets/*") | assecrets | indent(2) }}
pub fn assecrets(value: Value) -> Result<String, Error> {
    Ok(collection_of(&value, "assecrets")?.as_secrets())
}

/// Accepts a collection from `files.glob`, a plain `{path: content}` map, or
/// `none`/undefined as the nil collection
fn collection_of(value: &Value, filter: &str) -> Result<Files, Error> {
    if let Some(collection) = value.downcast_object_ref::<FileCollectionObject>() {
        return Ok(collection.files().clone());
    }

    match value.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(Files::nil()),
        ValueKind::Map => {
            let mut entries = Vec::new();
            for key in value.try_iter()? {
                let content = value.get_item(&key)?;
                entries.push((key.to_string(), content.to_string()));
            }
            Ok(entries.into_iter().collect())
        }
        kind => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("{} requires a file collection, got {}", filter, kind),
        )),
    }
}

/// Usage: {{ secret | b64encode }}
#[must_use]
pub fn b64encode(value: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

/// Indent every non-empty line, including the first
///
/// Usage: {{ content | indent(4) }}
pub fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like `indent`, prefixed with a newline
///
/// Usage: data:{{ files.glob("config/*").as_config() | nindent(2) }}
pub fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}
