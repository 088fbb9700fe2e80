//! Snapshot of resolved files and the transforms templates embed
//!
//! ```jinja2
//! apiVersion: v1
//! kind: ConfigMap
//! data:
//! {{ files.glob("config/**").as_config() | indent(2) }}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine as _;
use indexmap::IndexMap;

use crate::codec;

/// An immutable mapping from resolved file path to file content
///
/// A collection is either *nil* (the [`Default`]) or present. Both are valid;
/// transforms on a nil collection return their empty value, while a present but
/// empty collection still serializes as an empty map. Entries keep the order in
/// which they were resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Files {
    entries: Option<IndexMap<String, String>>,
}

impl Files {
    /// A nil collection
    pub fn nil() -> Self {
        Self { entries: None }
    }

    /// A present collection with no entries
    pub fn new() -> Self {
        Self {
            entries: Some(IndexMap::new()),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.entries.is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content of the entry stored under `path`
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.as_ref()?.get(path).map(String::as_str)
    }

    /// Iterate `(path, content)` pairs in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flatten()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(path, _)| path)
    }

    /// Flatten to a YAML map suitable for the `data` section of a ConfigMap
    ///
    /// Keys are reduced to their base name. Duplicate base names overwrite each
    /// other, the entry resolved last wins. The output is not indented.
    /// Returns an empty string for a nil collection or if serialization fails.
    pub fn as_config(&self) -> String {
        self.flatten(str::to_string)
            .map(|data| codec::to_yaml(&data))
            .unwrap_or_default()
    }

    /// Like [`as_config`](Self::as_config), with every value base64 encoded for
    /// the `data` section of a Secret
    pub fn as_secrets(&self) -> String {
        self.flatten(|content| base64::engine::general_purpose::STANDARD.encode(content))
            .map(|data| codec::to_yaml(&data))
            .unwrap_or_default()
    }

    /// Split the entry stored under `path` on `\n`
    ///
    /// Missing entries and nil collections yield no lines.
    pub fn lines(&self, path: &str) -> Vec<String> {
        self.get(path)
            .map(|content| content.split('\n').map(String::from).collect())
            .unwrap_or_default()
    }

    fn flatten(&self, encode: impl Fn(&str) -> String) -> Option<BTreeMap<String, String>> {
        let entries = self.entries.as_ref()?;
        let mut data = BTreeMap::new();
        for (path, content) in entries {
            data.insert(base_name(path), encode(content));
        }
        Some(data)
    }
}

impl From<IndexMap<String, String>> for Files {
    fn from(entries: IndexMap<String, String>) -> Self {
        Self {
            entries: Some(entries),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Files {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect::<IndexMap<_, _>>()
            .into()
    }
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
