//! MiniJinja integration for the Files API
//!
//! # Usage in Templates
//!
//! ```jinja2
//! {# Read a file as string #}
//! {{ files.get("config/nginx.conf") }}
//!
//! {# ConfigMap data from every file under config/ #}
//! data:
//! {{ files.glob("config/**").as_config() | indent(2) }}
//!
//! {# Secret data, values base64 encoded #}
//! data:
//! {{ files.glob("secrets/*").as_secrets() | indent(2) }}
//!
//! {# Iterate over a collection #}
//! {% for path, content in files.glob("scripts/*.sh") | items %}
//!   {{ path }}: {{ content | b64encode }}
//! {% endfor %}
//! ```

use std::sync::Arc;

use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use minijinja::{Error, ErrorKind, State};
use packfiles_core::{Dir, FileError, Files};

/// The `files` global, bound to the render's base directory
#[derive(Debug)]
pub struct FilesObject {
    dir: Dir,
}

impl FilesObject {
    pub fn new(dir: Dir) -> Self {
        Self { dir }
    }
}

impl Object for FilesObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "get" => {
                let name = string_arg(args, "files", "get")?;
                self.dir.get(&name).map(Value::from).map_err(fatal)
            }

            "glob" => {
                let pattern = string_arg(args, "files", "glob")?;
                self.dir
                    .glob(&pattern)
                    .map(create_collection_value)
                    .map_err(fatal)
            }

            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!(
                    "files object has no method '{}'. Available methods: get, glob",
                    method
                ),
            )),
        }
    }
}

/// A resolved file collection as seen by templates
///
/// Behaves as a map from resolved path to content and carries the
/// `as_config`, `as_secrets` and `lines` methods.
#[derive(Debug)]
pub struct FileCollectionObject {
    files: Files,
}

impl FileCollectionObject {
    pub fn new(files: Files) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &Files {
        &self.files
    }
}

impl Object for FileCollectionObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.files.get(key.as_str()?).map(Value::from)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.files.keys().map(Value::from).collect())
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "as_config" => Ok(Value::from(self.files.as_config())),
            "as_secrets" => Ok(Value::from(self.files.as_secrets())),
            "lines" => {
                let path = string_arg(args, "collection", "lines")?;
                Ok(Value::from(self.files.lines(&path)))
            }
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!(
                    "file collection has no method '{}'. Available methods: as_config, as_secrets, lines",
                    method
                ),
            )),
        }
    }
}

/// Raise a file failure so the engine can recognize it as fatal
fn fatal(err: FileError) -> Error {
    Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}

fn string_arg(args: &[Value], owner: &str, method: &str) -> Result<String, Error> {
    args.first()
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("{}.{}() requires a path string argument", owner, method),
            )
        })
}

/// Create the `files` global for a base directory
pub fn create_files_value(dir: Dir) -> Value {
    Value::from_object(FilesObject::new(dir))
}

pub fn create_collection_value(files: Files) -> Value {
    Value::from_object(FileCollectionObject::new(files))
}
