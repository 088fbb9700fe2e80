//! Directory-bound file access for templates
//!
//! A [`Dir`] resolves names and glob patterns relative to a fixed base
//! directory. Every call reads the disk again; nothing is cached.
//!
//! # Containment
//!
//! - Absolute names and patterns are rejected
//! - Resolved paths are canonicalized (symlinks, `..`) and must stay under the
//!   canonical base directory
//!
//! Any failure is a [`FileError`], which the render pipeline treats as fatal.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{FileError, Result};
use crate::files::Files;

/// Base directory that template file lookups are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    base: PathBuf,
}

impl Dir {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Read the file `name` as text
    ///
    /// ```jinja2
    /// {{ files.get("config/nginx.conf") }}
    /// ```
    pub fn get(&self, name: &str) -> Result<String> {
        self.read(name).inspect_err(report_fatal)
    }

    /// Read every file matching `pattern` into a new collection
    ///
    /// Supports `*`, `?`, `[...]` and recursive `**`. Matching directories are
    /// skipped. Entries are keyed by their resolved path. No match yields an
    /// empty collection.
    ///
    /// ```jinja2
    /// {% for name, content in files.glob("scripts/*.sh") | items %}
    /// {{ name }}: {{ content | b64encode }}
    /// {% endfor %}
    /// ```
    pub fn glob(&self, pattern: &str) -> Result<Files> {
        self.collect(pattern).inspect_err(report_fatal)
    }

    fn read(&self, name: &str) -> Result<String> {
        if Path::new(name).is_absolute() {
            return Err(FileError::AbsolutePath {
                path: name.to_string(),
            });
        }

        let root = self.canonical_base()?;
        let path = self.join(name);
        let canonical = path.canonicalize().map_err(|e| FileError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        if !canonical.starts_with(&root) {
            return Err(FileError::OutsideBase {
                path: name.to_string(),
            });
        }

        tracing::debug!(path = %path.display(), "reading file");
        let bytes = std::fs::read(&canonical).map_err(|e| FileError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn collect(&self, pattern: &str) -> Result<Files> {
        if Path::new(pattern).is_absolute() {
            return Err(FileError::AbsolutePath {
                path: pattern.to_string(),
            });
        }

        let root = self.canonical_base()?;
        let full = self.escaped_pattern(&expand_trailing_recursive(pattern));
        let matches = glob::glob(&full).map_err(|e| FileError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let glob_failed = |message: String| FileError::Glob {
            pattern: pattern.to_string(),
            message,
        };

        let mut entries = IndexMap::new();
        for entry in matches {
            let path = entry.map_err(|e| glob_failed(e.to_string()))?;
            if !path.is_file() {
                continue;
            }

            let canonical = path
                .canonicalize()
                .map_err(|e| glob_failed(format!("{}: {}", path.display(), e)))?;
            if !canonical.starts_with(&root) {
                return Err(FileError::OutsideBase {
                    path: path.display().to_string(),
                });
            }

            let bytes = std::fs::read(&canonical)
                .map_err(|e| glob_failed(format!("{}: {}", path.display(), e)))?;
            entries.insert(
                path.to_string_lossy().into_owned(),
                String::from_utf8_lossy(&bytes).into_owned(),
            );
        }

        tracing::debug!(pattern, matched = entries.len(), "glob resolved");
        Ok(Files::from(entries))
    }

    fn canonical_base(&self) -> Result<PathBuf> {
        self.base.canonicalize().map_err(|e| FileError::Read {
            path: self.base.display().to_string(),
            message: format!("failed to resolve base directory: {}", e),
        })
    }

    /// Join a relative name onto the base, leaving a `.` base out of the result
    fn join(&self, name: &str) -> PathBuf {
        if self.is_current_dir() {
            PathBuf::from(name)
        } else {
            self.base.join(name)
        }
    }

    /// Build the full glob with metacharacters in the base taken literally
    fn escaped_pattern(&self, pattern: &str) -> String {
        if self.is_current_dir() {
            return pattern.to_string();
        }
        let base = glob::Pattern::escape(&self.base.to_string_lossy());
        Path::new(&base).join(pattern).to_string_lossy().into_owned()
    }

    fn is_current_dir(&self) -> bool {
        self.base.as_os_str().is_empty() || self.base == Path::new(".")
    }
}

/// A trailing `**` only yields directories in `glob`; match the files beneath
/// them instead.
fn expand_trailing_recursive(pattern: &str) -> String {
    if pattern == "**" || pattern.ends_with("/**") {
        format!("{}/*", pattern)
    } else {
        pattern.to_string()
    }
}

fn report_fatal(err: &FileError) {
    tracing::error!(subject = err.subject(), "{}", err);
}
