//! Core error types
//!
//! Two classes of failure exist side by side:
//! - [`FileError`] is unrecoverable. A template that references a file which
//!   cannot be read has no meaningful partial output, so callers must abort the
//!   whole render when they see one.
//! - [`CodecError`] only escapes through the strict `try_*` codec functions.
//!   The template-facing codec functions absorb it.

use thiserror::Error;

/// Fatal file access failure raised by [`Dir`](crate::Dir)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    #[error("Files.Get failed: {path}: {message}")]
    Read { path: String, message: String },

    #[error("Files.Glob {pattern} failed: {message}")]
    Glob { pattern: String, message: String },

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("absolute paths are not allowed: {path}")]
    AbsolutePath { path: String },

    #[error("path escapes base directory: {path}")]
    OutsideBase { path: String },
}

impl FileError {
    /// The path or pattern the failure is about
    pub fn subject(&self) -> &str {
        match self {
            Self::Read { path, .. } | Self::AbsolutePath { path } | Self::OutsideBase { path } => {
                path
            }
            Self::Glob { pattern, .. } | Self::Pattern { pattern, .. } => pattern,
        }
    }
}

/// Serialization failure inside the format codec
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Toml(#[from] toml::ser::Error),

    #[error("cannot unmarshal {found} into a map")]
    NotAMap { found: &'static str },
}

pub type Result<T> = std::result::Result<T, FileError>;
