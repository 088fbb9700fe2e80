//! Packfiles Core - file access and format conversion for templates
//!
//! This crate provides what a template needs to pull files and structured data
//! into generated manifests:
//! - `Dir`: resolves names and glob patterns against a base directory
//! - `Files`: an immutable snapshot of resolved files, renderable as ConfigMap
//!   or Secret data
//! - `codec`: tolerant YAML/JSON/TOML conversion that never aborts a render

pub mod codec;
pub mod dir;
pub mod error;
pub mod files;

pub use codec::{Document, ERROR_KEY};
pub use dir::Dir;
pub use error::{CodecError, FileError};
pub use files::Files;
