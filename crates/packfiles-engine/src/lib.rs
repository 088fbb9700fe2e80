//! Packfiles Engine - MiniJinja bindings for file access and format filters
//!
//! This crate exposes `packfiles-core` to templates:
//! - a `files` global with `get` and `glob`
//! - file collections with `as_config`, `as_secrets` and `lines`
//! - tolerant `toyaml`, `fromyaml`, `totoml`, `tojson`, `fromjson` filters
//! - an `Engine` that turns unreadable files into a fatal render error

pub mod engine;
pub mod error;
pub mod files_object;
pub mod filters;

pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, TemplateError, TemplateErrorKind};
pub use files_object::{FileCollectionObject, FilesObject, create_collection_value, create_files_value};
