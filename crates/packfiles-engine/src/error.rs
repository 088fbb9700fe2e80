//! Engine error types

use miette::{Diagnostic, NamedSource, SourceSpan};
use packfiles_core::FileError;
use thiserror::Error;

/// Main engine error type
///
/// Both variants abort the render. [`EngineError::FileAccess`] marks the
/// unrecoverable case of a template referencing a file that cannot be read;
/// callers must not emit any partial output for it.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("fatal file access error: {0}")]
    FileAccess(#[from] FileError),
}

impl EngineError {
    /// The file failure behind this error, if any
    pub fn file_error(&self) -> Option<&FileError> {
        match self {
            Self::FileAccess(err) => Some(err),
            Self::Template(_) => None,
        }
    }

    /// Classify a MiniJinja failure
    ///
    /// A [`FileError`] anywhere in the source chain wins over the template error
    /// that carried it.
    pub(crate) fn from_minijinja(
        err: minijinja::Error,
        template_name: &str,
        template_source: &str,
    ) -> Self {
        if let Some(file_err) = find_file_error(&err).cloned() {
            return Self::FileAccess(file_err);
        }
        Self::Template(TemplateError::from_minijinja(
            err,
            template_name,
            template_source,
        ))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

fn find_file_error(err: &minijinja::Error) -> Option<&FileError> {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(file_err) = cause.downcast_ref::<FileError>() {
            return Some(file_err);
        }
        source = cause.source();
    }
    None
}

/// Error kind for categorizing template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    UnknownMethod,
    SyntaxError,
    InvalidOperation,
    Other,
}

/// Template-specific error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(packfiles::template::render))]
pub struct TemplateError {
    /// Error message
    pub message: String,

    /// Error kind for categorization
    pub kind: TemplateErrorKind,

    /// Template source code
    #[source_code]
    pub src: NamedSource<String>,

    /// Error location in source
    #[label("error occurred here")]
    pub span: Option<SourceSpan>,
}

impl TemplateError {
    /// Create a new template error from a MiniJinja error
    pub fn from_minijinja(
        err: minijinja::Error,
        template_name: &str,
        template_source: &str,
    ) -> Self {
        let kind = match err.kind() {
            minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
            minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
            minijinja::ErrorKind::UnknownFunction => TemplateErrorKind::UnknownFunction,
            minijinja::ErrorKind::UnknownMethod => TemplateErrorKind::UnknownMethod,
            minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
            minijinja::ErrorKind::InvalidOperation => TemplateErrorKind::InvalidOperation,
            _ => TemplateErrorKind::Other,
        };

        let message = match err.detail() {
            Some(detail) => detail.to_string(),
            None => err.to_string(),
        };

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span: err
                .line()
                .and_then(|line| calculate_span(template_source, line)),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

/// Span covering the whole of a 1-based line
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (index, line) in source.lines().enumerate() {
        if index + 1 == line_num {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1;
    }
    None
}
