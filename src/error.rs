//! Error handling for pipeline-codegen
//!
//! This module defines the crate-level error type and a Result alias for
//! everything around compilation: loading configs, reading pipeline
//! descriptions and writing scripts. Compile failures themselves are
//! `CompileError`s and are wrapped here unchanged.

use crate::compiler::error::{CompileError, ErrorKind};
use thiserror::Error;

/// Main error type for pipeline-codegen operations
#[derive(Error, Debug)]
pub enum Error {
    /// The pipeline could not be compiled
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Errors related to configuration loading/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Pipeline description or config could not be decoded/encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The compile error at the root of this error, if any.
    pub fn compile_error(&self) -> Option<&CompileError> {
        match self {
            Error::Compile(err) => Some(err),
            Error::WithContext { source, .. } => source.compile_error(),
            _ => None,
        }
    }

    /// Compile failure kind, if this is (or wraps) a compile error.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.compile_error().map(CompileError::kind)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias for pipeline-codegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CompileError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Compile(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Compile(e).with_context(f()))
    }
}
