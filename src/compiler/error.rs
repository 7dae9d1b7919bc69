//! Compile failure taxonomy.
//!
//! Every variant is terminal for the compile request that raised it: no
//! partial script is ever returned alongside one of these.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while compiling a pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Structural problem in the description (dangling node reference,
    /// colliding synthetic identifiers).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cycle detected in pipeline graph; nodes still waiting on inputs: {}", .remaining.join(", "))]
    CyclicGraph { remaining: Vec<String> },

    #[error("Import conflict for '{module}': already imported as {existing}, requested as {requested}")]
    ImportConflict {
        module: String,
        existing: String,
        requested: String,
    },

    #[error("Node '{node}' has unsupported {key} '{value}'")]
    UnsupportedConfiguration {
        node: String,
        key: String,
        value: String,
    },
}

/// Error kind for the hosting layer to map onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    CyclicGraphError,
    ImportConflictError,
    UnsupportedConfigurationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::CyclicGraphError => "CyclicGraphError",
            ErrorKind::ImportConflictError => "ImportConflictError",
            ErrorKind::UnsupportedConfigurationError => "UnsupportedConfigurationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Validation(_) => ErrorKind::ValidationError,
            CompileError::CyclicGraph { .. } => ErrorKind::CyclicGraphError,
            CompileError::ImportConflict { .. } => ErrorKind::ImportConflictError,
            CompileError::UnsupportedConfiguration { .. } => {
                ErrorKind::UnsupportedConfigurationError
            }
        }
    }
}

/// Structured failure as handed to the web layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&CompileError> for CompileFailure {
    fn from(err: &CompileError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub type CompileResult<T> = std::result::Result<T, CompileError>;
