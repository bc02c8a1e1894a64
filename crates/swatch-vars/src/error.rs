//! Error types for the swatch-vars crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::CompileError;

/// Errors produced by parsing, resolution, and serialization.
#[derive(Debug, Error)]
pub enum VarsError {
    /// A variable was looked up that exists in no layer.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// Structured input did not have the expected artifact shape.
    #[error("malformed variables document: {0}")]
    Shape(String),

    /// Input was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The external compiler rejected a classification batch.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A definition file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for swatch-vars operations.
pub type Result<T> = std::result::Result<T, VarsError>;
