//! Error types for taskflow.
//!
//! Store operations never fail on unknown ids; the variants here cover
//! snapshot I/O, configuration and the identifier resolution done by the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for taskflow operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("{kind} not found: {ident}")]
    NotFound { kind: &'static str, ident: String },

    #[error("{kind} '{ident}' is ambiguous, matches: {matches}")]
    Ambiguous {
        kind: &'static str,
        ident: String,
        matches: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found(kind: &'static str, ident: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            ident: ident.into(),
        }
    }
}

/// Result type alias for taskflow operations.
pub type Result<T> = std::result::Result<T, Error>;
