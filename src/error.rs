// src/error.rs

//! Unified error handling for the token pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Identifier;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// An input or output file could not be read or written
    #[error("File access error for {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built or a request failed outside a fetch
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Fetching the payload page for one identifier failed
    #[error("Fetch failed for ID {id}: {message}")]
    Fetch { id: Identifier, message: String },

    /// An expected pattern was absent from a payload or document
    #[error("{what} not found")]
    PatternNotFound { what: String },

    /// Base64 or UTF-8 decoding failed
    #[error("Decode error in {context}: {message}")]
    Decode { context: String, message: String },

    /// The external probe program is not installed
    #[error("'{program}' command not found. Please ensure it is installed and in your PATH")]
    ToolMissing { program: String },

    /// Malformed user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pattern compilation failed
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Attach a path to an I/O failure.
    pub fn file_access(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a fetch error annotated with the identifier.
    pub fn fetch(id: Identifier, message: impl fmt::Display) -> Self {
        Self::Fetch {
            id,
            message: message.to_string(),
        }
    }

    /// Create a pattern-not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::PatternNotFound { what: what.into() }
    }

    /// Create a decode error with context.
    pub fn decode(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
