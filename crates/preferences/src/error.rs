//! Error types for the preference store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferenceError {
    /// Bad user id, out-of-range rating, ...
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored document exists but can't be decoded. It is left untouched.
    #[error("Corrupt user document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode user document: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PreferenceError>;
