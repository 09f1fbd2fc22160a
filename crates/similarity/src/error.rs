//! Error types for the similarity crate.

use thiserror::Error;

/// Errors raised while building, loading or storing similarity matrices
#[derive(Error, Debug)]
pub enum SimilarityError {
    /// A record can't be turned into a feature vector
    #[error("Validation failed: {0}")]
    Validation(String),

    /// There is nothing to compare
    #[error("Cannot build similarity matrices over an empty dataset")]
    EmptyDataset,

    /// Cached artifacts were built from a different dataset or configuration.
    /// Recoverable: the caller rebuilds.
    #[error("Cached artifacts do not match the dataset (expected {expected}, found {found})")]
    CacheMismatch { expected: String, found: String },

    /// No artifact file exists yet
    #[error("No cached artifacts at {path}")]
    CacheMissing { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact encoding error: {0}")]
    Codec(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
