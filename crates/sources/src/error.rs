//! Errors raised by recommendation strategies.

use data_loader::MovieId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The query movie id is not in the dataset
    #[error("Movie {0} not found")]
    MovieNotFound(MovieId),

    #[error("No movie titled {0:?}")]
    TitleNotFound(String),

    #[error("No cast member named {0:?}")]
    ActorNotFound(String),

    #[error("Unknown strategy {0:?} (expected content, cast, production, hybrid or popularity)")]
    UnknownStrategy(String),

    /// A similarity strategy was called without a query movie
    #[error("Strategy {0} needs a query movie")]
    MissingQuery(String),
}

impl RecommendError {
    /// Lookup failures the caller answers with a popularity fallback
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecommendError::MovieNotFound(_)
                | RecommendError::TitleNotFound(_)
                | RecommendError::ActorNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
