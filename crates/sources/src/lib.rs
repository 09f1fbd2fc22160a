//! # Sources Crate
//!
//! The recommendation strategies. Each is a plain function over the
//! precomputed `SimilarityMatrices` and the `DataIndex`; none of them holds
//! state between requests.
//!
//! ## Strategies
//!
//! ### Similarity (content, cast, production)
//! Row lookup in one matrix, self excluded:
//! - Content: cosine over overview, genre, keyword, cast and director tokens
//! - Cast: Jaccard overlap of cast lists
//! - Production: Jaccard overlap of production companies
//!
//! ### Hybrid
//! Weighted blend of the three similarity rows plus normalized popularity.
//! An unknown query movie is a cold start and gets the popularity ranking.
//!
//! ### Popularity
//! IMDB weighted rating, min-max normalized, optional any-of genre filter.
//!
//! ### Personalized
//! Seed-weighted hybrid rows over the movies a user liked or watchlisted.
//!
//! Every ranking breaks ties by popularity, then title.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{similar, Strategy, StrategyRequest, HybridWeights, recommend};
//!
//! let similar = similar::content_based(19995, &matrices, &index, 10)?;
//!
//! let request = StrategyRequest {
//!     strategy: Strategy::Hybrid,
//!     query: Some(19995),
//!     top_k: 10,
//!     ..StrategyRequest::default()
//! };
//! let blended = recommend(&request, &matrices, &index, &HybridWeights::default())?;
//! ```

// Public modules
pub mod error;
pub mod hybrid;
pub mod personalized;
pub mod popularity;
pub mod ranking;
pub mod similar;
pub mod strategy;
pub mod types;
pub mod user_context;

// Re-export commonly used types
pub use error::{RecommendError, Result};
pub use hybrid::HybridWeights;
pub use strategy::{Strategy, StrategyRequest, recommend};
pub use types::{Candidate, CandidateSource, ScoreBreakdown, UserContext};
