//! # Similarity Crate
//!
//! Turns the loaded dataset into the precomputed similarity matrices every
//! recommendation strategy reads.
//!
//! ## Components
//!
//! - **text**: word segmentation, stop words and stemming for overview text
//! - **features**: per-movie token bags and name sets
//! - **vectorizer**: vocabulary fitting and TF-IDF / count weighting
//! - **matrix**: packed symmetric `SimilarityMatrix` (cosine and Jaccard)
//! - **engine**: `SimilarityMatrices` (content, cast, production)
//! - **cache**: fingerprinted on-disk artifacts, rebuilt on mismatch
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{ArtifactCache, FeatureConfig, MatrixKind};
//!
//! let cache = ArtifactCache::new("cache");
//! let matrices = cache.load_or_build(&index, &FeatureConfig::default())?;
//!
//! let content = matrices.get(MatrixKind::Content);
//! let score = content.get(0, 1);
//! ```
//!
//! Construction is O(N²·D) and runs once; lookups are O(N) per row.

pub mod cache;
pub mod engine;
pub mod error;
pub mod features;
pub mod matrix;
pub mod text;
pub mod vectorizer;

pub use cache::{ArtifactCache, DatasetFingerprint};
pub use engine::{MatrixKind, SimilarityMatrices};
pub use error::{Result, SimilarityError};
pub use features::{FeatureBag, FeatureConfig, TermWeighting};
pub use matrix::SimilarityMatrix;
