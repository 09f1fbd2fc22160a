//! Pipeline for filtering recommendation candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! Strategies in `sources` produce scored candidates; the pipeline removes
//! the ones that shouldn't be shown (already seen, wrong genre, too few
//! votes). Ranking and truncation happen afterwards, in the orchestrator.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterPipeline;
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(AlreadySeenFilter)
//!     .add_filter(MinimumVotesFilter::new(index.clone(), 50));
//!
//! let filtered = pipeline.apply(candidates, &context)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
