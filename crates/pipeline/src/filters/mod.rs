//! Filter implementations for the candidate pipeline.

pub mod already_seen;
pub mod genre;
pub mod minimum_votes;

// Re-export for convenience
pub use already_seen::AlreadySeenFilter;
pub use genre::GenreFilter;
pub use minimum_votes::MinimumVotesFilter;
