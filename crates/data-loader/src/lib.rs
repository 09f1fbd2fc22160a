//! # Data Loader Crate
//!
//! This crate handles loading and indexing the TMDB 5000 movie dataset.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, MovieStats, DataIndex)
//! - **parser**: Parse the movies and credits CSV files into Rust structs
//! - **index**: Join, index, score and validate the parsed records
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! // Load the entire dataset
//! let index = DataIndex::load_from_files(Path::new("data/tmdb"))?;
//!
//! // Query data
//! let movie = index.get_movie(19995).unwrap();
//! let stats = index.get_movie_stats(19995).unwrap();
//! let dramas = index.get_movies_by_genre("Drama");
//!
//! println!("{} has weighted rating {:.2}", movie.title, stats.weighted_rating);
//! ```
//!
//! Every error this crate returns is a load-time error: a `DataIndex` that
//! exists has been validated and is never empty.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    MovieId,
    // Core types
    Movie,
    DataIndex,
    MovieStats,
};
