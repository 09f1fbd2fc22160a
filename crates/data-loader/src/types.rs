//! Core domain types for the TMDB 5000 dataset.
//!
//! A `Movie` is the strongly-typed, validated form of one joined row of the
//! movies and credits files. `DataIndex` owns every movie in file order; that
//! order is the "position" used to address rows of the similarity matrices.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie (TMDB id)
pub type MovieId = u32;

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Plot summary; `None` when the source row had no overview
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes
    pub runtime: Option<f32>,
    pub vote_average: f32,
    pub vote_count: u32,
    /// TMDB popularity score, used as the first tie-breaker when ranking
    pub popularity: f32,
    /// Genre names in source order
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    /// Cast names in billing order
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub production_companies: Vec<String>,
}

impl Movie {
    /// Create a movie with only the required fields set.
    ///
    /// Mostly useful for tests and fixtures; the loader fills every field.
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: None,
            release_date: None,
            runtime: None,
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            genres: Vec::new(),
            keywords: Vec::new(),
            cast: Vec::new(),
            director: None,
            production_companies: Vec::new(),
        }
    }

    /// Release year, if the release date is known
    pub fn year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    /// Case-insensitive genre membership test
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Precomputed popularity statistics for a movie
///
/// Computed once when loading data, see `DataIndex::compute_movie_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    /// Bayesian (IMDB-style) weighted rating on the 0-10 vote scale
    pub weighted_rating: f32,
    /// `weighted_rating` min-max normalized across the dataset into [0, 1]
    pub normalized_score: f32,
}

// =============================================================================
// DataIndex - The Core In-Memory Database
// =============================================================================

/// Holds every movie plus the lookup indices built over them.
///
/// Movies are stored in a `Vec` so that each movie has a stable position;
/// `positions` maps a `MovieId` back to that position.
#[derive(Debug, Default)]
pub struct DataIndex {
    // Primary data store, in load order
    pub(crate) movies: Vec<Movie>,
    pub(crate) positions: HashMap<MovieId, usize>,

    // Secondary indices, keyed by lowercase name
    /// Movies grouped by genre (one movie can appear in multiple genre lists)
    pub(crate) genre_index: HashMap<String, Vec<MovieId>>,
    /// Movies grouped by cast member
    pub(crate) cast_index: HashMap<String, Vec<MovieId>>,

    // Precomputed statistics, parallel to `movies`
    pub(crate) movie_stats: Vec<MovieStats>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of movies
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// All movies in position order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.positions.get(&id).map(|&pos| &self.movies[pos])
    }

    /// Position of a movie (its row in the similarity matrices)
    pub fn position_of(&self, id: MovieId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Movie stored at a matrix position
    pub fn movie_at(&self, position: usize) -> Option<&Movie> {
        self.movies.get(position)
    }

    /// Movie ids in position order
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.movies.iter().map(|m| m.id).collect()
    }

    /// Get all movies in a genre (case-insensitive)
    pub fn get_movies_by_genre(&self, genre: &str) -> &[MovieId] {
        self.genre_index
            .get(&genre.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all movies featuring a cast member (case-insensitive, full name)
    pub fn get_movies_with_actor(&self, actor: &str) -> &[MovieId] {
        self.cast_index
            .get(&actor.trim().to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Canonical spelling of a cast member's name, if anyone by that name exists
    pub fn canonical_actor_name(&self, actor: &str) -> Option<&str> {
        let key = actor.trim().to_lowercase();
        let first = *self.get_movies_with_actor(actor).first()?;
        self.get_movie(first)?
            .cast
            .iter()
            .find(|name| name.trim().to_lowercase() == key)
            .map(|s| s.as_str())
    }

    /// Distinct genre names (lowercase), sorted
    pub fn genres(&self) -> Vec<&str> {
        let mut genres: Vec<&str> = self.genre_index.keys().map(|s| s.as_str()).collect();
        genres.sort_unstable();
        genres
    }

    /// Get precomputed statistics for a movie
    pub fn get_movie_stats(&self, id: MovieId) -> Option<&MovieStats> {
        self.positions.get(&id).and_then(|&pos| self.movie_stats.get(pos))
    }

    /// Exact, case-insensitive title match. The first movie in load order wins.
    pub fn find_by_title(&self, title: &str) -> Option<&Movie> {
        let wanted = title.trim();
        self.movies
            .iter()
            .find(|m| m.title.eq_ignore_ascii_case(wanted))
    }

    /// Movies whose title contains `fragment` (case-insensitive).
    ///
    /// Exact matches come first, then by descending popularity, then title.
    pub fn search_titles(&self, fragment: &str) -> Vec<&Movie> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(bool, &Movie)> = self
            .movies
            .iter()
            .filter_map(|m| {
                let title = m.title.to_lowercase();
                if title == needle {
                    Some((true, m))
                } else if title.contains(&needle) {
                    Some((false, m))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|(exact_a, a), (exact_b, b)| {
            exact_b
                .cmp(exact_a)
                .then_with(|| b.popularity.total_cmp(&a.popularity))
                .then_with(|| a.title.cmp(&b.title))
        });
        matches.into_iter().map(|(_, m)| m).collect()
    }
}
