//! DataIndex building and indexing logic.
//!
//! Builds the DataIndex from parsed data:
//! - Join movies with credits
//! - Build secondary indices (genre_index, cast_index)
//! - Compute popularity statistics
//! - Validate the result

use crate::error::{DataLoadError, Result};
use crate::parser::{self, CREDITS_FILE, MOVIES_FILE};
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Vote-count percentile used as the Bayesian prior weight `m`
pub const VOTE_COUNT_QUANTILE: f32 = 0.6;

impl DataIndex {
    /// Load the TMDB dataset from a directory
    ///
    /// This is the main entry point for loading data.
    ///
    /// Steps:
    /// 1. Parse both files (movies, credits) in parallel
    /// 2. Join credits onto movies by id
    /// 3. Build indices and statistics, then validate
    #[instrument]
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading TMDB dataset from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let credits_path = data_dir.join(CREDITS_FILE);

        // Rayon's `join` runs both parsers in parallel
        let (movies, credits) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_credits(&credits_path),
        );
        let mut movies = movies?;
        let mut credits = credits?;

        info!("Parsed {} movies and {} credit rows", movies.len(), credits.len());

        let mut without_credits = 0usize;
        for movie in &mut movies {
            match credits.remove(&movie.id) {
                Some(c) => {
                    movie.cast = c.cast;
                    movie.director = c.director;
                }
                None => without_credits += 1,
            }
        }
        if without_credits > 0 {
            debug!("{} movies have no credits row", without_credits);
        }
        if !credits.is_empty() {
            debug!("Ignoring {} credit rows with no matching movie", credits.len());
        }

        let index = Self::from_movies(movies)?;
        info!("DataIndex built with {} movies", index.len());
        Ok(index)
    }

    /// Build a fully indexed, validated DataIndex from movie records
    pub fn from_movies(movies: Vec<Movie>) -> Result<Self> {
        let mut index = DataIndex::new();
        for movie in movies {
            index.insert_movie(movie)?;
        }
        index.validate()?;
        index.build_secondary_indices();
        index.compute_movie_stats();
        Ok(index)
    }

    /// Insert a movie, rejecting duplicate ids and blank titles
    pub fn insert_movie(&mut self, movie: Movie) -> Result<()> {
        if movie.title.trim().is_empty() {
            return Err(DataLoadError::ValidationError(format!(
                "movie {} has no title",
                movie.id
            )));
        }
        if self.positions.contains_key(&movie.id) {
            return Err(DataLoadError::ValidationError(format!(
                "duplicate movie id {}",
                movie.id
            )));
        }
        self.positions.insert(movie.id, self.movies.len());
        self.movies.push(movie);
        Ok(())
    }

    /// Build secondary indices after primary data is loaded
    pub fn build_secondary_indices(&mut self) {
        self.genre_index.clear();
        self.cast_index.clear();

        for movie in &self.movies {
            for genre in &movie.genres {
                self.genre_index
                    .entry(genre.to_lowercase())
                    .or_default()
                    .push(movie.id);
            }

            for actor in &movie.cast {
                let ids = self.cast_index.entry(actor.to_lowercase()).or_default();
                // Some credits list the same person twice
                if ids.last() != Some(&movie.id) {
                    ids.push(movie.id);
                }
            }
        }
    }

    /// Compute popularity statistics for all movies
    ///
    /// Weighted rating (IMDB formula):
    /// `WR = v/(v+m) * R + m/(v+m) * C`
    /// where `v` is the vote count, `R` the vote average, `m` the 60th
    /// percentile of vote counts and `C` the mean vote average.
    pub fn compute_movie_stats(&mut self) {
        if self.movies.is_empty() {
            self.movie_stats.clear();
            return;
        }

        let mut counts: Vec<f32> = self.movies.iter().map(|m| m.vote_count as f32).collect();
        counts.sort_by(|a, b| a.total_cmp(b));
        let min_votes = quantile(&counts, VOTE_COUNT_QUANTILE);
        let mean_rating =
            self.movies.iter().map(|m| m.vote_average).sum::<f32>() / self.movies.len() as f32;

        let weighted: Vec<f32> = self
            .movies
            .par_iter()
            .map(|m| compute_weighted_rating(m.vote_average, m.vote_count, min_votes, mean_rating))
            .collect();

        let (min, max) = weighted
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &w| (lo.min(w), hi.max(w)));
        let range = max - min;

        self.movie_stats = weighted
            .into_iter()
            .map(|weighted_rating| MovieStats {
                weighted_rating,
                normalized_score: if range > 0.0 {
                    (weighted_rating - min) / range
                } else {
                    0.0
                },
            })
            .collect();
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - The dataset is not empty
    /// - Every movie has a title and a vote average on the 0-10 scale
    pub fn validate(&self) -> Result<()> {
        if self.movies.is_empty() {
            return Err(DataLoadError::EmptyDataset);
        }
        for movie in &self.movies {
            if movie.title.trim().is_empty() {
                return Err(DataLoadError::ValidationError(format!(
                    "movie {} has no title",
                    movie.id
                )));
            }
            if !(0.0..=10.0).contains(&movie.vote_average) {
                return Err(DataLoadError::InvalidValue {
                    field: "vote_average".to_string(),
                    value: movie.vote_average.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Linear-interpolated quantile of an ascending slice
fn quantile(sorted: &[f32], q: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn compute_weighted_rating(vote_average: f32, vote_count: u32, min_votes: f32, mean: f32) -> f32 {
    let v = vote_count as f32;
    let total = v + min_votes;
    if total <= 0.0 {
        return mean;
    }
    (v / total) * vote_average + (min_votes / total) * mean
}
