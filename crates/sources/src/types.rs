//! Types shared by every strategy and by the filter pipeline.

use crate::hybrid::HybridWeights;
use data_loader::MovieId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// =============================================================================
// Candidates
// =============================================================================

/// Which strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Content,
    Cast,
    Production,
    Hybrid,
    Popularity,
    /// Seed-weighted hybrid blend over a user's liked movies
    Personalized,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateSource::Content => "content",
            CandidateSource::Cast => "cast",
            CandidateSource::Production => "production",
            CandidateSource::Hybrid => "hybrid",
            CandidateSource::Popularity => "popularity",
            CandidateSource::Personalized => "personalized",
        };
        f.write_str(name)
    }
}

/// Per-signal scores behind a blended candidate, kept for explanations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub content: f32,
    pub cast: f32,
    pub production: f32,
    pub popularity: f32,
}

impl ScoreBreakdown {
    /// Name of the signal contributing most after weighting
    pub fn dominant(&self, weights: &HybridWeights) -> &'static str {
        [
            ("content", self.content * weights.content),
            ("cast", self.cast * weights.cast),
            ("production", self.production * weights.production),
            ("popularity", self.popularity * weights.popularity),
        ]
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
        .unwrap_or("content")
    }
}

/// A scored recommendation candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub movie_id: MovieId,
    pub source: CandidateSource,
    /// Strategy score, in [0, 1]
    pub score: f32,
    pub breakdown: Option<ScoreBreakdown>,
}

impl Candidate {
    pub fn new(movie_id: MovieId, source: CandidateSource, score: f32) -> Self {
        Self {
            movie_id,
            source,
            score,
            breakdown: None,
        }
    }

    pub fn with_breakdown(mut self, breakdown: ScoreBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }
}

// =============================================================================
// User context
// =============================================================================

/// Everything the personalized strategy and the filters need to know about a
/// user, gathered once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub user_id: String,
    /// Rated, watchlisted or viewed
    pub seen_movies: HashSet<MovieId>,
    /// (movie, weight) pairs the personalized blend starts from
    pub seeds: Vec<(MovieId, f32)>,
    pub favorite_genres: Vec<String>,
    pub weights: HybridWeights,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            seen_movies: HashSet::new(),
            seeds: Vec::new(),
            favorite_genres: Vec::new(),
            weights: HybridWeights::default(),
        }
    }

    pub fn has_seen(&self, movie_id: MovieId) -> bool {
        self.seen_movies.contains(&movie_id)
    }

    /// No ratings or watchlist to build on
    pub fn is_cold_start(&self) -> bool {
        self.seeds.is_empty()
    }
}
