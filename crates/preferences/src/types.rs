//! User profile types.
//!
//! Each user has four independently persisted documents: ratings, watchlist,
//! viewing history and preferences. `UserProfile` is the in-memory union of
//! the four.

use chrono::{DateTime, Utc};
use data_loader::MovieId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{PreferenceError, Result};

// =============================================================================
// Validation
// =============================================================================

pub const MIN_RATING: f32 = 1.0;
pub const MAX_RATING: f32 = 10.0;
const MAX_USER_ID_LEN: usize = 64;

/// User ids name directories on disk: ASCII letters, digits, `_` and `-` only
pub fn validate_user_id(user_id: &str) -> Result<()> {
    let valid_chars = user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN || !valid_chars {
        return Err(PreferenceError::Validation(format!(
            "invalid user id {:?} (expected 1-{} of [A-Za-z0-9_-])",
            user_id, MAX_USER_ID_LEN
        )));
    }
    Ok(())
}

pub fn validate_rating(rating: f32) -> Result<()> {
    if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(PreferenceError::Validation(format!(
            "rating {} is outside {}-{}",
            rating, MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}

// =============================================================================
// Documents
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub rating: f32,
    pub title: String,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub movie_id: MovieId,
    pub title: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub movie_id: MovieId,
    pub title: String,
    pub viewed_at: DateTime<Utc>,
}

/// Explicit user settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub favorite_genres: Vec<String>,
    /// Lean the hybrid blend toward popular movies
    pub prefer_popular: bool,
    /// Lean the hybrid blend toward shared cast
    pub prefer_familiar_cast: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update merged into stored `Preferences`; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesUpdate {
    pub favorite_genres: Option<Vec<String>>,
    pub prefer_popular: Option<bool>,
    pub prefer_familiar_cast: Option<bool>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        self.favorite_genres.is_none()
            && self.prefer_popular.is_none()
            && self.prefer_familiar_cast.is_none()
    }
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub ratings: BTreeMap<MovieId, RatingEntry>,
    pub watchlist: Vec<WatchlistEntry>,
    /// Oldest first
    pub history: Vec<HistoryEntry>,
    pub preferences: Preferences,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ratings: BTreeMap::new(),
            watchlist: Vec::new(),
            history: Vec::new(),
            preferences: Preferences::default(),
        }
    }

    pub fn rating_of(&self, movie_id: MovieId) -> Option<f32> {
        self.ratings.get(&movie_id).map(|r| r.rating)
    }

    pub fn is_watchlisted(&self, movie_id: MovieId) -> bool {
        self.watchlist.iter().any(|w| w.movie_id == movie_id)
    }

    pub fn has_viewed(&self, movie_id: MovieId) -> bool {
        self.history.iter().any(|h| h.movie_id == movie_id)
    }

    /// Every movie the user has rated, watchlisted or viewed
    pub fn seen_movie_ids(&self) -> HashSet<MovieId> {
        self.ratings
            .keys()
            .copied()
            .chain(self.watchlist.iter().map(|w| w.movie_id))
            .chain(self.history.iter().map(|h| h.movie_id))
            .collect()
    }

    /// Ratings at or above `threshold`, highest first (ties by movie id)
    pub fn high_ratings(&self, threshold: f32) -> Vec<(MovieId, f32)> {
        let mut liked: Vec<(MovieId, f32)> = self
            .ratings
            .iter()
            .filter(|(_, r)| r.rating >= threshold)
            .map(|(&id, r)| (id, r.rating))
            .collect();
        liked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        liked
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
            && self.watchlist.is_empty()
            && self.history.is_empty()
            && self.preferences == Preferences::default()
    }
}

// =============================================================================
// Derived views
// =============================================================================

/// Aggregate statistics over a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_ratings: usize,
    pub average_rating: f32,
    pub highest_rating: Option<f32>,
    pub lowest_rating: Option<f32>,
    /// Sample standard deviation; 0 with fewer than two ratings
    pub rating_std: f32,
    pub watchlist_size: usize,
    pub movies_viewed: usize,
    pub favorite_genres: Vec<String>,
}

/// Full export of a user's data
#[derive(Debug, Clone, Serialize)]
pub struct UserExport<'a> {
    pub profile: &'a UserProfile,
    pub stats: UserStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        assert!(validate_user_id("alice_01").is_ok());
        assert!(validate_user_id("a-b").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id("with space").is_err());
        assert!(validate_user_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_rating_validation() {
        assert!(validate_rating(1.0).is_ok());
        assert!(validate_rating(7.5).is_ok());
        assert!(validate_rating(10.0).is_ok());
        assert!(validate_rating(0.5).is_err());
        assert!(validate_rating(11.0).is_err());
        assert!(validate_rating(f32::NAN).is_err());
    }

    #[test]
    fn test_seen_and_high_ratings() {
        let now = Utc::now();
        let mut profile = UserProfile::new("u");
        for (id, rating) in [(1, 9.0), (2, 4.0), (3, 9.0), (4, 7.0)] {
            profile.ratings.insert(
                id,
                RatingEntry {
                    rating,
                    title: format!("Movie {id}"),
                    rated_at: now,
                },
            );
        }
        profile.watchlist.push(WatchlistEntry {
            movie_id: 5,
            title: "Movie 5".to_string(),
            added_at: now,
        });

        assert_eq!(profile.high_ratings(7.0), vec![(1, 9.0), (3, 9.0), (4, 7.0)]);
        assert_eq!(profile.seen_movie_ids().len(), 5);
        assert!(profile.is_watchlisted(5));
        assert!(!profile.has_viewed(5));
        assert!(!profile.is_empty());
        assert!(UserProfile::new("v").is_empty());
    }
}
