//! Aggregated views over a profile: taste summary and statistics.

use crate::types::{UserProfile, UserStats};
use data_loader::DataIndex;
use serde::Serialize;
use std::collections::HashMap;

/// Default number of genres reported as favorites
pub const FAVORITE_GENRE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreAffinity {
    pub genre: String,
    pub score: f32,
}

/// Top genres by weighted rating
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteSummary {
    pub top_genres: Vec<GenreAffinity>,
}

impl TasteSummary {
    pub fn genre_names(&self) -> Vec<String> {
        self.top_genres.iter().map(|g| g.genre.clone()).collect()
    }
}

/// Rank genres by the sum of `rating / 10` over the rated movies that carry them.
///
/// Ratings for movies missing from the dataset are ignored.
pub fn taste_summary(profile: &UserProfile, index: &DataIndex, limit: usize) -> TasteSummary {
    let mut scores: HashMap<&str, f32> = HashMap::new();
    for (&movie_id, entry) in &profile.ratings {
        let Some(movie) = index.get_movie(movie_id) else {
            continue;
        };
        for genre in &movie.genres {
            *scores.entry(genre.as_str()).or_default() += entry.rating / 10.0;
        }
    }

    let mut top_genres: Vec<GenreAffinity> = scores
        .into_iter()
        .map(|(genre, score)| GenreAffinity {
            genre: genre.to_string(),
            score,
        })
        .collect();
    top_genres.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.genre.cmp(&b.genre)));
    top_genres.truncate(limit);

    TasteSummary { top_genres }
}

/// Stored favorite genres if the user set any, else inferred from ratings
pub fn favorite_genres(profile: &UserProfile, index: &DataIndex, limit: usize) -> Vec<String> {
    let stored = &profile.preferences.favorite_genres;
    if !stored.is_empty() {
        return stored.iter().take(limit).cloned().collect();
    }
    taste_summary(profile, index, limit).genre_names()
}

pub fn user_stats(profile: &UserProfile, index: &DataIndex) -> UserStats {
    let values: Vec<f32> = profile.ratings.values().map(|r| r.rating).collect();
    let n = values.len();

    let average = if n > 0 {
        values.iter().sum::<f32>() / n as f32
    } else {
        0.0
    };
    let std = if n > 1 {
        let var = values.iter().map(|v| (v - average).powi(2)).sum::<f32>() / (n - 1) as f32;
        var.sqrt()
    } else {
        0.0
    };

    UserStats {
        total_ratings: n,
        average_rating: average,
        highest_rating: values.iter().copied().reduce(f32::max),
        lowest_rating: values.iter().copied().reduce(f32::min),
        rating_std: std,
        watchlist_size: profile.watchlist.len(),
        movies_viewed: profile.history.len(),
        favorite_genres: favorite_genres(profile, index, FAVORITE_GENRE_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatingEntry;
    use chrono::Utc;
    use data_loader::{Movie, MovieId};

    fn create_test_index() -> DataIndex {
        let movie = |id: MovieId, genres: &[&str]| Movie {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..Movie::new(id, format!("Movie {id}"))
        };
        DataIndex::from_movies(vec![
            movie(1, &["Action", "Adventure"]),
            movie(2, &["Action", "Thriller"]),
            movie(3, &["Drama"]),
        ])
        .unwrap()
    }

    fn profile_with(ratings: &[(MovieId, f32)]) -> UserProfile {
        let mut profile = UserProfile::new("u");
        for &(id, rating) in ratings {
            profile.ratings.insert(
                id,
                RatingEntry {
                    rating,
                    title: String::new(),
                    rated_at: Utc::now(),
                },
            );
        }
        profile
    }

    #[test]
    fn test_taste_summary_weights_by_rating() {
        let index = create_test_index();
        let profile = profile_with(&[(1, 8.0), (2, 6.0), (3, 9.0), (404, 10.0)]);

        let summary = taste_summary(&profile, &index, 3);
        assert_eq!(summary.genre_names(), vec!["Action", "Drama", "Adventure"]);
        assert!((summary.top_genres[0].score - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_stored_favorites_take_precedence() {
        let index = create_test_index();
        let mut profile = profile_with(&[(3, 9.0)]);
        assert_eq!(favorite_genres(&profile, &index, 5), vec!["Drama"]);

        profile.preferences.favorite_genres = vec!["Horror".to_string()];
        assert_eq!(favorite_genres(&profile, &index, 5), vec!["Horror"]);
    }

    #[test]
    fn test_user_stats() {
        let index = create_test_index();
        let stats = user_stats(&profile_with(&[(1, 8.0), (2, 6.0), (3, 10.0)]), &index);

        assert_eq!(stats.total_ratings, 3);
        assert_eq!(stats.average_rating, 8.0);
        assert_eq!(stats.highest_rating, Some(10.0));
        assert_eq!(stats.lowest_rating, Some(6.0));
        assert!((stats.rating_std - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_user_stats_without_ratings() {
        let stats = user_stats(&UserProfile::new("u"), &create_test_index());
        assert_eq!(stats.total_ratings, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.highest_rating, None);
        assert_eq!(stats.rating_std, 0.0);
        assert!(stats.favorite_genres.is_empty());
    }
}
