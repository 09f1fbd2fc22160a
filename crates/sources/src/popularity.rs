//! Popularity strategy: no query movie, ranks by normalized weighted rating.

use crate::ranking;
use crate::types::{Candidate, CandidateSource};
use data_loader::DataIndex;
use tracing::{debug, instrument};

/// Every movie matching the genre filter, scored by normalized weighted rating.
///
/// `genres` is an any-of filter compared case-insensitively; empty means no
/// filter. Unranked.
pub fn popularity_candidates(index: &DataIndex, genres: &[String]) -> Vec<Candidate> {
    index
        .movies()
        .iter()
        .filter(|m| genres.is_empty() || genres.iter().any(|g| m.has_genre(g)))
        .map(|m| {
            let score = index.get_movie_stats(m.id).map_or(0.0, |s| s.normalized_score);
            Candidate::new(m.id, CandidateSource::Popularity, score)
        })
        .collect()
}

/// Top `top_k` movies by popularity, optionally restricted to genres.
///
/// Returns an empty list when no movie matches the filter; callers decide
/// whether to widen it.
#[instrument(skip(index))]
pub fn popularity(index: &DataIndex, genres: &[String], top_k: usize) -> Vec<Candidate> {
    let ranked = ranking::top_k(popularity_candidates(index, genres), index, top_k);
    debug!("{} popular movies", ranked.len());
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, MovieId};

    fn create_test_index() -> DataIndex {
        let movie = |id: MovieId, title: &str, genre: &str, avg: f32, votes: u32| Movie {
            genres: vec![genre.to_string()],
            vote_average: avg,
            vote_count: votes,
            ..Movie::new(id, title)
        };
        DataIndex::from_movies(vec![
            movie(1, "The Shawshank Redemption", "Drama", 8.5, 8000),
            movie(2, "Fight Club", "Drama", 8.3, 9000),
            movie(3, "Big Hit", "Comedy", 7.8, 6000),
            movie(4, "Unknown Gem", "Comedy", 9.5, 3),
            movie(5, "Disaster Movie", "Comedy", 3.0, 500),
        ])
        .unwrap()
    }

    #[test]
    fn test_popularity_ranks_by_weighted_rating() {
        let index = create_test_index();
        let result = popularity(&index, &[], 5);

        assert_eq!(result.len(), 5);
        assert_eq!(result[0].movie_id, 1);
        assert_eq!(result[0].score, 1.0);
        assert_eq!(result[4].movie_id, 5);
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_popularity_is_idempotent() {
        let index = create_test_index();
        assert_eq!(popularity(&index, &[], 3), popularity(&index, &[], 3));
    }

    #[test]
    fn test_genre_filter() {
        let index = create_test_index();
        let comedy = popularity(&index, &["comedy".to_string()], 10);
        let ids: Vec<MovieId> = comedy.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&1));

        assert!(popularity(&index, &["Western".to_string()], 10).is_empty());
    }
}
