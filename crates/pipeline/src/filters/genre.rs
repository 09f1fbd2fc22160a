//! Filter to keep only movies in a set of genres.
//!
//! Used to narrow similarity results ("like Alien, but only horror") and,
//! via `from_favorites`, to restrict to the user's favorite genres.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::DataIndex;
use sources::{Candidate, UserContext};
use std::sync::Arc;

/// Keeps candidates carrying at least one of the genres (case-insensitive).
///
/// An empty genre list keeps everything.
pub struct GenreFilter {
    data_index: Arc<DataIndex>,
    genres: Vec<String>,
    use_favorites: bool,
}

impl GenreFilter {
    /// Filter on an explicit genre list
    pub fn new(data_index: Arc<DataIndex>, genres: Vec<String>) -> Self {
        Self {
            data_index,
            genres,
            use_favorites: false,
        }
    }

    /// Filter on the requesting user's favorite genres
    pub fn from_favorites(data_index: Arc<DataIndex>) -> Self {
        Self {
            data_index,
            genres: Vec::new(),
            use_favorites: true,
        }
    }
}

impl Filter for GenreFilter {
    fn name(&self) -> &str {
        "GenreFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        let genres = if self.use_favorites {
            &context.favorite_genres
        } else {
            &self.genres
        };
        if genres.is_empty() {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                // Exclude if movie not found
                self.data_index
                    .get_movie(candidate.movie_id)
                    .is_some_and(|movie| genres.iter().any(|g| movie.has_genre(g)))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;
    use sources::CandidateSource;

    fn create_test_index() -> DataIndex {
        DataIndex::from_movies(vec![
            Movie {
                genres: vec!["Action".to_string(), "Adventure".to_string()],
                ..Movie::new(1, "Action Movie")
            },
            Movie {
                genres: vec!["Drama".to_string()],
                ..Movie::new(2, "Drama Movie")
            },
            Movie {
                genres: vec!["Science Fiction".to_string()],
                ..Movie::new(3, "Sci-Fi Movie")
            },
        ])
        .unwrap()
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new(1, CandidateSource::Content, 0.9),
            Candidate::new(2, CandidateSource::Content, 0.8),
            Candidate::new(3, CandidateSource::Content, 0.7),
            Candidate::new(99, CandidateSource::Content, 0.6),
        ]
    }

    #[test]
    fn test_genre_filter() {
        let index = Arc::new(create_test_index());
        let filter = GenreFilter::new(index, vec!["adventure".to_string(), "DRAMA".to_string()]);

        let filtered = filter.apply(candidates(), &UserContext::new("u1")).unwrap();
        let ids: Vec<_> = filtered.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_genres_pass_through() {
        let index = Arc::new(create_test_index());
        let filter = GenreFilter::new(index, Vec::new());
        assert_eq!(filter.apply(candidates(), &UserContext::new("u1")).unwrap().len(), 4);
    }

    #[test]
    fn test_favorite_genres() {
        let index = Arc::new(create_test_index());
        let mut context = UserContext::new("u1");
        context.favorite_genres = vec!["Science Fiction".to_string()];

        let filtered = GenreFilter::from_favorites(index).apply(candidates(), &context).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].movie_id, 3);
    }
}
