//! Filter to drop movies with too little rating evidence.
//!
//! A handful of enthusiastic votes is not enough to recommend a movie to
//! someone who didn't ask for it by name.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::DataIndex;
use sources::{Candidate, UserContext};
use std::sync::Arc;

/// Removes candidates whose vote count is below `min_votes`.
pub struct MinimumVotesFilter {
    data_index: Arc<DataIndex>,
    min_votes: u32,
}

impl MinimumVotesFilter {
    /// Create a new MinimumVotesFilter.
    ///
    /// # Arguments
    /// * `data_index` - Shared reference to DataIndex for movie lookups
    /// * `min_votes` - Minimum TMDB vote count (0 disables the filter)
    pub fn new(data_index: Arc<DataIndex>, min_votes: u32) -> Self {
        Self {
            data_index,
            min_votes,
        }
    }
}

impl Filter for MinimumVotesFilter {
    fn name(&self) -> &str {
        "MinimumVotesFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                self.data_index
                    .get_movie(candidate.movie_id)
                    .is_some_and(|movie| movie.vote_count >= self.min_votes)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;
    use sources::CandidateSource;

    #[test]
    fn test_minimum_votes_filter() {
        let index = DataIndex::from_movies(vec![
            Movie {
                vote_count: 5000,
                ..Movie::new(1, "Blockbuster")
            },
            Movie {
                vote_count: 12,
                ..Movie::new(2, "Festival Short")
            },
            Movie {
                vote_count: 50,
                ..Movie::new(3, "Cult Classic")
            },
        ])
        .unwrap();
        let filter = MinimumVotesFilter::new(Arc::new(index), 50);

        let candidates = vec![
            Candidate::new(1, CandidateSource::Popularity, 0.9),
            Candidate::new(2, CandidateSource::Popularity, 0.8),
            Candidate::new(3, CandidateSource::Popularity, 0.7),
        ];
        let filtered = filter.apply(candidates, &UserContext::new("u1")).unwrap();
        let ids: Vec<_> = filtered.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
