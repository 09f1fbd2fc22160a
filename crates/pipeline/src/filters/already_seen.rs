//! Filter to remove movies the user has already rated, watchlisted or viewed.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Removes candidates found in `UserContext::seen_movies`.
pub struct AlreadySeenFilter;

impl Filter for AlreadySeenFilter {
    fn name(&self) -> &str {
        "AlreadySeenFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|c| !context.has_seen(c.movie_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::CandidateSource;

    #[test]
    fn test_already_seen_filter() {
        let mut context = UserContext::new("u1");
        context.seen_movies.extend([1, 3]);

        let candidates = vec![
            Candidate::new(1, CandidateSource::Personalized, 0.9),
            Candidate::new(2, CandidateSource::Personalized, 0.8),
            Candidate::new(3, CandidateSource::Personalized, 0.7),
            Candidate::new(4, CandidateSource::Personalized, 0.6),
        ];

        let filtered = AlreadySeenFilter.apply(candidates, &context).unwrap();
        let ids: Vec<_> = filtered.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_nothing_seen_keeps_everything() {
        let context = UserContext::new("u1");
        let candidates = vec![Candidate::new(1, CandidateSource::Popularity, 0.5)];
        assert_eq!(AlreadySeenFilter.apply(candidates, &context).unwrap().len(), 1);
    }
}
