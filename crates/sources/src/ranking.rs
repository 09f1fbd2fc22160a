//! Deterministic ordering shared by every strategy.
//!
//! Score descending, then TMDB popularity descending, then title ascending.
//! Movie id is the last resort so the order is total.

use crate::types::Candidate;
use data_loader::DataIndex;
use std::cmp::Ordering;

/// Sort candidates in place
pub fn rank(candidates: &mut [Candidate], index: &DataIndex) {
    candidates.sort_by(|a, b| compare(a, b, index));
}

/// Sort and keep the first `top_k`
pub fn top_k(mut candidates: Vec<Candidate>, index: &DataIndex, top_k: usize) -> Vec<Candidate> {
    rank(&mut candidates, index);
    candidates.truncate(top_k);
    candidates
}

fn compare(a: &Candidate, b: &Candidate, index: &DataIndex) -> Ordering {
    let movie_a = index.get_movie(a.movie_id);
    let movie_b = index.get_movie(b.movie_id);
    let popularity = |m: Option<&data_loader::Movie>| m.map_or(0.0, |m| m.popularity);
    fn title(m: Option<&data_loader::Movie>) -> &str {
        m.map_or("", |m| m.title.as_str())
    }

    b.score
        .total_cmp(&a.score)
        .then_with(|| popularity(movie_b).total_cmp(&popularity(movie_a)))
        .then_with(|| title(movie_a).cmp(title(movie_b)))
        .then_with(|| a.movie_id.cmp(&b.movie_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateSource;
    use data_loader::Movie;

    fn create_test_index() -> DataIndex {
        DataIndex::from_movies(vec![
            Movie {
                popularity: 10.0,
                ..Movie::new(1, "Zodiac")
            },
            Movie {
                popularity: 50.0,
                ..Movie::new(2, "Memento")
            },
            Movie {
                popularity: 10.0,
                ..Movie::new(3, "Alien")
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_tie_breaks() {
        let index = create_test_index();
        let mut candidates = vec![
            Candidate::new(1, CandidateSource::Content, 0.5),
            Candidate::new(3, CandidateSource::Content, 0.5),
            Candidate::new(2, CandidateSource::Content, 0.5),
        ];
        rank(&mut candidates, &index);

        // Same score: more popular first, then by title
        let ids: Vec<_> = candidates.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_score_dominates() {
        let index = create_test_index();
        let candidates = vec![
            Candidate::new(2, CandidateSource::Content, 0.1),
            Candidate::new(1, CandidateSource::Content, 0.9),
        ];
        let ranked = top_k(candidates, &index, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].movie_id, 1);
    }
}
