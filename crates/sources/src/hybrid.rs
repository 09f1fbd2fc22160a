//! Hybrid strategy: a weighted blend of the three similarity signals and
//! (optionally) popularity.

use crate::error::Result;
use crate::popularity;
use crate::ranking;
use crate::types::{Candidate, CandidateSource, ScoreBreakdown};
use data_loader::{DataIndex, MovieId};
use preferences::Preferences;
use serde::{Deserialize, Serialize};
use similarity::{MatrixKind, SimilarityMatrices};
use tracing::{debug, instrument};

/// Shift applied by each boolean preference before renormalizing
const PREFERENCE_SHIFT: f32 = 0.1;

/// Blend weights. Not canonical: configurable and adjusted per user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub content: f32,
    pub cast: f32,
    pub production: f32,
    pub popularity: f32,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            content: 1.0 / 3.0,
            cast: 1.0 / 3.0,
            production: 1.0 / 3.0,
            popularity: 0.0,
        }
    }
}

impl HybridWeights {
    /// Scale to sum 1. Negative or non-finite weights count as 0; if nothing
    /// is left the defaults apply.
    pub fn normalized(self) -> Self {
        let clean = |w: f32| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let parts = [
            clean(self.content),
            clean(self.cast),
            clean(self.production),
            clean(self.popularity),
        ];
        let total: f32 = parts.iter().sum();
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            content: parts[0] / total,
            cast: parts[1] / total,
            production: parts[2] / total,
            popularity: parts[3] / total,
        }
    }

    /// Apply a user's stored preferences, then renormalize
    pub fn adjusted_for(self, prefs: &Preferences) -> Self {
        let mut weights = self.normalized();
        if prefs.prefer_popular {
            weights.popularity += PREFERENCE_SHIFT;
        }
        if prefs.prefer_familiar_cast {
            weights.cast += PREFERENCE_SHIFT;
        }
        weights.normalized()
    }

    fn blend(&self, parts: &ScoreBreakdown) -> f32 {
        self.content * parts.content
            + self.cast * parts.cast
            + self.production * parts.production
            + self.popularity * parts.popularity
    }
}

/// Per-signal scores of every movie against the movie at `position`
pub fn breakdown_row(
    position: usize,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
) -> Option<Vec<ScoreBreakdown>> {
    let content = matrices.get(MatrixKind::Content).row(position)?;
    let cast = matrices.get(MatrixKind::Cast).row(position)?;
    let production = matrices.get(MatrixKind::Production).row(position)?;

    let row = (0..content.len())
        .map(|j| ScoreBreakdown {
            content: content[j],
            cast: cast[j],
            production: production[j],
            popularity: index
                .movie_at(j)
                .and_then(|m| index.get_movie_stats(m.id))
                .map_or(0.0, |s| s.normalized_score),
        })
        .collect();
    Some(row)
}

/// Blend the three matrices around `query`.
///
/// A query that isn't in the dataset is a cold start: the popularity ranking
/// is returned instead.
#[instrument(skip(matrices, index, weights))]
pub fn hybrid(
    query: MovieId,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
    weights: &HybridWeights,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    let Some(position) = index.position_of(query) else {
        debug!("Hybrid cold start for unknown movie {}", query);
        return Ok(popularity::popularity(index, &[], top_k));
    };
    let Some(row) = breakdown_row(position, matrices, index) else {
        return Ok(popularity::popularity(index, &[], top_k));
    };

    let weights = weights.normalized();
    let candidates: Vec<Candidate> = row
        .into_iter()
        .enumerate()
        .filter(|&(j, _)| j != position)
        .filter_map(|(j, parts)| {
            let movie = index.movie_at(j)?;
            let score = weights.blend(&parts).clamp(0.0, 1.0);
            Some(Candidate::new(movie.id, CandidateSource::Hybrid, score).with_breakdown(parts))
        })
        .collect();

    Ok(ranking::top_k(candidates, index, top_k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;
    use similarity::FeatureConfig;

    fn create_test_index() -> DataIndex {
        DataIndex::from_movies(vec![
            Movie {
                genres: vec!["Animation".to_string()],
                cast: vec!["Tom Hanks".to_string()],
                production_companies: vec!["Pixar".to_string()],
                vote_average: 8.0,
                vote_count: 5000,
                ..Movie::new(862, "Toy Story")
            },
            Movie {
                genres: vec!["Animation".to_string()],
                cast: vec!["Tom Hanks".to_string()],
                production_companies: vec!["Pixar".to_string()],
                vote_average: 7.5,
                vote_count: 4000,
                ..Movie::new(863, "Toy Story 2")
            },
            Movie {
                genres: vec!["Drama".to_string()],
                cast: vec!["Tom Hanks".to_string()],
                production_companies: vec!["Paramount".to_string()],
                vote_average: 8.5,
                vote_count: 9000,
                ..Movie::new(13, "Forrest Gump")
            },
            Movie {
                genres: vec!["Horror".to_string()],
                vote_average: 4.0,
                vote_count: 100,
                ..Movie::new(99, "Obscure Slasher")
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_default_weights_are_equal() {
        let w = HybridWeights::default();
        assert_eq!(w.content, w.cast);
        assert_eq!(w.cast, w.production);
        assert_eq!(w.popularity, 0.0);
    }

    #[test]
    fn test_normalization() {
        let w = HybridWeights {
            content: 2.0,
            cast: 1.0,
            production: 1.0,
            popularity: -5.0,
        }
        .normalized();
        assert_eq!(w.content, 0.5);
        assert_eq!(w.popularity, 0.0);

        let zero = HybridWeights {
            content: 0.0,
            cast: 0.0,
            production: 0.0,
            popularity: 0.0,
        };
        assert_eq!(zero.normalized(), HybridWeights::default());
    }

    #[test]
    fn test_preference_adjustment() {
        let prefs = Preferences {
            prefer_popular: true,
            ..Preferences::default()
        };
        let w = HybridWeights::default().adjusted_for(&prefs);
        let total = w.content + w.cast + w.production + w.popularity;
        assert!((total - 1.0).abs() < 1e-6);
        assert!(w.popularity > 0.0);
        assert!(w.content < 1.0 / 3.0);
    }

    #[test]
    fn test_hybrid_blends_signals() {
        let index = create_test_index();
        let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();

        let result = hybrid(862, &matrices, &index, &HybridWeights::default(), 3).unwrap();
        let ids: Vec<MovieId> = result.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![863, 13, 99]);
        assert!(result.iter().all(|c| c.source == CandidateSource::Hybrid));

        let sequel = result[0].breakdown.unwrap();
        assert_eq!(sequel.cast, 1.0);
        assert_eq!(sequel.production, 1.0);
    }

    #[test]
    fn test_hybrid_cold_start_uses_popularity() {
        let index = create_test_index();
        let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();

        let result = hybrid(123456, &matrices, &index, &HybridWeights::default(), 2).unwrap();
        assert_eq!(result, popularity::popularity(&index, &[], 2));
        assert!(result.iter().all(|c| c.source == CandidateSource::Popularity));
    }
}
