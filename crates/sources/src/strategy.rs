//! Strategy selection and dispatch.

use crate::error::{RecommendError, Result};
use crate::hybrid::{self, HybridWeights};
use crate::popularity;
use crate::similar;
use crate::types::Candidate;
use data_loader::{DataIndex, MovieId};
use serde::{Deserialize, Serialize};
use similarity::{MatrixKind, SimilarityMatrices};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Content,
    Cast,
    Production,
    #[default]
    Hybrid,
    Popularity,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Content,
        Strategy::Cast,
        Strategy::Production,
        Strategy::Hybrid,
        Strategy::Popularity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Content => "content",
            Strategy::Cast => "cast",
            Strategy::Production => "production",
            Strategy::Hybrid => "hybrid",
            Strategy::Popularity => "popularity",
        }
    }

    /// Whether the strategy ranks relative to a query movie
    pub fn needs_query(&self) -> bool {
        !matches!(self, Strategy::Popularity)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RecommendError::UnknownStrategy(s.to_string()))
    }
}

/// A single recommendation request
#[derive(Debug, Clone, Default)]
pub struct StrategyRequest {
    pub strategy: Strategy,
    pub query: Option<MovieId>,
    /// Any-of genre filter, popularity only
    pub genres: Vec<String>,
    pub top_k: usize,
}

/// Run one strategy
pub fn recommend(
    request: &StrategyRequest,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
    weights: &HybridWeights,
) -> Result<Vec<Candidate>> {
    let top_k = request.top_k;
    if request.strategy == Strategy::Popularity {
        return Ok(popularity::popularity(index, &request.genres, top_k));
    }

    let query = request
        .query
        .ok_or_else(|| RecommendError::MissingQuery(request.strategy.to_string()))?;

    match request.strategy {
        Strategy::Content => similar::similar_by(MatrixKind::Content, query, matrices, index, top_k),
        Strategy::Cast => similar::similar_by(MatrixKind::Cast, query, matrices, index, top_k),
        Strategy::Production => {
            similar::similar_by(MatrixKind::Production, query, matrices, index, top_k)
        }
        Strategy::Hybrid => hybrid::hybrid(query, matrices, index, weights, top_k),
        Strategy::Popularity => Ok(popularity::popularity(index, &request.genres, top_k)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;
    use similarity::FeatureConfig;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("content".parse::<Strategy>().unwrap(), Strategy::Content);
        assert_eq!(" Hybrid ".parse::<Strategy>().unwrap(), Strategy::Hybrid);
        assert!(matches!(
            "magic".parse::<Strategy>(),
            Err(RecommendError::UnknownStrategy(_))
        ));
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_dispatch() {
        let index = DataIndex::from_movies(vec![
            Movie {
                genres: vec!["Drama".to_string()],
                ..Movie::new(1, "One")
            },
            Movie {
                genres: vec!["Drama".to_string()],
                ..Movie::new(2, "Two")
            },
        ])
        .unwrap();
        let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();
        let weights = HybridWeights::default();

        let request = StrategyRequest {
            strategy: Strategy::Content,
            query: Some(1),
            top_k: 5,
            ..StrategyRequest::default()
        };
        let result = recommend(&request, &matrices, &index, &weights).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].movie_id, 2);

        let missing = StrategyRequest {
            query: None,
            ..request.clone()
        };
        assert!(matches!(
            recommend(&missing, &matrices, &index, &weights),
            Err(RecommendError::MissingQuery(_))
        ));

        let popular = StrategyRequest {
            strategy: Strategy::Popularity,
            query: None,
            top_k: 5,
            ..StrategyRequest::default()
        };
        assert_eq!(recommend(&popular, &matrices, &index, &weights).unwrap().len(), 2);
    }
}
