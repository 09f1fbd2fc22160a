//! Per-movie feature extraction.
//!
//! A `FeatureBag` is the token multiset that feeds the content vectorizer.
//! Overview text contributes stemmed words; genres, keywords, the top of the
//! cast list and the director each contribute one collapsed token.

use crate::error::{Result, SimilarityError};
use crate::text::{analyze, entity_token};
use data_loader::{DataIndex, Movie, MovieId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How term counts are weighted before cosine similarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermWeighting {
    /// Raw term frequency
    Count,
    /// Term frequency scaled by smoothed inverse document frequency
    #[default]
    TfIdf,
}

/// Settings that shape the content representation.
///
/// Part of the artifact fingerprint: changing any field invalidates cached
/// matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Vocabulary size cap (most frequent terms win)
    pub max_features: usize,
    /// Number of billed cast members that become content tokens
    pub top_cast: usize,
    pub weighting: TermWeighting,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            top_cast: 10,
            weighting: TermWeighting::default(),
        }
    }
}

/// Normalized tokens for one movie
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBag {
    pub movie_id: MovieId,
    pub tokens: Vec<String>,
}

impl FeatureBag {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Build the feature bag for a single movie.
///
/// Absent optional fields contribute nothing. Only a missing title is an error.
pub fn build_features(movie: &Movie, config: &FeatureConfig) -> Result<FeatureBag> {
    if movie.title.trim().is_empty() {
        return Err(SimilarityError::Validation(format!(
            "movie {} has no title",
            movie.id
        )));
    }

    let mut tokens = movie.overview.as_deref().map(analyze).unwrap_or_default();

    let names = movie
        .genres
        .iter()
        .chain(&movie.keywords)
        .chain(movie.cast.iter().take(config.top_cast))
        .chain(movie.director.as_ref());
    tokens.extend(names.filter_map(|name| entity_token(name)));

    Ok(FeatureBag {
        movie_id: movie.id,
        tokens,
    })
}

/// Build feature bags for every movie, in index position order
pub fn build_all(index: &DataIndex, config: &FeatureConfig) -> Result<Vec<FeatureBag>> {
    index
        .movies()
        .par_iter()
        .map(|movie| build_features(movie, config))
        .collect()
}

/// Intern name lists into sorted, deduplicated id sets for Jaccard overlap.
///
/// Names compare case-insensitively after trimming; blank names are skipped.
pub fn name_sets<'a, I>(lists: I) -> Vec<Vec<u32>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut ids: HashMap<String, u32> = HashMap::new();
    lists
        .into_iter()
        .map(|names| {
            let mut set: Vec<u32> = names
                .iter()
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .map(|n| {
                    let next = ids.len() as u32;
                    *ids.entry(n).or_insert(next)
                })
                .collect();
            set.sort_unstable();
            set.dedup();
            set
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar() -> Movie {
        Movie {
            overview: Some("Marines explore an alien world".to_string()),
            genres: vec!["Science Fiction".to_string()],
            keywords: vec!["space war".to_string()],
            cast: vec!["Sam Worthington".to_string(), "Zoe Saldana".to_string()],
            director: Some("James Cameron".to_string()),
            ..Movie::new(19995, "Avatar")
        }
    }

    #[test]
    fn test_build_features_collapses_names() {
        let bag = build_features(&avatar(), &FeatureConfig::default()).unwrap();
        assert_eq!(bag.movie_id, 19995);
        assert_eq!(
            bag.tokens,
            vec![
                "marine",
                "explore",
                "alien",
                "world",
                "sciencefiction",
                "spacewar",
                "samworthington",
                "zoesaldana",
                "jamescameron",
            ]
        );
    }

    #[test]
    fn test_top_cast_limit() {
        let config = FeatureConfig {
            top_cast: 1,
            ..FeatureConfig::default()
        };
        let bag = build_features(&avatar(), &config).unwrap();
        assert!(bag.tokens.contains(&"samworthington".to_string()));
        assert!(!bag.tokens.contains(&"zoesaldana".to_string()));
    }

    #[test]
    fn test_missing_optional_fields_are_fine() {
        let bag = build_features(&Movie::new(1, "Untitled Project"), &FeatureConfig::default())
            .unwrap();
        assert!(bag.is_empty());
    }

    #[test]
    fn test_blank_title_rejected() {
        let result = build_features(&Movie::new(1, "  "), &FeatureConfig::default());
        assert!(matches!(result, Err(SimilarityError::Validation(_))));
    }

    #[test]
    fn test_name_sets_intern_case_insensitively() {
        let a = vec!["Pixar".to_string(), "Disney".to_string()];
        let b = vec!["disney ".to_string(), "DISNEY".to_string(), String::new()];
        let sets = name_sets([a.as_slice(), b.as_slice()]);
        assert_eq!(sets[0], vec![0, 1]);
        assert_eq!(sets[1], vec![1]);
    }
}
