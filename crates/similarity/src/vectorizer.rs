//! Document-term representation of feature bags.

use crate::features::{FeatureBag, FeatureConfig, TermWeighting};
use std::collections::HashMap;

/// L2-normalized sparse vector with indices sorted ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from unsorted (term, weight) pairs; normalizes to unit length
    fn from_weights(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm <= 0.0 {
            return Self::default();
        }

        let (indices, values) = entries.into_iter().map(|(i, w)| (i, w / norm)).unzip();
        Self { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Sparse dot product via a sorted merge.
    ///
    /// Both vectors are unit length, so this is their cosine similarity.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut a, mut b) = (0, 0);
        let mut sum = 0.0;
        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[a] * other.values[b];
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }
}

/// Vocabulary and term weights fitted over the whole corpus
#[derive(Debug, Clone)]
pub struct Vectorizer {
    vocabulary: HashMap<String, u32>,
    /// Inverse document frequency per vocabulary index
    idf: Vec<f32>,
    weighting: TermWeighting,
}

impl Vectorizer {
    /// Fit the vocabulary on every bag.
    ///
    /// Keeps the `max_features` terms with the highest corpus frequency
    /// (ties broken by term ascending). Indices are assigned alphabetically.
    pub fn fit(bags: &[FeatureBag], config: &FeatureConfig) -> Self {
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for bag in bags {
            let mut seen: Vec<&str> = Vec::with_capacity(bag.tokens.len());
            for token in &bag.tokens {
                *term_freq.entry(token.as_str()).or_default() += 1;
                seen.push(token.as_str());
            }
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *doc_freq.entry(token).or_default() += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = term_freq.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(config.max_features);

        let mut terms: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();

        let n_docs = bags.len() as f32;
        let idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u32))
            .collect();

        Self {
            vocabulary,
            idf,
            weighting: config.weighting,
        }
    }

    /// Project one bag onto the fitted vocabulary
    pub fn transform(&self, bag: &FeatureBag) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for token in &bag.tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_default() += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(idx, count)| {
                let weight = match self.weighting {
                    TermWeighting::Count => count,
                    TermWeighting::TfIdf => count * self.idf[idx as usize],
                };
                (idx, weight)
            })
            .collect();

        SparseVector::from_weights(entries)
    }

    pub fn fit_transform(bags: &[FeatureBag], config: &FeatureConfig) -> (Self, Vec<SparseVector>) {
        let vectorizer = Self::fit(bags, config);
        let vectors = bags.iter().map(|b| vectorizer.transform(b)).collect();
        (vectorizer, vectors)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }
}
