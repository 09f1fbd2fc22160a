//! Builds the three similarity matrices the recommendation strategies read.

use crate::cache::DatasetFingerprint;
use crate::error::{Result, SimilarityError};
use crate::features::{self, FeatureConfig};
use crate::matrix::SimilarityMatrix;
use crate::vectorizer::Vectorizer;
use data_loader::DataIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Which similarity signal to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixKind {
    /// Cosine over overview, genre, keyword, cast and director tokens
    Content,
    /// Jaccard over full cast-name sets
    Cast,
    /// Jaccard over production-company sets
    Production,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatrixKind::Content => "content",
            MatrixKind::Cast => "cast",
            MatrixKind::Production => "production",
        };
        f.write_str(name)
    }
}

/// Immutable set of similarity matrices, row/column order = DataIndex positions.
///
/// Built once (or loaded from the artifact cache) and passed by reference to
/// every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrices {
    fingerprint: DatasetFingerprint,
    content: SimilarityMatrix,
    cast: SimilarityMatrix,
    production: SimilarityMatrix,
}

impl SimilarityMatrices {
    /// Build every matrix from the loaded dataset
    #[instrument(skip_all, fields(movies = index.len()))]
    pub fn build(index: &DataIndex, config: &FeatureConfig) -> Result<Self> {
        if index.is_empty() {
            return Err(SimilarityError::EmptyDataset);
        }
        let start = Instant::now();

        let bags = features::build_all(index, config)?;
        let (vectorizer, vectors) = Vectorizer::fit_transform(&bags, config);
        debug!(
            "Vectorized {} movies over {} terms in {:?}",
            vectors.len(),
            vectorizer.vocabulary_len(),
            start.elapsed()
        );

        let content = SimilarityMatrix::cosine(&vectors);
        debug!("Content matrix built in {:?}", start.elapsed());

        let movies = index.movies();
        let cast_sets = features::name_sets(movies.iter().map(|m| m.cast.as_slice()));
        let company_sets =
            features::name_sets(movies.iter().map(|m| m.production_companies.as_slice()));
        let (cast, production) = rayon::join(
            || SimilarityMatrix::jaccard(&cast_sets),
            || SimilarityMatrix::jaccard(&company_sets),
        );

        info!(
            "Built similarity matrices for {} movies in {:?}",
            index.len(),
            start.elapsed()
        );

        Ok(Self {
            fingerprint: DatasetFingerprint::of(index, config),
            content,
            cast,
            production,
        })
    }

    pub fn get(&self, kind: MatrixKind) -> &SimilarityMatrix {
        match kind {
            MatrixKind::Content => &self.content,
            MatrixKind::Cast => &self.cast,
            MatrixKind::Production => &self.production,
        }
    }

    pub fn fingerprint(&self) -> &DatasetFingerprint {
        &self.fingerprint
    }

    /// Number of movies (rows) covered
    pub fn len(&self) -> usize {
        self.content.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every matrix has the size the fingerprint promises
    pub fn is_consistent(&self) -> bool {
        let n = self.fingerprint.row_count;
        [&self.content, &self.cast, &self.production]
            .iter()
            .all(|m| m.size() == n && m.is_well_formed())
    }
}
