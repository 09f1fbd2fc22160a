//! Single-matrix strategies: content, cast and production similarity.
//!
//! Each one reads the query movie's row, drops the query itself and ranks the
//! rest. Zero scores are kept, so the result has `min(top_k, N - 1)` entries.

use crate::error::{RecommendError, Result};
use crate::ranking;
use crate::types::{Candidate, CandidateSource};
use data_loader::{DataIndex, MovieId};
use similarity::{MatrixKind, SimilarityMatrices};
use tracing::{debug, instrument};

/// Rank every other movie by its similarity to `query` in one matrix
#[instrument(skip(matrices, index))]
pub fn similar_by(
    kind: MatrixKind,
    query: MovieId,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    let position = index
        .position_of(query)
        .ok_or(RecommendError::MovieNotFound(query))?;
    let row = matrices
        .get(kind)
        .row(position)
        .ok_or(RecommendError::MovieNotFound(query))?;

    let source = source_for(kind);
    let candidates: Vec<Candidate> = row
        .into_iter()
        .enumerate()
        .filter(|&(j, _)| j != position)
        .filter_map(|(j, score)| index.movie_at(j).map(|m| Candidate::new(m.id, source, score)))
        .collect();

    let ranked = ranking::top_k(candidates, index, top_k);
    debug!("{} similar movies for {} via {}", ranked.len(), query, kind);
    Ok(ranked)
}

pub fn content_based(
    query: MovieId,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    similar_by(MatrixKind::Content, query, matrices, index, top_k)
}

pub fn cast_based(
    query: MovieId,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    similar_by(MatrixKind::Cast, query, matrices, index, top_k)
}

pub fn production_based(
    query: MovieId,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    similar_by(MatrixKind::Production, query, matrices, index, top_k)
}

fn source_for(kind: MatrixKind) -> CandidateSource {
    match kind {
        MatrixKind::Content => CandidateSource::Content,
        MatrixKind::Cast => CandidateSource::Cast,
        MatrixKind::Production => CandidateSource::Production,
    }
}
