//! Personalized ("for you") candidate generation.
//!
//! Each seed movie contributes its hybrid row, weighted by how much the user
//! liked it; a candidate's score is the seed-weighted mean. Users without
//! seeds get the popularity ranking of their favorite genres instead.
//!
//! Output is unfiltered and unranked: the pipeline drops seen and
//! low-evidence movies, then the caller ranks and fills.

use crate::hybrid::breakdown_row;
use crate::popularity::popularity_candidates;
use crate::types::{Candidate, CandidateSource, ScoreBreakdown, UserContext};
use data_loader::DataIndex;
use rayon::prelude::*;
use similarity::SimilarityMatrices;
use tracing::{debug, instrument};

#[instrument(skip_all, fields(user_id = %context.user_id, seeds = context.seeds.len()))]
pub fn personalized_candidates(
    context: &UserContext,
    matrices: &SimilarityMatrices,
    index: &DataIndex,
) -> Vec<Candidate> {
    let rows: Vec<(f32, Vec<ScoreBreakdown>)> = context
        .seeds
        .par_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .filter_map(|&(movie_id, weight)| {
            let position = index.position_of(movie_id)?;
            Some((weight, breakdown_row(position, matrices, index)?))
        })
        .collect();

    if rows.is_empty() {
        debug!("No usable seeds, falling back to popularity");
        return cold_start_candidates(context, index);
    }

    let total_weight: f32 = rows.iter().map(|(w, _)| w).sum();
    let weights = context.weights.normalized();

    let mut sums = vec![ScoreBreakdown::default(); index.len()];
    for (weight, row) in &rows {
        for (acc, parts) in sums.iter_mut().zip(row) {
            acc.content += weight * parts.content;
            acc.cast += weight * parts.cast;
            acc.production += weight * parts.production;
            acc.popularity += weight * parts.popularity;
        }
    }

    sums.into_iter()
        .enumerate()
        .filter_map(|(j, sum)| {
            let movie = index.movie_at(j)?;
            let mean = ScoreBreakdown {
                content: sum.content / total_weight,
                cast: sum.cast / total_weight,
                production: sum.production / total_weight,
                popularity: sum.popularity / total_weight,
            };
            let score = (weights.content * mean.content
                + weights.cast * mean.cast
                + weights.production * mean.production
                + weights.popularity * mean.popularity)
                .clamp(0.0, 1.0);
            Some(
                Candidate::new(movie.id, CandidateSource::Personalized, score)
                    .with_breakdown(mean),
            )
        })
        .collect()
}

/// Popularity within the user's favorite genres, or overall if that's empty
pub fn cold_start_candidates(context: &UserContext, index: &DataIndex) -> Vec<Candidate> {
    let by_genre = popularity_candidates(index, &context.favorite_genres);
    if by_genre.is_empty() {
        popularity_candidates(index, &[])
    } else {
        by_genre
    }
}
