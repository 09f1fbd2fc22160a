//! # Recommendation Orchestrator
//!
//! Ties the strategies, the filter pipeline and enrichment together behind
//! the operations the CLI and the chat layer call:
//! 1. Resolve the query movie (by id or title)
//! 2. Run the requested strategy against the shared matrices
//! 3. Filter (genre restriction, or seen/low-evidence for personal picks)
//! 4. Rank, fill short lists from popularity
//! 5. Attach titles, explanations and poster art
//!
//! Lookup failures never surface as errors here: they become a popularity
//! fallback with a notice the user can read.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use data_loader::{DataIndex, Movie, MovieId};
use pipeline::FilterPipeline;
use pipeline::filters::{AlreadySeenFilter, GenreFilter, MinimumVotesFilter};
use preferences::UserProfile;
use similarity::SimilarityMatrices;
use sources::personalized::personalized_candidates;
use sources::popularity::{self, popularity_candidates};
use sources::user_context::build_user_context;
use sources::{
    Candidate, CandidateSource, HybridWeights, RecommendError, Strategy, StrategyRequest,
    UserContext, ranking,
};

use crate::config::RecommenderConfig;
use crate::enrichment::{Enrichment, MetadataProvider};

/// Final recommendation handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub year: Option<i32>,
    pub score: f32,
    pub source: CandidateSource,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// Recommendations plus what the user should be told about how they were made
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationOutcome {
    pub recommendations: Vec<MovieRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Some or all results came from the popularity fallback
    pub fell_back: bool,
}

/// How the caller names the movie to recommend around
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieQuery {
    Id(MovieId),
    Title(String),
}

/// Coordinates every recommendation path over one loaded dataset
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    data_index: Arc<DataIndex>,
    matrices: Arc<SimilarityMatrices>,
    config: RecommenderConfig,
    personal_pipeline: Arc<FilterPipeline>,
    favorites_pipeline: Arc<FilterPipeline>,
    enrichment: Arc<Enrichment>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over a dataset and its similarity matrices.
    ///
    /// Personal picks go through:
    /// - AlreadySeenFilter
    /// - MinimumVotesFilter (`config.min_vote_count`)
    ///
    /// Cold-start picks add a GenreFilter on the user's favorite genres.
    pub fn new(
        data_index: Arc<DataIndex>,
        matrices: Arc<SimilarityMatrices>,
        config: RecommenderConfig,
    ) -> Self {
        let personal_pipeline = Arc::new(
            FilterPipeline::new()
                .add_filter(AlreadySeenFilter)
                .add_filter(MinimumVotesFilter::new(
                    data_index.clone(),
                    config.min_vote_count,
                )),
        );
        let favorites_pipeline = Arc::new(
            FilterPipeline::new()
                .add_filter(AlreadySeenFilter)
                .add_filter(MinimumVotesFilter::new(
                    data_index.clone(),
                    config.min_vote_count,
                ))
                .add_filter(GenreFilter::from_favorites(data_index.clone())),
        );
        Self {
            data_index,
            matrices,
            config,
            personal_pipeline,
            favorites_pipeline,
            enrichment: Arc::new(Enrichment::offline()),
        }
    }

    /// Use `provider` for poster art instead of the offline default
    pub fn with_metadata_provider(mut self, provider: Box<dyn MetadataProvider>) -> Self {
        self.enrichment = Arc::new(Enrichment::new(provider));
        self
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    pub fn matrices(&self) -> &Arc<SimilarityMatrices> {
        &self.matrices
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn enrichment(&self) -> &Enrichment {
        &self.enrichment
    }

    /// Find the movie a query refers to.
    ///
    /// Titles match exactly (case-insensitive) first, then as a fragment,
    /// most popular match first.
    pub fn resolve(&self, query: &MovieQuery) -> std::result::Result<&Movie, RecommendError> {
        match query {
            MovieQuery::Id(id) => self
                .data_index
                .get_movie(*id)
                .ok_or(RecommendError::MovieNotFound(*id)),
            MovieQuery::Title(title) => self
                .data_index
                .find_by_title(title)
                .or_else(|| self.data_index.search_titles(title).into_iter().next())
                .ok_or_else(|| RecommendError::TitleNotFound(title.trim().to_string())),
        }
    }

    /// Recommendations around one movie.
    ///
    /// `genres` optionally restricts the results (any-of). A query that
    /// can't be resolved falls back to the global popularity ranking.
    #[instrument(skip(self, genres), fields(genres = genres.len()))]
    pub fn recommend(
        &self,
        query: &MovieQuery,
        strategy: Strategy,
        genres: &[String],
        limit: usize,
    ) -> Result<RecommendationOutcome> {
        if !strategy.needs_query() {
            return Ok(self.popular(genres, limit));
        }

        let movie = match self.resolve(query) {
            Ok(movie) => movie,
            Err(e) => return Ok(self.fallback(&e, limit)),
        };
        info!("Recommending around {} ({}) via {}", movie.title, movie.id, strategy);

        // A genre restriction filters the full ranking, then truncates
        let request = StrategyRequest {
            strategy,
            query: Some(movie.id),
            genres: Vec::new(),
            top_k: if genres.is_empty() {
                limit
            } else {
                self.data_index.len()
            },
        };
        let candidates = match sources::recommend(
            &request,
            &self.matrices,
            &self.data_index,
            &self.config.hybrid_weights,
        ) {
            Ok(candidates) => candidates,
            Err(e) if e.is_not_found() => return Ok(self.fallback(&e, limit)),
            Err(e) => return Err(e).context("Strategy dispatch failed"),
        };

        let mut candidates = if genres.is_empty() {
            candidates
        } else {
            let genre_pipeline = FilterPipeline::new()
                .add_filter(GenreFilter::new(self.data_index.clone(), genres.to_vec()));
            genre_pipeline
                .apply(candidates, &UserContext::new("anonymous"))
                .context("Failed to apply genre restriction")?
        };
        candidates.truncate(limit);

        let weights = self.config.hybrid_weights.normalized();
        let recommendations = self.to_recommendations(candidates, |candidate, found| {
            explain(candidate, found, Some(&movie.title), &weights)
        });

        let notice = (recommendations.is_empty() && !genres.is_empty()).then(|| {
            format!(
                "Nothing like {} in {}",
                movie.title,
                genres.join(", ")
            )
        });
        Ok(RecommendationOutcome {
            recommendations,
            notice,
            fell_back: false,
        })
    }

    /// Most popular movies, optionally in any of `genres`.
    ///
    /// If no movie carries those genres the global ranking is returned with
    /// a notice.
    #[instrument(skip(self))]
    pub fn popular(&self, genres: &[String], limit: usize) -> RecommendationOutcome {
        let mut candidates = popularity::popularity(&self.data_index, genres, limit);
        let mut notice = None;
        let mut fell_back = false;

        if candidates.is_empty() && !genres.is_empty() {
            warn!("No movies in genres {:?}, widening to all movies", genres);
            notice = Some(format!(
                "No movies found in {}; showing popular movies instead",
                genres.join(", ")
            ));
            fell_back = true;
            candidates = popularity::popularity(&self.data_index, &[], limit);
        }

        let weights = self.config.hybrid_weights.normalized();
        RecommendationOutcome {
            recommendations: self.to_recommendations(candidates, |candidate, movie| {
                explain(candidate, movie, None, &weights)
            }),
            notice,
            fell_back,
        }
    }

    /// Most popular movies featuring a cast member (case-insensitive name).
    #[instrument(skip(self))]
    pub fn movies_with_actor(&self, actor: &str, limit: usize) -> RecommendationOutcome {
        let Some(name) = self.data_index.canonical_actor_name(actor) else {
            return self.fallback(&RecommendError::ActorNotFound(actor.trim().to_string()), limit);
        };

        let candidates: Vec<Candidate> = self
            .data_index
            .get_movies_with_actor(name)
            .iter()
            .map(|&id| {
                let score = self
                    .data_index
                    .get_movie_stats(id)
                    .map_or(0.0, |s| s.normalized_score);
                Candidate::new(id, CandidateSource::Popularity, score)
            })
            .collect();
        let ranked = ranking::top_k(candidates, &self.data_index, limit);
        debug!("{} movies featuring {}", ranked.len(), name);

        RecommendationOutcome {
            recommendations: self
                .to_recommendations(ranked, |_, _| format!("Features {}", name)),
            notice: None,
            fell_back: false,
        }
    }

    /// Personal picks for a stored profile.
    ///
    /// Seen and low-evidence movies are filtered out; a short list is topped
    /// up from the popularity ranking under the same filters.
    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub fn for_you(&self, profile: &UserProfile, limit: usize) -> Result<RecommendationOutcome> {
        let start_time = Instant::now();

        let context = build_user_context(
            profile,
            &self.data_index,
            &self.config.hybrid_weights,
            self.config.high_rating_threshold,
        );
        info!(
            "Built user context for {}: {} seeds, {} seen",
            context.user_id,
            context.seeds.len(),
            context.seen_movies.len()
        );

        let candidates = personalized_candidates(&context, &self.matrices, &self.data_index);
        info!("Generated {} personalized candidates", candidates.len());

        let filtered = self
            .personal_pipeline
            .apply(candidates, &context)
            .context("Failed to filter personalized candidates")?;
        info!("Applied filters, candidates remaining: {}", filtered.len());

        let mut ranked = ranking::top_k(filtered, &self.data_index, limit);
        let mut notice = context.is_cold_start().then(|| {
            "Rate or watchlist a few movies for personal picks; showing popular movies for now"
                .to_string()
        });
        let mut fell_back = context.is_cold_start();

        if context.is_cold_start() && !context.favorite_genres.is_empty() {
            let wanted = limit.saturating_sub(ranked.len());
            let fill = self.popular_fill(&self.favorites_pipeline, &context, &ranked, wanted)?;
            debug!(
                "Cold start: {} popular picks in {:?}",
                fill.len(),
                context.favorite_genres
            );
            ranked.extend(fill);
        }

        if ranked.len() < limit {
            let fill = self.popular_fill(
                &self.personal_pipeline,
                &context,
                &ranked,
                limit - ranked.len(),
            )?;
            if !fill.is_empty() {
                info!("Filled {} slots from popularity", fill.len());
                fell_back = true;
                notice.get_or_insert_with(|| {
                    format!("{} picks are popular movies you haven't seen", fill.len())
                });
                ranked.extend(fill);
            }
        }

        let weights = context.weights.normalized();
        let recommendations = self.to_recommendations(ranked, |candidate, movie| {
            explain(candidate, movie, None, &weights)
        });

        info!(
            "Selected {} recommendations for {} in {:.2?}",
            recommendations.len(),
            context.user_id,
            start_time.elapsed()
        );
        Ok(RecommendationOutcome {
            recommendations,
            notice,
            fell_back,
        })
    }

    /// Titles containing `fragment`, exact matches first
    pub fn search(&self, fragment: &str, limit: usize) -> Vec<&Movie> {
        let mut matches = self.data_index.search_titles(fragment);
        matches.truncate(limit);
        matches
    }

    /// Popularity ranking standing in for a failed lookup
    fn fallback(&self, error: &RecommendError, limit: usize) -> RecommendationOutcome {
        warn!("{}, falling back to popularity", error);
        let mut outcome = self.popular(&[], limit);
        outcome.notice = Some(format!("{}; showing popular movies instead", error));
        outcome.fell_back = true;
        outcome
    }

    /// Popular movies that pass the personal filters and aren't already chosen
    fn popular_fill(
        &self,
        pipeline: &FilterPipeline,
        context: &UserContext,
        chosen: &[Candidate],
        count: usize,
    ) -> Result<Vec<Candidate>> {
        let chosen: HashSet<MovieId> = chosen.iter().map(|c| c.movie_id).collect();
        let unseen: Vec<Candidate> = pipeline
            .apply(popularity_candidates(&self.data_index, &[]), context)
            .context("Failed to filter popularity fill")?
            .into_iter()
            .filter(|c| !chosen.contains(&c.movie_id))
            .collect();
        Ok(ranking::top_k(unseen, &self.data_index, count))
    }

    fn to_recommendations(
        &self,
        candidates: Vec<Candidate>,
        explain: impl Fn(&Candidate, &Movie) -> String,
    ) -> Vec<MovieRecommendation> {
        candidates
            .into_iter()
            .filter_map(|candidate| {
                let movie = self.data_index.get_movie(candidate.movie_id)?;
                Some(MovieRecommendation {
                    movie_id: movie.id,
                    title: movie.title.clone(),
                    genres: movie.genres.clone(),
                    year: movie.year(),
                    score: candidate.score,
                    source: candidate.source,
                    explanation: explain(&candidate, movie),
                    poster_url: self.enrichment.poster_url(movie),
                })
            })
            .collect()
    }
}

fn explain(
    candidate: &Candidate,
    movie: &Movie,
    query_title: Option<&str>,
    weights: &HybridWeights,
) -> String {
    let query = query_title.unwrap_or("your pick");
    let dominant = candidate
        .breakdown
        .map(|parts| parts.dominant(weights))
        .unwrap_or("content");
    match candidate.source {
        CandidateSource::Content => format!("Similar story and themes to {}", query),
        CandidateSource::Cast => format!("Shares cast with {}", query),
        CandidateSource::Production => format!("From the same studios as {}", query),
        CandidateSource::Hybrid => format!("Similar to {} (mostly {})", query, dominant),
        CandidateSource::Popularity => format!(
            "Rated {:.1}/10 by {} viewers",
            movie.vote_average, movie.vote_count
        ),
        CandidateSource::Personalized => {
            format!("Close to movies you liked (mostly {})", dominant)
        }
    }
}
