//! Integration tests for the pipeline.
//!
//! These tests verify that strategies, user context and filters work
//! together in a realistic "for you" scenario.

use chrono::Utc;
use data_loader::{DataIndex, Movie, MovieId};
use pipeline::FilterPipeline;
use pipeline::filters::*;
use preferences::{RatingEntry, UserProfile, WatchlistEntry};
use similarity::{FeatureConfig, SimilarityMatrices};
use sources::personalized::personalized_candidates;
use sources::user_context::build_user_context;
use sources::{HybridWeights, ranking};
use std::sync::Arc;

fn movie(id: MovieId, title: &str, genre: &str, actor: &str, votes: u32) -> Movie {
    Movie {
        overview: Some(format!("A {} story", genre.to_lowercase())),
        genres: vec![genre.to_string()],
        cast: vec![actor.to_string()],
        vote_average: 7.0,
        vote_count: votes,
        ..Movie::new(id, title)
    }
}

fn create_test_setup() -> (Arc<DataIndex>, SimilarityMatrices) {
    let index = DataIndex::from_movies(vec![
        movie(1, "Alien", "Horror", "Sigourney Weaver", 4000),
        movie(2, "Aliens", "Horror", "Sigourney Weaver", 3500),
        movie(3, "The Thing", "Horror", "Kurt Russell", 2500),
        movie(4, "Home Movie Horror", "Horror", "Nobody Famous", 3),
        movie(5, "Amelie", "Romance", "Audrey Tautou", 3000),
        movie(6, "Before Sunrise", "Romance", "Ethan Hawke", 1500),
    ])
    .unwrap();
    let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();
    (Arc::new(index), matrices)
}

fn horror_fan() -> UserProfile {
    let mut profile = UserProfile::new("ripley");
    profile.ratings.insert(
        1,
        RatingEntry {
            rating: 10.0,
            title: "Alien".to_string(),
            rated_at: Utc::now(),
        },
    );
    profile.watchlist.push(WatchlistEntry {
        movie_id: 6,
        title: "Before Sunrise".to_string(),
        added_at: Utc::now(),
    });
    profile
}

#[test]
fn test_full_pipeline_filters_correctly() {
    let (index, matrices) = create_test_setup();
    let context = build_user_context(&horror_fan(), &index, &HybridWeights::default(), 7.0);

    let candidates = personalized_candidates(&context, &matrices, &index);
    assert_eq!(candidates.len(), index.len());

    let pipeline = FilterPipeline::new()
        .add_filter(AlreadySeenFilter)
        .add_filter(MinimumVotesFilter::new(index.clone(), 50));

    let filtered = pipeline.apply(candidates, &context).unwrap();
    let ids: Vec<MovieId> = filtered.iter().map(|c| c.movie_id).collect();

    // Seen (rated 1, watchlisted 6) and low-evidence (4) are gone
    assert!(!ids.contains(&1));
    assert!(!ids.contains(&6));
    assert!(!ids.contains(&4));
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_ranked_results_prefer_seed_neighbours() {
    let (index, matrices) = create_test_setup();
    let context = build_user_context(&horror_fan(), &index, &HybridWeights::default(), 7.0);

    let pipeline = FilterPipeline::new()
        .add_filter(AlreadySeenFilter)
        .add_filter(MinimumVotesFilter::new(index.clone(), 50));
    let filtered = pipeline
        .apply(personalized_candidates(&context, &matrices, &index), &context)
        .unwrap();
    let ranked = ranking::top_k(filtered, &index, 2);

    // Same genre and lead as the seed
    assert_eq!(ranked[0].movie_id, 2);
    assert_eq!(ranked.len(), 2);
}

#[test]
fn test_favorite_genre_pipeline() {
    let (index, matrices) = create_test_setup();
    let mut profile = horror_fan();
    profile.preferences.favorite_genres = vec!["Romance".to_string()];
    let context = build_user_context(&profile, &index, &HybridWeights::default(), 7.0);

    let pipeline = FilterPipeline::new()
        .add_filter(AlreadySeenFilter)
        .add_filter(GenreFilter::from_favorites(index.clone()));
    let filtered = pipeline
        .apply(personalized_candidates(&context, &matrices, &index), &context)
        .unwrap();

    let ids: Vec<MovieId> = filtered.iter().map(|c| c.movie_id).collect();
    assert_eq!(ids, vec![5]);
}
