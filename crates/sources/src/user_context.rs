//! Build a UserContext from a stored profile
//!
//! Gathers everything personalization needs up front, so strategies and
//! filters never touch the preference store.

use crate::hybrid::HybridWeights;
use crate::types::UserContext;
use data_loader::DataIndex;
use preferences::UserProfile;
use preferences::taste::{self, FAVORITE_GENRE_LIMIT};

/// Seed weight given to a watchlisted movie the user hasn't rated highly
pub const WATCHLIST_SEED_WEIGHT: f32 = 0.5;

/// Build a UserContext for `profile`
///
/// - Seen movies: rated, watchlisted or viewed
/// - Seeds: ratings at or above `high_rating_threshold`, weighted rating/10,
///   plus watchlist entries at `WATCHLIST_SEED_WEIGHT`
/// - Favorite genres: stored preference, else inferred from ratings
/// - Weights: `base_weights` adjusted by the stored preferences
///
/// Seeds for movies missing from the dataset are dropped.
pub fn build_user_context(
    profile: &UserProfile,
    index: &DataIndex,
    base_weights: &HybridWeights,
    high_rating_threshold: f32,
) -> UserContext {
    let mut context = UserContext::new(profile.user_id.clone());
    context.seen_movies = profile.seen_movie_ids();

    for (movie_id, rating) in profile.high_ratings(high_rating_threshold) {
        if index.get_movie(movie_id).is_some() {
            context.seeds.push((movie_id, rating / 10.0));
        }
    }
    for entry in &profile.watchlist {
        let already_seeded = context.seeds.iter().any(|(id, _)| *id == entry.movie_id);
        if !already_seeded && index.get_movie(entry.movie_id).is_some() {
            context.seeds.push((entry.movie_id, WATCHLIST_SEED_WEIGHT));
        }
    }

    context.favorite_genres = taste::favorite_genres(profile, index, FAVORITE_GENRE_LIMIT);
    context.weights = base_weights.adjusted_for(&profile.preferences);
    context
}
