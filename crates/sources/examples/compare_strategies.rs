//! Example: Compare every strategy for one movie
//!
//! Run with: cargo run --package sources --example compare_strategies -- [TITLE]
//!
//! This example shows how to:
//! 1. Load the TMDB dataset
//! 2. Build (or load cached) similarity matrices
//! 3. Run each strategy for the same query movie
//! 4. Display the results side by side

use data_loader::DataIndex;
use similarity::{ArtifactCache, FeatureConfig};
use sources::{HybridWeights, Strategy, StrategyRequest, recommend};
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let title = std::env::args().nth(1).unwrap_or_else(|| "The Dark Knight".to_string());

    println!("=== ReelRecs Strategy Comparison ===\n");

    let start = Instant::now();
    let index = DataIndex::load_from_files(Path::new("data/tmdb"))?;
    println!("Loaded {} movies in {:?}", index.len(), start.elapsed());

    let start = Instant::now();
    let matrices = ArtifactCache::new("cache").load_or_build(&index, &FeatureConfig::default())?;
    println!("Similarity matrices ready in {:?}\n", start.elapsed());

    let movie = index
        .find_by_title(&title)
        .ok_or_else(|| anyhow::anyhow!("No movie titled {:?}", title))?;
    println!("Query: {} ({})\n", movie.title, movie.id);

    let weights = HybridWeights::default();
    for strategy in Strategy::ALL {
        let request = StrategyRequest {
            strategy,
            query: Some(movie.id),
            top_k: 5,
            ..StrategyRequest::default()
        };
        let start = Instant::now();
        let results = recommend(&request, &matrices, &index, &weights)?;
        println!("{} ({:?}):", strategy, start.elapsed());
        for (rank, candidate) in results.iter().enumerate() {
            let title = index.get_movie(candidate.movie_id).map_or("?", |m| m.title.as_str());
            println!("  {}. {} [{:.3}]", rank + 1, title, candidate.score);
        }
        println!();
    }

    Ok(())
}
