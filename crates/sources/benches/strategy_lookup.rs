//! Benchmarks for per-request strategy work
//!
//! Run with: cargo bench --package sources
//!
//! Matrix construction is benchmarked in the similarity crate; these measure
//! the per-request cost once matrices exist.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{DataIndex, Movie};
use similarity::{FeatureConfig, SimilarityMatrices};
use sources::personalized::personalized_candidates;
use sources::{HybridWeights, UserContext, hybrid, popularity, similar};
use std::path::Path;

fn load_test_data() -> DataIndex {
    let data_dir = Path::new("../../data/tmdb");
    if data_dir.exists() {
        return DataIndex::load_from_files(data_dir).expect("Failed to load test data");
    }

    let movies = (1..=400u32)
        .map(|id| Movie {
            overview: Some(format!("An epic tale number {} of hero {}", id % 17, id % 29)),
            genres: vec![format!("Genre {}", id % 8)],
            cast: vec![format!("Actor {}", id % 40)],
            production_companies: vec![format!("Studio {}", id % 9)],
            vote_average: (id % 10) as f32,
            vote_count: id * 7,
            popularity: (id % 100) as f32,
            ..Movie::new(id, format!("Movie {id}"))
        })
        .collect();
    DataIndex::from_movies(movies).expect("Failed to build synthetic data")
}

fn bench_strategies(c: &mut Criterion) {
    let index = load_test_data();
    let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();
    let query = index.movie_at(index.len() / 2).unwrap().id;
    let weights = HybridWeights::default();

    c.bench_function("content_top10", |b| {
        b.iter(|| similar::content_based(black_box(query), &matrices, &index, 10).unwrap())
    });

    c.bench_function("hybrid_top10", |b| {
        b.iter(|| hybrid::hybrid(black_box(query), &matrices, &index, &weights, 10).unwrap())
    });

    c.bench_function("popularity_top10", |b| {
        b.iter(|| popularity::popularity(black_box(&index), &[], 10))
    });

    let mut context = UserContext::new("bench");
    context.seeds = (0..10)
        .filter_map(|p| index.movie_at(p * 7).map(|m| (m.id, 0.8)))
        .collect();
    c.bench_function("personalized_candidates", |b| {
        b.iter(|| personalized_candidates(black_box(&context), &matrices, &index))
    });
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
