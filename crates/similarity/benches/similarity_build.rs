//! Benchmarks for similarity matrix construction and row lookups
//!
//! Run with: cargo bench --package similarity
//!
//! Uses the full TMDB 5000 dataset when present, otherwise a synthetic one.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{DataIndex, Movie};
use similarity::{FeatureConfig, MatrixKind, SimilarityMatrices};
use std::path::Path;

const GENRES: [&str; 6] = ["Action", "Drama", "Comedy", "Horror", "Romance", "Fantasy"];

fn load_test_data() -> DataIndex {
    let data_dir = Path::new("../../data/tmdb");
    if data_dir.exists() {
        return DataIndex::load_from_files(data_dir).expect("Failed to load test data");
    }

    let movies = (1..=500u32)
        .map(|id| Movie {
            overview: Some(format!("A story about hero {} and villain {}", id % 37, id % 11)),
            genres: vec![GENRES[id as usize % GENRES.len()].to_string()],
            cast: vec![format!("Actor {}", id % 50), format!("Actor {}", id % 23)],
            production_companies: vec![format!("Studio {}", id % 12)],
            vote_count: id * 3,
            vote_average: (id % 10) as f32,
            ..Movie::new(id, format!("Movie {id}"))
        })
        .collect();
    DataIndex::from_movies(movies).expect("Failed to build synthetic data")
}

fn bench_build_matrices(c: &mut Criterion) {
    let index = load_test_data();
    let config = FeatureConfig::default();

    let mut group = c.benchmark_group("similarity");
    group.sample_size(10);
    group.bench_function("build_matrices", |b| {
        b.iter(|| {
            let matrices = SimilarityMatrices::build(black_box(&index), &config).unwrap();
            black_box(matrices)
        })
    });
    group.finish();
}

fn bench_row_lookup(c: &mut Criterion) {
    let index = load_test_data();
    let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();
    let content = matrices.get(MatrixKind::Content);
    let middle = content.size() / 2;

    c.bench_function("content_row_lookup", |b| {
        b.iter(|| black_box(content.row(black_box(middle))))
    });
}

criterion_group!(benches, bench_build_matrices, bench_row_lookup);
criterion_main!(benches);
