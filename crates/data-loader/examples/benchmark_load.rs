use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/tmdb");

    println!("Loading TMDB 5000 dataset...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_files(data_dir)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let with_cast = index.movies().iter().filter(|m| !m.cast.is_empty()).count();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", index.len());
    println!("Movies with credits: {}", with_cast);
    println!("Genres: {}", index.genres().len());
    println!("\nPerformance: {:.0} movies/second",
             index.len() as f64 / elapsed.as_secs_f64());
}
