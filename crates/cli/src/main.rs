use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, Movie, MovieId};
use preferences::{PreferenceStore, PreferencesUpdate, taste};
use server::{
    ChatBot, MovieQuery, MovieRecommendation, RecommendationOrchestrator, RecommendationOutcome,
    RecommenderConfig,
};
use similarity::{ArtifactCache, SimilarityMatrices};
use sources::Strategy;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Content-based movie recommender over the TMDB 5000 dataset", long_about = None)]
struct Cli {
    /// Directory holding tmdb_5000_movies.csv and tmdb_5000_credits.csv
    #[arg(short, long, env = "REEL_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory for cached similarity matrices
    #[arg(long, env = "REEL_CACHE_DIR", default_value = "cache")]
    cache_dir: PathBuf,

    /// Directory for per-user ratings, watchlists and history
    #[arg(long, env = "REEL_USER_DIR", default_value = "user_data")]
    user_dir: PathBuf,

    /// JSON config file (defaults apply when absent)
    #[arg(long, env = "REEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the similarity matrices and write them to the cache
    BuildCache {
        /// Rebuild even if a matching cache exists
        #[arg(long)]
        force: bool,
    },

    /// Recommend movies similar to one movie
    Recommend {
        /// Query movie id
        #[arg(long, conflicts_with = "title")]
        id: Option<MovieId>,

        /// Query movie title (exact or fragment)
        #[arg(long)]
        title: Option<String>,

        /// content, cast, production, hybrid or popularity
        #[arg(long, default_value = "hybrid")]
        strategy: Strategy,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Only keep movies in these genres
        #[arg(long, value_delimiter = ',')]
        genre: Vec<String>,

        /// Show an explanation for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Most popular movies, optionally by genre
    Popular {
        #[arg(long, value_delimiter = ',')]
        genre: Vec<String>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Personal picks from a user's ratings and watchlist
    ForYou {
        #[arg(long)]
        user: String,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        explain: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Rate a movie from 1 to 10
    Rate {
        #[arg(long)]
        user: String,

        #[arg(long)]
        id: MovieId,

        #[arg(long)]
        rating: f32,
    },

    /// Remove a rating
    Unrate {
        #[arg(long)]
        user: String,

        #[arg(long)]
        id: MovieId,
    },

    /// Manage a user's watchlist
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },

    /// Record that a user viewed a movie
    Viewed {
        #[arg(long)]
        user: String,

        #[arg(long)]
        id: MovieId,
    },

    /// Show user statistics and taste, or export everything as JSON
    Profile {
        #[arg(long)]
        user: String,

        #[arg(long)]
        json: bool,
    },

    /// Update a user's explicit preferences
    Prefs {
        #[arg(long)]
        user: String,

        /// Favorite genres (replaces the stored list)
        #[arg(long, value_delimiter = ',')]
        genre: Vec<String>,

        /// Forget the stored favorite genres
        #[arg(long, conflicts_with = "genre")]
        clear_genres: bool,

        #[arg(long)]
        prefer_popular: Option<bool>,

        #[arg(long)]
        prefer_familiar_cast: Option<bool>,
    },

    /// Delete all stored data for a user
    ClearUser {
        #[arg(long)]
        user: String,
    },

    /// Ask for recommendations in plain language
    Chat {
        /// Answer one message and exit; without it, read messages from stdin
        #[arg(long)]
        message: Option<String>,

        /// Print replies as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        #[arg(long, default_value = "hybrid")]
        strategy: Strategy,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    Add {
        #[arg(long)]
        user: String,

        #[arg(long)]
        id: MovieId,
    },
    Remove {
        #[arg(long)]
        user: String,

        #[arg(long)]
        id: MovieId,
    },
    List {
        #[arg(long)]
        user: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RecommenderConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");
    let app = App { cli: &cli, config };

    // Dispatch to appropriate command handler
    match &cli.command {
        Commands::BuildCache { force } => app.handle_build_cache(*force)?,
        Commands::Recommend {
            id,
            title,
            strategy,
            limit,
            genre,
            explain,
        } => app.handle_recommend(*id, title.as_deref(), *strategy, *limit, genre, *explain)?,
        Commands::Popular { genre, limit } => app.handle_popular(genre, *limit)?,
        Commands::ForYou {
            user,
            limit,
            explain,
        } => app.handle_for_you(user, *limit, *explain)?,
        Commands::Search { title, limit } => app.handle_search(title, *limit)?,
        Commands::Rate { user, id, rating } => app.handle_rate(user, *id, *rating)?,
        Commands::Unrate { user, id } => app.handle_unrate(user, *id)?,
        Commands::Watchlist { action } => app.handle_watchlist(action)?,
        Commands::Viewed { user, id } => app.handle_viewed(user, *id)?,
        Commands::Profile { user, json } => app.handle_profile(user, *json)?,
        Commands::Prefs {
            user,
            genre,
            clear_genres,
            prefer_popular,
            prefer_familiar_cast,
        } => {
            let favorite_genres = if *clear_genres {
                Some(Vec::new())
            } else if genre.is_empty() {
                None
            } else {
                Some(genre.clone())
            };
            let update = PreferencesUpdate {
                favorite_genres,
                prefer_popular: *prefer_popular,
                prefer_familiar_cast: *prefer_familiar_cast,
            };
            app.handle_prefs(user, update)?
        }
        Commands::ClearUser { user } => app.handle_clear_user(user)?,
        Commands::Chat { message, json } => app.handle_chat(message.as_deref(), *json)?,
        Commands::Benchmark { requests, strategy } => app.handle_benchmark(*requests, *strategy)?,
    }

    Ok(())
}

struct App<'a> {
    cli: &'a Cli,
    config: RecommenderConfig,
}

impl App<'_> {
    /// Load the dataset (this may take a moment)
    fn load_index(&self) -> Result<Arc<DataIndex>> {
        println!("Loading TMDB dataset from {}...", self.cli.data_dir.display());
        let start = Instant::now();
        let index = DataIndex::load_from_files(&self.cli.data_dir)
            .context("Failed to load TMDB dataset")?;
        println!(
            "{} Loaded {} movies in {:?}",
            "✓".green(),
            index.len(),
            start.elapsed()
        );
        Ok(Arc::new(index))
    }

    fn cache(&self) -> ArtifactCache {
        ArtifactCache::new(&self.cli.cache_dir)
    }

    fn load_orchestrator(&self) -> Result<RecommendationOrchestrator> {
        let index = self.load_index()?;
        let start = Instant::now();
        let matrices = self
            .cache()
            .load_or_build(&index, &self.config.features)
            .context("Failed to prepare similarity matrices")?;
        println!("{} Similarity matrices ready in {:?}", "✓".green(), start.elapsed());
        Ok(RecommendationOrchestrator::new(
            index,
            Arc::new(matrices),
            self.config.clone(),
        ))
    }

    fn store(&self) -> Result<PreferenceStore> {
        Ok(PreferenceStore::open(&self.cli.user_dir)
            .context("Failed to open user data directory")?
            .with_history_cap(self.config.history_cap))
    }

    fn limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.config.default_top_k).max(1)
    }

    /// Handle the 'build-cache' command
    fn handle_build_cache(&self, force: bool) -> Result<()> {
        let index = self.load_index()?;
        let cache = self.cache();
        if force && cache.clear().context("Failed to clear similarity cache")? {
            println!("Removed cached matrices at {}", cache.path().display());
        }

        let start = Instant::now();
        let matrices: SimilarityMatrices = cache
            .load_or_build(&index, &self.config.features)
            .context("Failed to build similarity matrices")?;
        println!(
            "{} {} x {} matrices ({}) in {:?}",
            "✓".green(),
            matrices.len(),
            matrices.len(),
            matrices.fingerprint(),
            start.elapsed()
        );
        println!("Cache: {}", cache.path().display());
        Ok(())
    }

    /// Handle the 'recommend' command
    fn handle_recommend(
        &self,
        id: Option<MovieId>,
        title: Option<&str>,
        strategy: Strategy,
        limit: Option<usize>,
        genres: &[String],
        explain: bool,
    ) -> Result<()> {
        let orchestrator = self.load_orchestrator()?;
        let limit = self.limit(limit);
        if !strategy.needs_query() {
            print_outcome(&orchestrator.popular(genres, limit), explain);
            return Ok(());
        }

        let query = match (id, title) {
            (Some(id), _) => MovieQuery::Id(id),
            (None, Some(title)) => MovieQuery::Title(title.to_string()),
            (None, None) => bail!("Strategy {} needs --id or --title", strategy),
        };
        if let Ok(movie) = orchestrator.resolve(&query) {
            println!("{}", format!("Because you picked {}:", describe(movie)).bold());
        }
        let outcome = orchestrator.recommend(&query, strategy, genres, limit)?;
        print_outcome(&outcome, explain);
        Ok(())
    }

    /// Handle the 'popular' command
    fn handle_popular(&self, genres: &[String], limit: Option<usize>) -> Result<()> {
        let orchestrator = self.load_orchestrator()?;
        let outcome = orchestrator.popular(genres, self.limit(limit));
        print_outcome(&outcome, true);
        Ok(())
    }

    /// Handle the 'for-you' command
    fn handle_for_you(&self, user: &str, limit: Option<usize>, explain: bool) -> Result<()> {
        let profile = self.store()?.profile_or_default(user)?;
        let orchestrator = self.load_orchestrator()?;
        let outcome = orchestrator.for_you(&profile, self.limit(limit))?;
        print_outcome(&outcome, explain);
        Ok(())
    }

    /// Handle the 'search' command
    fn handle_search(&self, title: &str, limit: usize) -> Result<()> {
        let index = self.load_index()?;
        let matches = index.search_titles(title);

        println!("{}", format!("Search results for '{}':", title).bold().blue());
        if matches.is_empty() {
            println!("  No movies found");
        }
        for movie in matches.iter().take(limit) {
            println!(
                "{}: {} [{}] avg {:.1} ({} votes)",
                movie.id.to_string().green(),
                describe(movie),
                movie.genres.join(", "),
                movie.vote_average,
                movie.vote_count
            );
        }
        Ok(())
    }

    /// Handle the 'rate' command
    fn handle_rate(&self, user: &str, id: MovieId, rating: f32) -> Result<()> {
        let index = self.load_index()?;
        let movie = find_movie(&index, id)?;
        self.store()?.rate(user, id, &movie.title, rating)?;
        println!("{} {} rated {} {}/10", "✓".green(), user, movie.title, rating);
        Ok(())
    }

    /// Handle the 'unrate' command
    fn handle_unrate(&self, user: &str, id: MovieId) -> Result<()> {
        if self.store()?.remove_rating(user, id)? {
            println!("{} Removed rating for movie {}", "✓".green(), id);
        } else {
            println!("{} had no rating for movie {}", user, id);
        }
        Ok(())
    }

    /// Handle the 'watchlist' commands
    fn handle_watchlist(&self, action: &WatchlistAction) -> Result<()> {
        let store = self.store()?;
        match action {
            WatchlistAction::Add { user, id } => {
                let index = self.load_index()?;
                let movie = find_movie(&index, *id)?;
                if store.add_to_watchlist(user, *id, &movie.title)? {
                    println!("{} Added {} to {}'s watchlist", "✓".green(), movie.title, user);
                } else {
                    println!("{} is already on {}'s watchlist", movie.title, user);
                }
            }
            WatchlistAction::Remove { user, id } => {
                if store.remove_from_watchlist(user, *id)? {
                    println!("{} Removed movie {} from {}'s watchlist", "✓".green(), id, user);
                } else {
                    println!("Movie {} is not on {}'s watchlist", id, user);
                }
            }
            WatchlistAction::List { user } => {
                let profile = store.get_profile(user)?;
                println!("{}", format!("{}'s watchlist:", user).bold().blue());
                if profile.watchlist.is_empty() {
                    println!("  (empty)");
                }
                for entry in &profile.watchlist {
                    println!(
                        "  - {} ({}) added {}",
                        entry.title,
                        entry.movie_id,
                        entry.added_at.format("%Y-%m-%d")
                    );
                }
            }
        }
        Ok(())
    }

    /// Handle the 'viewed' command
    fn handle_viewed(&self, user: &str, id: MovieId) -> Result<()> {
        let index = self.load_index()?;
        let movie = find_movie(&index, id)?;
        self.store()?.mark_viewed(user, id, &movie.title)?;
        println!("{} Recorded {} viewing {}", "✓".green(), user, movie.title);
        Ok(())
    }

    /// Handle the 'profile' command
    fn handle_profile(&self, user: &str, json: bool) -> Result<()> {
        let store = self.store()?;
        let index = self.load_index()?;
        if json {
            println!("{}", store.export(user, &index)?);
            return Ok(());
        }

        let profile = store.get_profile(user)?;
        let stats = taste::user_stats(&profile, &index);

        println!("{}", format!("User: {}", user).bold().blue());
        println!("{}Ratings: {}", "• ".cyan(), stats.total_ratings);
        if stats.total_ratings > 0 {
            println!("{}Average rating: {:.2}", "• ".cyan(), stats.average_rating);
            println!(
                "{}Range: {:.1} - {:.1} (std {:.2})",
                "• ".cyan(),
                stats.lowest_rating.unwrap_or_default(),
                stats.highest_rating.unwrap_or_default(),
                stats.rating_std
            );
        }
        println!("{}Watchlist: {}", "• ".cyan(), stats.watchlist_size);
        println!("{}Movies viewed: {}", "• ".cyan(), stats.movies_viewed);

        let mut top_rated: Vec<_> = profile.ratings.values().collect();
        top_rated.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        if !top_rated.is_empty() {
            println!("Top rated movies:");
        }
        for entry in top_rated.iter().take(5) {
            println!("  - {} (Rating: {})", entry.title, entry.rating);
        }

        let summary = taste::taste_summary(&profile, &index, taste::FAVORITE_GENRE_LIMIT);
        if !summary.top_genres.is_empty() {
            println!("Genre preferences:");
        }
        for affinity in &summary.top_genres {
            println!("  - {}: {:.2}", affinity.genre, affinity.score);
        }
        if !stats.favorite_genres.is_empty() {
            println!("Favorite genres: {}", stats.favorite_genres.join(", "));
        }

        let prefs = &profile.preferences;
        println!(
            "Prefers popular: {}, prefers familiar cast: {}",
            prefs.prefer_popular, prefs.prefer_familiar_cast
        );
        Ok(())
    }

    /// Handle the 'prefs' command
    fn handle_prefs(&self, user: &str, update: PreferencesUpdate) -> Result<()> {
        if update.is_empty() {
            bail!("Nothing to update: pass --genre, --clear-genres, --prefer-popular or --prefer-familiar-cast");
        }
        let prefs = self.store()?.update_preferences(user, update)?;
        println!("{} Updated preferences for {}", "✓".green(), user);
        println!("  Favorite genres: {}", prefs.favorite_genres.join(", "));
        println!("  Prefers popular: {}", prefs.prefer_popular);
        println!("  Prefers familiar cast: {}", prefs.prefer_familiar_cast);
        Ok(())
    }

    /// Handle the 'clear-user' command
    fn handle_clear_user(&self, user: &str) -> Result<()> {
        if self.store()?.clear_user(user)? {
            println!("{} Deleted all data for {}", "✓".green(), user);
        } else {
            println!("No data stored for {}", user);
        }
        Ok(())
    }

    /// Handle the 'chat' command
    fn handle_chat(&self, message: Option<&str>, json: bool) -> Result<()> {
        let bot = ChatBot::new(self.load_orchestrator()?);

        if let Some(message) = message {
            let reply = bot.respond(message)?;
            return print_reply(&reply, json);
        }

        println!("{}", "Ask me for movies. Type 'quit' to leave.".bold().blue());
        let stdin = io::stdin();
        loop {
            print!("{} ", ">".green());
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line.to_lowercase().as_str(), "quit" | "exit" | "bye") {
                println!("Enjoy the movies!");
                break;
            }
            let reply = bot.respond(line)?;
            print_reply(&reply, json)?;
        }
        Ok(())
    }

    /// Handle the 'benchmark' command
    fn handle_benchmark(&self, requests: usize, strategy: Strategy) -> Result<()> {
        if requests == 0 {
            bail!("--requests must be at least 1");
        }
        let orchestrator = self.load_orchestrator()?;
        let movie_ids = orchestrator.data_index().movie_ids();
        let limit = self.config.default_top_k;

        // Random query movies from the dataset
        let queries: Vec<MovieId> = (0..requests)
            .map(|_| movie_ids[rand::random::<u32>() as usize % movie_ids.len()])
            .collect();

        let mut timings = Vec::with_capacity(requests);
        let wall = Instant::now();
        for id in queries {
            let start = Instant::now();
            orchestrator.recommend(&MovieQuery::Id(id), strategy, &[], limit)?;
            timings.push(start.elapsed());
        }
        let wall = wall.elapsed();

        let total_time: Duration = timings.iter().sum();
        let avg_latency = total_time / timings.len() as u32;
        timings.sort();
        let percentile = |p: f32| {
            let at = ((timings.len() as f32 * p) as usize).min(timings.len() - 1);
            timings[at]
        };
        let throughput = requests as f32 / wall.as_secs_f32();

        println!("{}", format!("Benchmark results ({}):", strategy).bold().blue());
        println!("Requests: {}", requests);
        println!("Total time: {:?}", wall);
        println!("Average latency: {:?}", avg_latency);
        println!("P50 latency: {:?}", percentile(0.50));
        println!("P95 latency: {:?}", percentile(0.95));
        println!("P99 latency: {:?}", percentile(0.99));
        println!("Throughput: {:.2} requests/second", throughput);
        Ok(())
    }
}

fn find_movie(index: &DataIndex, id: MovieId) -> Result<&Movie> {
    index
        .get_movie(id)
        .ok_or_else(|| anyhow!("Movie {} not found", id))
}

fn describe(movie: &Movie) -> String {
    match movie.year() {
        Some(year) => format!("{} ({})", movie.title, year),
        None => movie.title.clone(),
    }
}

fn print_reply(reply: &server::ChatReply, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }
    println!("{}", reply.message);
    if let Some(notice) = &reply.notice {
        println!("{}", notice.yellow());
    }
    print_recommendations(&reply.recommendations, false);
    Ok(())
}

fn print_outcome(outcome: &RecommendationOutcome, explain: bool) {
    if let Some(notice) = &outcome.notice {
        println!("{}", notice.yellow());
    }
    print_recommendations(&outcome.recommendations, explain);
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[MovieRecommendation], explain: bool) {
    if recommendations.is_empty() {
        println!("No recommendations");
        return;
    }
    println!("{}", "Movie Recommendations:".bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        let year = rec.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!(
            "{}. {}{} [{}] - Score: {:.2}",
            (rank + 1).to_string().green(),
            rec.title,
            year,
            rec.genres.join(", "),
            rec.score
        );
        if explain {
            println!("   {} ({})", rec.explanation, rec.source);
        }
        if let Some(url) = &rec.poster_url {
            println!("   Poster: {}", url);
        }
    }
}
