//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate contains the orchestrator that coordinates the strategies,
//! the filter pipeline and metadata enrichment, plus the chat layer built on
//! top of it.
//!
//! ## Example Usage
//! ```ignore
//! use server::{ChatBot, MovieQuery, RecommendationOrchestrator, RecommenderConfig};
//! use sources::Strategy;
//!
//! let orchestrator = RecommendationOrchestrator::new(index, matrices, RecommenderConfig::default());
//! let outcome = orchestrator.recommend(&MovieQuery::Title("Avatar".into()), Strategy::Hybrid, &[], 10)?;
//!
//! let bot = ChatBot::new(orchestrator);
//! let reply = bot.respond("movies like The Dark Knight")?;
//! ```

pub mod chat;
pub mod config;
pub mod enrichment;
pub mod intent;
pub mod orchestrator;

pub use chat::{ChatBot, ChatReply};
pub use config::RecommenderConfig;
pub use enrichment::{Enrichment, ExternalServiceError, MetadataProvider, OfflineProvider};
pub use intent::{Intent, Mood};
pub use orchestrator::{
    MovieQuery, MovieRecommendation, RecommendationOrchestrator, RecommendationOutcome,
};
