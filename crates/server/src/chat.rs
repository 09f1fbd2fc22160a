//! Conversational front end: classify a message, run the matching
//! recommendation path, and phrase the reply.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use sources::Strategy;

use crate::intent::{self, Intent};
use crate::orchestrator::{
    MovieQuery, MovieRecommendation, RecommendationOrchestrator, RecommendationOutcome,
};

const EXAMPLES: &[&str] = &[
    "I want action movies",
    "Show me comedies",
    "Any good horror films?",
    "Recommend sci-fi movies",
    "Movies like The Dark Knight",
    "Movies with Tom Hanks",
    "I'm feeling sad",
];

/// One reply to one chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub intent: Intent,
    pub recommendations: Vec<MovieRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl ChatReply {
    fn text(message: String, intent: Intent) -> Self {
        Self {
            message,
            intent,
            recommendations: Vec::new(),
            notice: None,
        }
    }

    fn with_outcome(message: String, intent: Intent, outcome: RecommendationOutcome) -> Self {
        Self {
            message,
            intent,
            recommendations: outcome.recommendations,
            notice: outcome.notice,
        }
    }
}

/// Answers chat messages from one orchestrator
pub struct ChatBot {
    orchestrator: RecommendationOrchestrator,
    result_count: usize,
}

impl ChatBot {
    pub fn new(orchestrator: RecommendationOrchestrator) -> Self {
        let result_count = orchestrator.config().chat_results;
        Self {
            orchestrator,
            result_count,
        }
    }

    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count.max(1);
        self
    }

    /// Reply to `message`. Unrecognized messages get help text, not an error.
    pub fn respond(&self, message: &str) -> Result<ChatReply> {
        let intent = intent::classify(message);
        info!("Chat intent: {}", intent);
        let n = self.result_count;

        let reply = match &intent {
            Intent::TitleLookup { title } => {
                let query = MovieQuery::Title(title.clone());
                let text = match self.orchestrator.resolve(&query) {
                    Ok(movie) => format!("If you liked {}, you might enjoy:", movie.title),
                    Err(_) => format!(
                        "I couldn't find a movie called \"{}\". Here are some popular picks instead:",
                        title
                    ),
                };
                let outcome = self.orchestrator.recommend(&query, Strategy::Hybrid, &[], n)?;
                ChatReply::with_outcome(text, intent, outcome)
            }
            Intent::ActorRequest { actor } => {
                let text = match self.orchestrator.data_index().canonical_actor_name(actor) {
                    Some(name) => format!("Movies featuring {}:", name),
                    None => format!(
                        "I couldn't find anyone named {}. Here are some popular picks instead:",
                        actor
                    ),
                };
                let outcome = self.orchestrator.movies_with_actor(actor, n);
                ChatReply::with_outcome(text, intent, outcome)
            }
            Intent::MoodRequest { mood, genres } => {
                let text = format!(
                    "Feeling {}? Some {} might help:",
                    mood,
                    genres.join(" and ").to_lowercase()
                );
                let outcome = self.orchestrator.popular(genres, n);
                ChatReply::with_outcome(text, intent, outcome)
            }
            Intent::GenreRequest { genre, genres } => {
                let text = format!("Here are some great {} movies:", genre);
                let outcome = self.orchestrator.popular(genres, n);
                ChatReply::with_outcome(text, intent, outcome)
            }
            Intent::Unknown => {
                let opener = if intent::is_greeting(message) {
                    "Hello! I'm your movie recommendation assistant."
                } else if intent::is_help_request(message) {
                    "I recommend movies by genre, mood, actor or a movie you liked."
                } else {
                    "I'm not sure what you're looking for."
                };
                debug!("No recommendation intent in {:?}", message);
                ChatReply::text(format!("{}\n{}", opener, help_text()), intent)
            }
        };
        Ok(reply)
    }
}

/// Example requests and the genres the classifier knows
pub fn help_text() -> String {
    let mut text = String::from("Try asking:\n");
    for example in EXAMPLES {
        text.push_str(&format!("  - \"{}\"\n", example));
    }
    let genres: Vec<&str> = intent::known_genres().collect();
    text.push_str(&format!("Genres I know: {}", genres.join(", ")));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecommenderConfig;
    use data_loader::{DataIndex, Movie, MovieId};
    use similarity::{FeatureConfig, SimilarityMatrices};
    use std::sync::Arc;

    fn movie(id: MovieId, title: &str, genres: &[&str], actor: &str, votes: u32) -> Movie {
        Movie {
            overview: Some(format!("{} with {}", genres.join(" "), actor)),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            cast: vec![actor.to_string()],
            vote_average: 6.0 + (id % 4) as f32,
            vote_count: votes,
            ..Movie::new(id, title)
        }
    }

    fn create_test_bot() -> ChatBot {
        let index = DataIndex::from_movies(vec![
            movie(1, "The Dark Knight", &["Action", "Crime"], "Christian Bale", 9000),
            movie(2, "Batman Begins", &["Action", "Crime"], "Christian Bale", 7000),
            movie(3, "Big", &["Comedy", "Fantasy"], "Tom Hanks", 2000),
            movie(4, "Philadelphia", &["Drama"], "Tom Hanks", 1500),
            movie(5, "Airplane!", &["Comedy"], "Leslie Nielsen", 1200),
            movie(6, "Interstellar", &["Science Fiction", "Drama"], "Matthew McConaughey", 8000),
        ])
        .unwrap();
        let matrices = SimilarityMatrices::build(&index, &FeatureConfig::default()).unwrap();
        ChatBot::new(RecommendationOrchestrator::new(
            Arc::new(index),
            Arc::new(matrices),
            RecommenderConfig::default(),
        ))
    }

    fn has_genre(bot: &ChatBot, rec: &MovieRecommendation, genres: &[&str]) -> bool {
        bot.orchestrator
            .data_index()
            .get_movie(rec.movie_id)
            .is_some_and(|m| genres.iter().any(|g| m.has_genre(g)))
    }

    #[test]
    fn test_genre_request() {
        let bot = create_test_bot();
        let reply = bot.respond("Show me comedies").unwrap();

        assert_eq!(reply.intent.name(), "genre-request");
        assert_eq!(reply.recommendations.len(), 2);
        assert!(reply.recommendations.iter().all(|r| has_genre(&bot, r, &["Comedy"])));
        assert!(reply.notice.is_none());
    }

    #[test]
    fn test_genre_without_movies_falls_back() {
        let bot = create_test_bot();
        let reply = bot.respond("something scary").unwrap();

        assert_eq!(reply.intent.name(), "genre-request");
        assert_eq!(reply.recommendations.len(), 4);
        assert!(reply.notice.unwrap().contains("Horror"));
    }

    #[test]
    fn test_mood_request() {
        let bot = create_test_bot().with_result_count(10);
        let reply = bot.respond("I'm so sad").unwrap();

        assert!(matches!(reply.intent, Intent::MoodRequest { .. }));
        assert!(reply.message.contains("comedy and drama"));
        assert_eq!(reply.recommendations.len(), 4);
        assert!(
            reply
                .recommendations
                .iter()
                .all(|r| has_genre(&bot, r, &["Comedy", "Drama"]))
        );
    }

    #[test]
    fn test_actor_request() {
        let bot = create_test_bot();
        let reply = bot.respond("movies with tom hanks").unwrap();

        assert_eq!(reply.message, "Movies featuring Tom Hanks:");
        let mut ids: Vec<MovieId> = reply.recommendations.iter().map(|r| r.movie_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![3, 4]);

        let unknown = bot.respond("starring Nobody In Particular").unwrap();
        assert_eq!(unknown.intent.name(), "actor-request");
        assert_eq!(unknown.recommendations.len(), 4);
        assert!(unknown.notice.is_some());
    }

    #[test]
    fn test_title_lookup() {
        let bot = create_test_bot();
        let reply = bot.respond("movies like the dark knight").unwrap();

        assert_eq!(reply.message, "If you liked The Dark Knight, you might enjoy:");
        assert_eq!(reply.recommendations[0].movie_id, 2);
        assert!(reply.recommendations.iter().all(|r| r.movie_id != 1));

        let missing = bot.respond("something like Zardoz").unwrap();
        assert!(missing.message.contains("Zardoz"));
        assert!(missing.notice.is_some());
        assert_eq!(missing.recommendations.len(), 4);
    }

    #[test]
    fn test_unknown_gets_help() {
        let bot = create_test_bot();

        let reply = bot.respond("what's the weather like").unwrap();
        assert_eq!(reply.intent, Intent::Unknown);
        assert!(reply.recommendations.is_empty());
        assert!(reply.message.contains("Try asking"));

        let hello = bot.respond("hello").unwrap();
        assert!(hello.message.starts_with("Hello!"));
        assert!(hello.message.contains("Genres I know"));
    }
}
