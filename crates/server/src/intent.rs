//! Free-text intent classification for the chat layer.
//!
//! Plain keyword and phrase matching, checked in a fixed order: title
//! lookup, actor request, mood, genre. Anything else is `Unknown`.

use serde::Serialize;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

/// What a chat message asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Movies like a named title
    TitleLookup { title: String },
    /// Movies featuring a cast member
    ActorRequest { actor: String },
    /// A mood, mapped to a genre set
    MoodRequest { mood: Mood, genres: Vec<String> },
    /// A genre keyword (or synonym), mapped to a genre set
    GenreRequest { genre: String, genres: Vec<String> },
    Unknown,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::TitleLookup { .. } => "title-lookup",
            Intent::ActorRequest { .. } => "actor-request",
            Intent::MoodRequest { .. } => "mood-request",
            Intent::GenreRequest { .. } => "genre-request",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Down,
    Energetic,
    Bored,
    Relaxed,
}

impl Mood {
    pub fn genres(&self) -> &'static [&'static str] {
        match self {
            Mood::Down => &["Comedy", "Drama"],
            Mood::Energetic => &["Action", "Adventure"],
            Mood::Bored => &["Adventure", "Comedy"],
            Mood::Relaxed => &["Comedy", "Animation"],
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Down => &["sad", "depressed", "down", "upset"],
            Mood::Energetic => &["excited", "energetic", "pumped"],
            Mood::Bored => &["bored"],
            Mood::Relaxed => &["relaxed", "chill", "cozy"],
        }
    }

    const ALL: [Mood; 4] = [Mood::Down, Mood::Energetic, Mood::Bored, Mood::Relaxed];
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mood::Down => "down",
            Mood::Energetic => "energetic",
            Mood::Bored => "bored",
            Mood::Relaxed => "relaxed",
        };
        f.write_str(name)
    }
}

/// Genre keyword table: (name, keywords, genres)
const GENRE_TABLE: &[(&str, &[&str], &[&str])] = &[
    (
        "action",
        &["action", "fight", "fights", "adventure", "thriller", "thrillers", "explosive", "intense"],
        &["Action", "Adventure", "Thriller"],
    ),
    (
        "comedy",
        &["comedy", "comedies", "funny", "laugh", "humor", "hilarious", "joke", "jokes"],
        &["Comedy"],
    ),
    (
        "drama",
        &["drama", "dramas", "emotional", "deep", "serious", "touching", "meaningful"],
        &["Drama"],
    ),
    (
        "horror",
        &["horror", "scary", "frightening", "spooky", "terror", "creepy"],
        &["Horror", "Thriller"],
    ),
    (
        "romance",
        &["romance", "love", "romantic", "relationship", "dating", "heart"],
        &["Romance"],
    ),
    (
        "sci-fi",
        &["sci-fi", "sci fi", "science fiction", "space", "future", "alien", "aliens", "technology", "scifi"],
        &["Science Fiction"],
    ),
    (
        "fantasy",
        &["fantasy", "magic", "wizard", "wizards", "dragon", "dragons", "mythical", "supernatural"],
        &["Fantasy"],
    ),
    (
        "animation",
        &["animation", "animated", "cartoon", "cartoons", "pixar", "disney", "kids"],
        &["Animation"],
    ),
];

const TITLE_PREFIXES: &[&str] = &[
    "movies like ",
    "films like ",
    "something like ",
    "similar to ",
];

const ACTOR_PREFIXES: &[&str] = &[
    "movies by actor ",
    "movies with ",
    "films with ",
    "starring ",
    "featuring ",
];

/// Clauses that end a title ("like Alien starring ...")
const TITLE_TERMINATORS: &[&str] = &[" starring ", " featuring ", " with actor ", " but "];

const GREETINGS: &[&str] = &["hello", "hi", "hey", "good morning", "good evening", "greetings"];

const HELP_PHRASES: &[&str] = &["help", "what can you do", "how do you work", "commands"];

/// Classify a chat message
pub fn classify(message: &str) -> Intent {
    let message = message.trim();
    if message.is_empty() {
        return Intent::Unknown;
    }
    let words = normalize(message);

    if let Some(title) = extract_title(message) {
        return Intent::TitleLookup { title };
    }
    if let Some(actor) = extract_after(message, ACTOR_PREFIXES) {
        return Intent::ActorRequest { actor };
    }
    if let Some(mood) = Mood::ALL
        .into_iter()
        .find(|mood| mood.keywords().iter().any(|k| contains_phrase(&words, k)))
    {
        return Intent::MoodRequest {
            mood,
            genres: to_owned(mood.genres()),
        };
    }
    if let Some((name, _, genres)) = GENRE_TABLE
        .iter()
        .find(|(_, keywords, _)| keywords.iter().any(|k| contains_phrase(&words, k)))
    {
        return Intent::GenreRequest {
            genre: name.to_string(),
            genres: to_owned(genres),
        };
    }
    Intent::Unknown
}

pub fn is_greeting(message: &str) -> bool {
    let words = normalize(message);
    GREETINGS.iter().any(|g| contains_phrase(&words, g))
}

pub fn is_help_request(message: &str) -> bool {
    let words = normalize(message);
    HELP_PHRASES.iter().any(|p| contains_phrase(&words, p))
}

/// Names of the genre keywords the classifier understands
pub fn known_genres() -> impl Iterator<Item = &'static str> {
    GENRE_TABLE.iter().map(|(name, _, _)| *name)
}

/// Lowercase words joined by single spaces, padded so phrase matches can
/// anchor on word boundaries. Hyphens are kept inside words ("sci-fi").
fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split_word_bounds()
        .filter(|w| w.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" ").replace(" - ", "-"))
}

fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    normalized.contains(&format!(" {} ", phrase))
}

fn extract_title(message: &str) -> Option<String> {
    let title = extract_after(message, TITLE_PREFIXES).or_else(|| {
        // "recommend ... like X"
        let lower = message.to_ascii_lowercase();
        let start = lower.find("recommend")?;
        let like = lower[start..].find(" like ")? + start + " like ".len();
        clean_entity(&message[like..])
    })?;
    cut_trailing_clause(&title)
}

/// Text following the first word-initial occurrence of any prefix that has
/// something after it, original casing kept
fn extract_after(message: &str, prefixes: &[&str]) -> Option<String> {
    let lower = message.to_ascii_lowercase();
    prefixes.iter().find_map(|prefix| {
        lower
            .match_indices(prefix)
            .filter(|(at, _)| *at == 0 || lower[..*at].ends_with(' '))
            .find_map(|(at, _)| clean_entity(&message[at + prefix.len()..]))
    })
}

fn cut_trailing_clause(title: &str) -> Option<String> {
    let lower = title.to_ascii_lowercase();
    let end = TITLE_TERMINATORS
        .iter()
        .filter_map(|t| lower.find(t))
        .min()
        .unwrap_or(title.len());
    clean_entity(&title[..end])
}

fn clean_entity(raw: &str) -> Option<String> {
    let entity = raw
        .trim()
        .trim_end_matches(['?', '!', '.', ','])
        .trim()
        .trim_matches(['"', '\''])
        .trim();
    (!entity.is_empty()).then(|| entity.to_string())
}

fn to_owned(genres: &[&str]) -> Vec<String> {
    genres.iter().map(|g| g.to_string()).collect()
}
