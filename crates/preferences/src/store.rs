//! File-backed preference store.
//!
//! Layout: `<root>/<user_id>/{ratings,watchlist,history,preferences}.json`.
//! Each mutation rewrites only the document it touches, via a temp file and
//! `rename`, so a crash never leaves a half-written document behind. There is
//! no locking: one process, one request at a time.

use crate::error::{PreferenceError, Result};
use crate::taste;
use crate::types::*;
use chrono::Utc;
use data_loader::{DataIndex, MovieId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const RATINGS_FILE: &str = "ratings.json";
const WATCHLIST_FILE: &str = "watchlist.json";
const HISTORY_FILE: &str = "history.json";
const PREFERENCES_FILE: &str = "preferences.json";

/// Default number of viewing-history entries kept per user
pub const DEFAULT_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    root: PathBuf,
    history_cap: usize,
}

impl PreferenceStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| PreferenceError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            history_cap: DEFAULT_HISTORY_CAP,
        })
    }

    /// Builder: set the per-user history cap (at least 1)
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_exists(&self, user_id: &str) -> Result<bool> {
        validate_user_id(user_id)?;
        Ok(self.user_dir(user_id).is_dir())
    }

    /// Read a stored profile. Unknown users are `UserNotFound`.
    pub fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        if !self.user_exists(user_id)? {
            return Err(PreferenceError::UserNotFound(user_id.to_string()));
        }
        self.read_profile(user_id)
    }

    /// Read a profile, treating an unknown user as an empty one
    pub fn profile_or_default(&self, user_id: &str) -> Result<UserProfile> {
        if !self.user_exists(user_id)? {
            return Ok(UserProfile::new(user_id));
        }
        self.read_profile(user_id)
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Add or replace a rating (1-10)
    pub fn rate(&self, user_id: &str, movie_id: MovieId, title: &str, rating: f32) -> Result<()> {
        validate_user_id(user_id)?;
        validate_rating(rating)?;

        let mut ratings: BTreeMap<MovieId, RatingEntry> = self.read_doc(user_id, RATINGS_FILE)?;
        ratings.insert(
            movie_id,
            RatingEntry {
                rating,
                title: title.to_string(),
                rated_at: Utc::now(),
            },
        );
        self.write_doc(user_id, RATINGS_FILE, &ratings)?;
        info!(user_id, movie_id, rating, "Rated {}", title);
        Ok(())
    }

    /// Remove a rating. Returns whether one existed.
    pub fn remove_rating(&self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        if !self.user_exists(user_id)? {
            return Ok(false);
        }
        let mut ratings: BTreeMap<MovieId, RatingEntry> = self.read_doc(user_id, RATINGS_FILE)?;
        if ratings.remove(&movie_id).is_none() {
            return Ok(false);
        }
        self.write_doc(user_id, RATINGS_FILE, &ratings)?;
        Ok(true)
    }

    // =========================================================================
    // Watchlist
    // =========================================================================

    /// Add to the watchlist. Returns false if the movie was already on it.
    pub fn add_to_watchlist(&self, user_id: &str, movie_id: MovieId, title: &str) -> Result<bool> {
        validate_user_id(user_id)?;

        let mut watchlist: Vec<WatchlistEntry> = self.read_doc(user_id, WATCHLIST_FILE)?;
        if watchlist.iter().any(|w| w.movie_id == movie_id) {
            return Ok(false);
        }
        watchlist.push(WatchlistEntry {
            movie_id,
            title: title.to_string(),
            added_at: Utc::now(),
        });
        self.write_doc(user_id, WATCHLIST_FILE, &watchlist)?;
        info!(user_id, movie_id, "Added {} to watchlist", title);
        Ok(true)
    }

    /// Remove from the watchlist. Removing an absent entry is a no-op returning false.
    pub fn remove_from_watchlist(&self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        if !self.user_exists(user_id)? {
            return Ok(false);
        }
        let mut watchlist: Vec<WatchlistEntry> = self.read_doc(user_id, WATCHLIST_FILE)?;
        let before = watchlist.len();
        watchlist.retain(|w| w.movie_id != movie_id);
        if watchlist.len() == before {
            return Ok(false);
        }
        self.write_doc(user_id, WATCHLIST_FILE, &watchlist)?;
        Ok(true)
    }

    // =========================================================================
    // Viewing history
    // =========================================================================

    /// Append a viewing. A re-viewed movie moves to the end; the oldest
    /// entries beyond the history cap are dropped.
    pub fn mark_viewed(&self, user_id: &str, movie_id: MovieId, title: &str) -> Result<()> {
        validate_user_id(user_id)?;

        let mut history: Vec<HistoryEntry> = self.read_doc(user_id, HISTORY_FILE)?;
        history.retain(|h| h.movie_id != movie_id);
        history.push(HistoryEntry {
            movie_id,
            title: title.to_string(),
            viewed_at: Utc::now(),
        });
        if history.len() > self.history_cap {
            let excess = history.len() - self.history_cap;
            history.drain(..excess);
            debug!(user_id, "Trimmed {} old history entries", excess);
        }
        self.write_doc(user_id, HISTORY_FILE, &history)
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Merge an update into stored preferences and return the result
    pub fn update_preferences(&self, user_id: &str, update: PreferencesUpdate) -> Result<Preferences> {
        validate_user_id(user_id)?;

        let mut prefs: Preferences = self.read_doc(user_id, PREFERENCES_FILE)?;
        if let Some(genres) = update.favorite_genres {
            prefs.favorite_genres = genres
                .into_iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect();
        }
        if let Some(popular) = update.prefer_popular {
            prefs.prefer_popular = popular;
        }
        if let Some(cast) = update.prefer_familiar_cast {
            prefs.prefer_familiar_cast = cast;
        }
        prefs.updated_at = Some(Utc::now());

        self.write_doc(user_id, PREFERENCES_FILE, &prefs)?;
        Ok(prefs)
    }

    // =========================================================================
    // Whole-user operations
    // =========================================================================

    /// Delete every document for a user. Returns whether the user existed.
    pub fn clear_user(&self, user_id: &str) -> Result<bool> {
        if !self.user_exists(user_id)? {
            return Ok(false);
        }
        let dir = self.user_dir(user_id);
        fs::remove_dir_all(&dir).map_err(|source| PreferenceError::Io { path: dir, source })?;
        info!(user_id, "Cleared all user data");
        Ok(true)
    }

    /// Profile plus derived statistics as pretty-printed JSON
    pub fn export(&self, user_id: &str, index: &DataIndex) -> Result<String> {
        let profile = self.get_profile(user_id)?;
        let export = UserExport {
            stats: taste::user_stats(&profile, index),
            profile: &profile,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    // =========================================================================
    // Document I/O
    // =========================================================================

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(user_id)
    }

    fn read_profile(&self, user_id: &str) -> Result<UserProfile> {
        Ok(UserProfile {
            user_id: user_id.to_string(),
            ratings: self.read_doc(user_id, RATINGS_FILE)?,
            watchlist: self.read_doc(user_id, WATCHLIST_FILE)?,
            history: self.read_doc(user_id, HISTORY_FILE)?,
            preferences: self.read_doc(user_id, PREFERENCES_FILE)?,
        })
    }

    /// Read one document; a missing file is the empty document
    fn read_doc<T: DeserializeOwned + Default>(&self, user_id: &str, file: &str) -> Result<T> {
        let path = self.user_dir(user_id).join(file);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| PreferenceError::Corrupt { path, source })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(source) => Err(PreferenceError::Io { path, source }),
        }
    }

    /// Replace one document atomically
    fn write_doc<T: Serialize>(&self, user_id: &str, file: &str, value: &T) -> Result<()> {
        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir).map_err(|source| PreferenceError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(file);
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(value)?;

        fs::write(&tmp, contents).map_err(|source| PreferenceError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| PreferenceError::Io { path, source })
    }
}
