//! # Preferences Crate
//!
//! Per-user ratings, watchlist, viewing history and explicit preferences,
//! persisted as JSON documents under a root directory.
//!
//! ```ignore
//! use preferences::PreferenceStore;
//!
//! let store = PreferenceStore::open("user_data")?;
//! store.rate("alice", 19995, "Avatar", 8.0)?;
//! store.add_to_watchlist("alice", 155, "The Dark Knight")?;
//!
//! let profile = store.get_profile("alice")?;
//! let taste = preferences::taste::taste_summary(&profile, &index, 5);
//! ```

pub mod error;
pub mod store;
pub mod taste;
pub mod types;

pub use error::{PreferenceError, Result};
pub use store::{DEFAULT_HISTORY_CAP, PreferenceStore};
pub use taste::{GenreAffinity, TasteSummary};
pub use types::{
    HistoryEntry, Preferences, PreferencesUpdate, RatingEntry, UserExport, UserProfile, UserStats,
    WatchlistEntry,
};
