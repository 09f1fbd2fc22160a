//! Recommender configuration, loaded from an optional JSON file.

use anyhow::{Context, Result, bail};
use preferences::DEFAULT_HISTORY_CAP;
use serde::{Deserialize, Serialize};
use similarity::FeatureConfig;
use sources::HybridWeights;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Tunables for every recommendation path. Every field has a default, so a
/// config file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Blend weights for the hybrid and personalized strategies
    pub hybrid_weights: HybridWeights,

    /// Feature builder settings; changing them invalidates cached matrices
    pub features: FeatureConfig,

    /// Results per request when the caller doesn't ask for a count
    pub default_top_k: usize,

    /// Results per chat reply
    pub chat_results: usize,

    /// Ratings at or above this seed personalized recommendations
    pub high_rating_threshold: f32,

    /// Viewing history entries kept per user
    pub history_cap: usize,

    /// Personalized results need at least this many votes
    pub min_vote_count: u32,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            hybrid_weights: HybridWeights::default(),
            features: FeatureConfig::default(),
            default_top_k: 10,
            chat_results: 4,
            high_rating_threshold: 7.0,
            history_cap: DEFAULT_HISTORY_CAP,
            min_vote_count: 50,
        }
    }
}

impl RecommenderConfig {
    /// Load from `path`. No path, or a path that doesn't exist, gives the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_top_k == 0 {
            bail!("default_top_k must be at least 1");
        }
        if self.chat_results == 0 {
            bail!("chat_results must be at least 1");
        }
        if !(1.0..=10.0).contains(&self.high_rating_threshold) {
            bail!(
                "high_rating_threshold must be between 1 and 10, got {}",
                self.high_rating_threshold
            );
        }
        if self.history_cap == 0 {
            bail!("history_cap must be at least 1");
        }
        if self.features.max_features == 0 {
            bail!("features.max_features must be at least 1");
        }
        if self.min_vote_count == 0 {
            bail!("min_vote_count must be at least 1");
        }

        let w = &self.hybrid_weights;
        let weights = [
            ("content", w.content),
            ("cast", w.cast),
            ("production", w.production),
            ("popularity", w.popularity),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                bail!("hybrid_weights.{} must be a non-negative number, got {}", name, weight);
            }
        }
        if weights.iter().all(|(_, weight)| *weight == 0.0) {
            bail!("hybrid_weights must not all be zero");
        }
        Ok(())
    }
}
