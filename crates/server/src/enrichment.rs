//! Optional display metadata (poster art) from an external service.
//!
//! Enrichment fails soft: the first provider error is logged and turns
//! enrichment off for the rest of the process. Recommendations never depend
//! on it.

use data_loader::Movie;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExternalServiceError {
    #[error("Metadata service unavailable: {0}")]
    Unavailable(String),

    #[error("Metadata service timed out")]
    Timeout,

    #[error("Invalid response from metadata service: {0}")]
    InvalidResponse(String),
}

/// Source of display metadata for a movie
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Poster URL for `movie`, `Ok(None)` if the service has none
    fn poster_url(&self, movie: &Movie) -> Result<Option<String>, ExternalServiceError>;
}

/// Provider used when no metadata service is configured
pub struct OfflineProvider;

impl MetadataProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn poster_url(&self, _movie: &Movie) -> Result<Option<String>, ExternalServiceError> {
        Ok(None)
    }
}

/// Wraps a provider and switches it off after its first failure
pub struct Enrichment {
    provider: Box<dyn MetadataProvider>,
    enabled: AtomicBool,
}

impl Enrichment {
    pub fn new(provider: Box<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn offline() -> Self {
        Self::new(Box::new(OfflineProvider))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Poster URL, or `None` when disabled or the lookup fails
    pub fn poster_url(&self, movie: &Movie) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        match self.provider.poster_url(movie) {
            Ok(url) => url,
            Err(e) => {
                if self.enabled.swap(false, Ordering::Relaxed) {
                    warn!(
                        "Metadata provider {} failed, continuing offline: {}",
                        self.provider.name(),
                        e
                    );
                } else {
                    debug!("Metadata provider already disabled: {}", e);
                }
                None
            }
        }
    }
}

impl Default for Enrichment {
    fn default() -> Self {
        Self::offline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    struct FlakyProvider {
        calls: Arc<AtomicUsize>,
    }

    impl MetadataProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn poster_url(&self, _movie: &Movie) -> Result<Option<String>, ExternalServiceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(ExternalServiceError::Timeout)
        }
    }

    struct FixedProvider;

    impl MetadataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn poster_url(&self, movie: &Movie) -> Result<Option<String>, ExternalServiceError> {
            Ok(Some(format!("https://img.example/{}.jpg", movie.id)))
        }
    }

    #[test]
    fn test_offline_has_no_posters() {
        let enrichment = Enrichment::offline();
        assert_eq!(enrichment.poster_url(&Movie::new(1, "Avatar")), None);
        assert!(enrichment.is_enabled());
        assert_eq!(enrichment.provider_name(), "offline");
    }

    #[test]
    fn test_provider_urls_pass_through() {
        let enrichment = Enrichment::new(Box::new(FixedProvider));
        assert_eq!(
            enrichment.poster_url(&Movie::new(7, "Seven")).as_deref(),
            Some("https://img.example/7.jpg")
        );
    }

    #[test]
    fn test_failure_disables_enrichment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let enrichment = Enrichment::new(Box::new(FlakyProvider {
            calls: calls.clone(),
        }));

        let movie = Movie::new(1, "Avatar");
        assert_eq!(enrichment.poster_url(&movie), None);
        assert!(!enrichment.is_enabled());

        // Not asked again once disabled
        assert_eq!(enrichment.poster_url(&movie), None);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
