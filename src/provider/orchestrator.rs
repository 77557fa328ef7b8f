//! Tier-ordered fallback over video providers.
//!
//! The [`FallbackOrchestrator`] holds every configured provider and runs the
//! fallback loop: providers are tried one at a time, and the first one that
//! yields at least one video wins. Results are never merged across providers.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::video::VideoItem;

use super::{ProviderError, ProviderTier, SearchOptions, VideoProvider};

/// The winning provider and the videos it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderHit {
    /// Name of the provider that answered.
    pub provider: String,
    /// Its tier, recorded as the cache `source`.
    pub tier: ProviderTier,
    /// Normalized, non-empty result list.
    pub videos: Vec<VideoItem>,
}

/// A tier-ordered collection of providers with the fallback loop.
///
/// Providers are tried in tier order (Official, then Piped, then Invidious).
/// Within one tier, registration order is preserved.
pub struct FallbackOrchestrator {
    providers: Vec<Box<dyn VideoProvider>>,
    deadline: Option<Duration>,
}

impl FallbackOrchestrator {
    /// Creates an empty orchestrator with no aggregate deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            deadline: None,
        }
    }

    /// Sets the aggregate deadline applied by [`Self::search`].
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// The aggregate deadline applied by [`Self::search`], if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Registers a provider.
    #[tracing::instrument(skip(self, provider), fields(provider_name))]
    pub fn register(&mut self, provider: Box<dyn VideoProvider>) {
        tracing::Span::current().record("provider_name", provider.name());
        debug!(
            name = provider.name(),
            tier = %provider.tier(),
            "Registering video provider"
        );
        self.providers.push(provider);
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no providers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers in the order the fallback loop tries them.
    #[must_use]
    pub fn ordered(&self) -> Vec<&dyn VideoProvider> {
        let mut providers: Vec<&dyn VideoProvider> =
            self.providers.iter().map(AsRef::as_ref).collect();
        // Stable: keeps registration order within a tier.
        providers.sort_by_key(|p| p.tier());
        providers
    }

    /// Runs the fallback loop using the configured deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::AllProvidersFailed`] if every provider failed
    /// or returned nothing, or [`ProviderError::DeadlineExceeded`] if the
    /// aggregate deadline elapsed first.
    pub async fn search(
        &self,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<ProviderHit, ProviderError> {
        self.search_with_deadline(query, opts, self.deadline).await
    }

    /// Runs the fallback loop with an explicit aggregate deadline.
    ///
    /// Each provider is tried at most once. A provider that errors or yields
    /// zero videos hands over to the next; the first non-empty result is
    /// returned as-is. An empty official result counts as a failure, so the
    /// mirrors are still tried.
    ///
    /// # Errors
    ///
    /// See [`Self::search`].
    #[tracing::instrument(skip(self, opts), fields(max_results = opts.max_results))]
    pub async fn search_with_deadline(
        &self,
        query: &str,
        opts: &SearchOptions,
        deadline: Option<Duration>,
    ) -> Result<ProviderHit, ProviderError> {
        let started = Instant::now();
        let providers = self.ordered();
        let mut tried: usize = 0;

        for provider in providers {
            let remaining = deadline.map(|limit| limit.saturating_sub(started.elapsed()));
            if let (Some(limit), Some(budget)) = (deadline, remaining)
                && budget.is_zero()
            {
                warn!(tried, "Fallback deadline elapsed before next provider");
                return Err(ProviderError::DeadlineExceeded {
                    tried,
                    deadline: limit,
                });
            }

            tried += 1;
            debug!(provider = provider.name(), tier = %provider.tier(), "Trying provider");

            let outcome = match (deadline, remaining) {
                (Some(limit), Some(budget)) => {
                    match tokio::time::timeout(budget, provider.search(query, opts)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!(
                                provider = provider.name(),
                                tried, "Fallback deadline elapsed during provider call"
                            );
                            return Err(ProviderError::DeadlineExceeded {
                                tried,
                                deadline: limit,
                            });
                        }
                    }
                }
                _ => provider.search(query, opts).await,
            };

            match outcome {
                Ok(videos) if !videos.is_empty() => {
                    info!(
                        provider = provider.name(),
                        tier = %provider.tier(),
                        count = videos.len(),
                        "Provider returned videos"
                    );
                    return Ok(ProviderHit {
                        provider: provider.name().to_string(),
                        tier: provider.tier(),
                        videos,
                    });
                }
                Ok(_) => {
                    debug!(provider = provider.name(), "Provider returned no videos, trying next");
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Provider failed, trying next"
                    );
                }
            }
        }

        Err(ProviderError::AllProvidersFailed { tried })
    }
}

impl std::fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("FallbackOrchestrator")
            .field("provider_count", &self.providers.len())
            .field("providers", &names)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl Default for FallbackOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
