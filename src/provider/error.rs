//! Error types for provider calls and the fallback chain.
//!
//! Individual provider failures are always recovered by the orchestrator
//! (logged, next provider tried). Only the two chain-level variants reach
//! callers of [`super::FallbackOrchestrator::search`].

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while querying video search providers.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The call did not complete within its time box.
    #[error("{provider} did not respond within {}s", timeout.as_secs())]
    Timeout {
        /// Provider name (e.g. "piped:https://pipedapi.kavin.rocks").
        provider: String,
        /// The per-call bound that elapsed.
        timeout: Duration,
    },

    /// The request could not be sent or the body could not be read.
    #[error("{provider} request failed: {reason}")]
    Network {
        /// Provider name.
        provider: String,
        /// Transport error text.
        reason: String,
    },

    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}")]
    HttpStatus {
        /// Provider name.
        provider: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body was not JSON, or not the JSON shape this provider produces.
    #[error("{provider} returned an unreadable payload: {reason}")]
    Malformed {
        /// Provider name.
        provider: String,
        /// What was wrong with the payload.
        reason: String,
    },

    /// The provider returned a successful status with an embedded error object.
    #[error("{provider} reported an upstream error: {message}")]
    Upstream {
        /// Provider name.
        provider: String,
        /// Error message extracted from the payload.
        message: String,
    },

    /// The HTTP client for a provider could not be built.
    #[error("{provider} HTTP client construction failed: {reason}")]
    ClientSetup {
        /// Provider name.
        provider: String,
        /// Builder error text.
        reason: String,
    },

    /// Every configured provider failed or returned nothing.
    #[error(
        "all video providers failed: tried {tried} provider(s)\n  Suggestion: Check network access and mirror configuration, then retry"
    )]
    AllProvidersFailed {
        /// Number of providers attempted.
        tried: usize,
    },

    /// The aggregate deadline elapsed before any provider produced results.
    #[error(
        "video search exceeded its {}ms deadline after {tried} provider(s)\n  Suggestion: Retry later or raise the fallback deadline",
        deadline.as_millis()
    )]
    DeadlineExceeded {
        /// Number of providers attempted (including the interrupted one).
        tried: usize,
        /// The aggregate bound that elapsed.
        deadline: Duration,
    },
}

impl ProviderError {
    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(provider: &str, timeout: Duration) -> Self {
        Self::Timeout {
            provider: provider.to_string(),
            timeout,
        }
    }

    /// Creates a `Network` error.
    #[must_use]
    pub fn network(provider: &str, reason: &str) -> Self {
        Self::Network {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `HttpStatus` error.
    #[must_use]
    pub fn http_status(provider: &str, status: u16) -> Self {
        Self::HttpStatus {
            provider: provider.to_string(),
            status,
        }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(provider: &str, reason: &str) -> Self {
        Self::Malformed {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `Upstream` error.
    #[must_use]
    pub fn upstream(provider: &str, message: &str) -> Self {
        Self::Upstream {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a `ClientSetup` error.
    #[must_use]
    pub fn client_setup(provider: &str, reason: &str) -> Self {
        Self::ClientSetup {
            provider: provider.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the chain-level outcomes that mean "no live results at all".
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            Self::AllProvidersFailed { .. } | Self::DeadlineExceeded { .. }
        )
    }
}

/// Why a single raw entry could not become a [`crate::video::VideoItem`].
///
/// Normalization errors drop that one entry; they never fail a provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The entry is a channel, playlist or other non-video entity.
    #[error("entry is not a video (kind: {kind})")]
    NotAVideo {
        /// The kind/type tag reported by the provider.
        kind: String,
    },

    /// No video id could be found in any known field.
    #[error("entry has no video id")]
    MissingId,

    /// The entry does not have the shape this provider uses.
    #[error("malformed entry: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_includes_seconds() {
        let err = ProviderError::timeout("official", Duration::from_secs(15));
        assert_eq!(err.to_string(), "official did not respond within 15s");
    }

    #[test]
    fn test_chain_errors_carry_suggestion() {
        let all = ProviderError::AllProvidersFailed { tried: 4 };
        assert!(all.to_string().contains("tried 4"));
        assert!(all.to_string().contains("Suggestion"));

        let deadline = ProviderError::DeadlineExceeded {
            tried: 2,
            deadline: Duration::from_millis(1500),
        };
        assert!(deadline.to_string().contains("1500ms"));
    }

    #[test]
    fn test_is_exhausted_only_for_chain_errors() {
        assert!(ProviderError::AllProvidersFailed { tried: 1 }.is_exhausted());
        assert!(
            ProviderError::DeadlineExceeded {
                tried: 1,
                deadline: Duration::from_secs(1),
            }
            .is_exhausted()
        );
        assert!(!ProviderError::http_status("piped", 502).is_exhausted());
        assert!(!ProviderError::upstream("invidious", "blocked").is_exhausted());
    }

    #[test]
    fn test_normalize_error_display() {
        let err = NormalizeError::NotAVideo {
            kind: "youtube#channel".to_string(),
        };
        assert_eq!(err.to_string(), "entry is not a video (kind: youtube#channel)");
        assert_eq!(NormalizeError::MissingId.to_string(), "entry has no video id");
    }
}
