//! Error types surfaced by the discovery service.
//!
//! Only three outcomes reach callers. Provider failures, cache failures and
//! per-entry normalization errors are recovered inside the service.

use thiserror::Error;

/// Errors returned by [`super::DiscoveryService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The request itself is invalid (e.g. blank topic or query).
    #[error("bad request: {reason}")]
    BadRequest {
        /// What was wrong with the request.
        reason: String,
    },

    /// The topic is not part of the user's active learning plans.
    ///
    /// Deliberately carries no detail: an unknown topic and a topic the user
    /// may not see are indistinguishable.
    #[error("topic is not available for this user")]
    Forbidden,

    /// No live results could be fetched and nothing was cached.
    #[error("video discovery is unavailable: {reason}\n  Suggestion: Retry in a few minutes")]
    Unavailable {
        /// Internal cause, for logs only.
        reason: String,
    },
}

impl DiscoveryError {
    /// Creates a `BadRequest` error.
    #[must_use]
    pub fn bad_request(reason: &str) -> Self {
        Self::BadRequest {
            reason: reason.to_string(),
        }
    }

    /// Creates an `Unavailable` error.
    #[must_use]
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            reason: reason.to_string(),
        }
    }

    /// HTTP-equivalent status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::Forbidden => 403,
            Self::Unavailable { .. } => 503,
        }
    }

    /// Generic message safe to show to an end user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "The request was invalid.",
            Self::Forbidden => "This topic is not available for your learning plan.",
            Self::Unavailable { .. } => {
                "Video suggestions are temporarily unavailable. Please try again shortly."
            }
        }
    }
}
