//! Course topic gate: a user may only query topics from their active plans.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::plans::{PlanError, PlanSource};

use super::normalizer::{normalize_topic, normalize_topics};

/// Authorizes topic queries against the user's active learning plans.
///
/// The allowed set is recomputed on every check; plans change rarely and the
/// read is cheap next to a provider round trip.
#[derive(Clone)]
pub struct CourseTopicGate {
    plans: Arc<dyn PlanSource>,
}

impl CourseTopicGate {
    /// Creates a gate reading plans from `plans`.
    #[must_use]
    pub fn new(plans: Arc<dyn PlanSource>) -> Self {
        Self { plans }
    }

    /// Normalized subjects, module names and module topics of every active plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the plan source cannot be read.
    #[instrument(skip(self))]
    pub async fn allowed_topics(&self, user_id: &str) -> Result<BTreeSet<String>, PlanError> {
        let plans = self.plans.active_plans(user_id).await?;
        let allowed = normalize_topics(plans.iter().flat_map(|plan| plan.topic_strings()));
        debug!(
            plans = plans.len(),
            allowed = allowed.len(),
            "Computed allowed topic set"
        );
        Ok(allowed)
    }

    /// Returns true if `topic` matches the user's allowed set.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the plan source cannot be read.
    #[instrument(skip(self))]
    pub async fn authorize(&self, user_id: &str, topic: &str) -> Result<bool, PlanError> {
        let normalized = normalize_topic(topic);
        if normalized.is_empty() {
            return Ok(false);
        }
        let allowed = self.allowed_topics(user_id).await?;
        Ok(is_allowed(&allowed, &normalized))
    }
}

impl std::fmt::Debug for CourseTopicGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseTopicGate").finish_non_exhaustive()
    }
}

/// Matching rule for an already-normalized topic.
///
/// Allowed when the topic is an exact member, a substring of a member, or a
/// superstring of a member. Empty topics and empty members never match.
#[must_use]
pub fn is_allowed(allowed: &BTreeSet<String>, normalized_topic: &str) -> bool {
    if normalized_topic.is_empty() {
        return false;
    }
    if allowed.contains(normalized_topic) {
        return true;
    }
    allowed.iter().filter(|entry| !entry.is_empty()).any(|entry| {
        entry.contains(normalized_topic) || normalized_topic.contains(entry.as_str())
    })
}
