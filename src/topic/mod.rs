//! Topic canonicalization and per-user topic authorization.
//!
//! - [`normalize_topic`] canonicalizes free text for cache keys and comparisons
//! - [`CourseTopicGate`] derives a user's allowed topics from their active plans

mod gate;
mod normalizer;

pub use gate::{CourseTopicGate, is_allowed};
pub use normalizer::{normalize_topic, normalize_topics};
