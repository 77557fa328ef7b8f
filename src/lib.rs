//! Topic Discovery Core Library
//!
//! This library finds short educational videos for the topics of a learner's
//! active learning plans. Searches go to the official video API first and
//! fall back to public mirror front-ends; results are filtered for relevance
//! and cached per topic in SQLite.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - Database connection and schema management
//! - [`config`] - Provider endpoints, timeouts and cache policy
//! - [`video`] - Provider-agnostic video shape, duration parsing, relevance filter
//! - [`provider`] - Provider clients, response normalization and tiered fallback
//! - [`topic`] - Topic normalization and the course topic gate
//! - [`plans`] - Learning plan storage and the read seam used by the gate
//! - [`cache`] - Per-topic video cache with freshness policy
//! - [`discovery`] - The suggestion service composing all of the above

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod db;
pub mod discovery;
pub mod plans;
pub mod provider;
#[cfg(test)]
pub mod test_support;
pub mod topic;
pub(crate) mod user_agent;
pub mod video;

// Re-export commonly used types
pub use cache::{CacheError, CacheRecord, TopicCache, UpsertReport};
pub use config::{CachePolicy, ConfigError, DiscoveryConfig};
pub use db::{Database, DatabaseOptions, DbError, DbErrorKind};
pub use discovery::{DiscoveryError, DiscoveryService, TopicSuggestions};
pub use plans::{
    LearningPlan, NewLearningPlan, PlanError, PlanModule, PlanSource, PlanStatus, PlanStore,
};
pub use provider::{
    DurationBucket, FallbackOrchestrator, InvidiousProvider, OfficialApiProvider, PipedProvider,
    ProviderError, ProviderHit, ProviderTier, SearchOptions, SearchOrder, VideoProvider,
    build_default_orchestrator,
};
pub use topic::{CourseTopicGate, normalize_topic};
pub use video::VideoItem;
