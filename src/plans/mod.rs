//! Learning plans: the collaborator that decides which topics a user may query.
//!
//! Plans are owned by the wider platform. This module defines the read seam
//! ([`PlanSource`]) the topic gate depends on, plus a SQLite-backed
//! [`PlanStore`] so the engine runs standalone.
//!
//! # Example
//!
//! ```ignore
//! use discovery_core::plans::{NewLearningPlan, PlanModule, PlanSource, PlanStore};
//!
//! let store = PlanStore::new(db);
//! store.insert_plan(&NewLearningPlan {
//!     user_id: "learner-1".into(),
//!     subject: "Python".into(),
//!     status: PlanStatus::Active,
//!     modules: vec![PlanModule::new("Basics", ["variables", "loops"])],
//! }).await?;
//! let plans = store.active_plans("learner-1").await?;
//! ```

mod error;

pub use error::PlanError;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row};
use tracing::{debug, instrument};

use crate::db::Database;

/// Result type for plan operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Lifecycle state of a learning plan. Only `Active` plans grant topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Archived,
}

impl PlanStatus {
    /// Returns the database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid plan status: {s}")),
        }
    }
}

/// One module of a learning plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanModule {
    pub name: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl PlanModule {
    /// Builds a module from a name and its topic strings.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }
}

/// A stored learning plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningPlan {
    pub id: i64,
    pub user_id: String,
    pub subject: String,
    pub status: PlanStatus,
    pub modules: Vec<PlanModule>,
}

impl LearningPlan {
    /// Every raw topic string this plan contributes: subject, module names,
    /// and module topics.
    pub fn topic_strings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.subject.as_str()).chain(self.modules.iter().flat_map(|module| {
            std::iter::once(module.name.as_str()).chain(module.topics.iter().map(String::as_str))
        }))
    }
}

/// A plan submitted for storage (import format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLearningPlan {
    pub user_id: String,
    pub subject: String,
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default)]
    pub modules: Vec<PlanModule>,
}

/// Read seam for learning plans.
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Returns the user's plans whose status is `active`.
    async fn active_plans(&self, user_id: &str) -> Result<Vec<LearningPlan>>;
}

#[derive(Debug, FromRow)]
struct PlanRow {
    id: i64,
    user_id: String,
    subject: String,
    status: String,
    modules: String,
}

impl PlanRow {
    fn into_plan(self) -> Result<LearningPlan> {
        let modules: Vec<PlanModule> =
            serde_json::from_str(&self.modules).map_err(|e| PlanError::CorruptModules {
                plan_id: self.id,
                reason: e.to_string(),
            })?;
        Ok(LearningPlan {
            id: self.id,
            user_id: self.user_id,
            subject: self.subject,
            // CHECK constraint keeps this valid; fall back rather than fail a read
            status: self.status.parse().unwrap_or(PlanStatus::Archived),
            modules,
        })
    }
}

/// SQLite-backed plan storage.
#[derive(Debug, Clone)]
pub struct PlanStore {
    db: Database,
}

impl PlanStore {
    /// Creates a plan store over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stores a new plan and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Invalid`] for a blank user id or subject, or
    /// [`PlanError::Database`] if the insert fails.
    #[instrument(skip(self, plan), fields(user_id = %plan.user_id, subject = %plan.subject))]
    pub async fn insert_plan(&self, plan: &NewLearningPlan) -> Result<i64> {
        if plan.user_id.trim().is_empty() {
            return Err(PlanError::invalid("user id must not be blank"));
        }
        if plan.subject.trim().is_empty() {
            return Err(PlanError::invalid("subject must not be blank"));
        }
        let modules = serde_json::to_string(&plan.modules)
            .map_err(|e| PlanError::invalid(&format!("modules cannot be encoded: {e}")))?;

        let row = sqlx::query(
            r"INSERT INTO learning_plans (user_id, subject, status, modules)
              VALUES (?, ?, ?, ?)
              RETURNING id",
        )
        .bind(&plan.user_id)
        .bind(&plan.subject)
        .bind(plan.status.as_str())
        .bind(modules)
        .fetch_one(self.db.pool())
        .await?;

        let id: i64 = row.get("id");
        debug!(plan_id = id, "Stored learning plan");
        Ok(id)
    }

    /// Changes the status of an existing plan. Returns false if no plan matched.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Database`] if the update fails.
    #[instrument(skip(self))]
    pub async fn set_status(&self, plan_id: i64, status: PlanStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE learning_plans SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(plan_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PlanSource for PlanStore {
    #[instrument(skip(self))]
    async fn active_plans(&self, user_id: &str) -> Result<Vec<LearningPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r"SELECT id, user_id, subject, status, modules
              FROM learning_plans
              WHERE user_id = ? AND status = ?
              ORDER BY id ASC",
        )
        .bind(user_id)
        .bind(PlanStatus::Active.as_str())
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(PlanRow::into_plan).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn python_plan(user: &str) -> NewLearningPlan {
        NewLearningPlan {
            user_id: user.to_string(),
            subject: "Python".to_string(),
            status: PlanStatus::Active,
            modules: vec![PlanModule::new("Basics", ["variables", "control flow"])],
        }
    }

    #[test]
    fn test_plan_status_round_trip_strings() {
        for status in [
            PlanStatus::Active,
            PlanStatus::Paused,
            PlanStatus::Completed,
            PlanStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<PlanStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<PlanStatus>().is_err());
    }

    #[test]
    fn test_topic_strings_lists_subject_modules_and_topics() {
        let plan = LearningPlan {
            id: 1,
            user_id: "u".to_string(),
            subject: "Python".to_string(),
            status: PlanStatus::Active,
            modules: vec![
                PlanModule::new("Basics", ["variables"]),
                PlanModule::new("Web", Vec::<String>::new()),
            ],
        };
        let strings: Vec<&str> = plan.topic_strings().collect();
        assert_eq!(strings, vec!["Python", "Basics", "variables", "Web"]);
    }

    #[test]
    fn test_new_plan_import_format_defaults() {
        let plan: NewLearningPlan =
            serde_json::from_str(r#"{"userId": "u1", "subject": "Rust"}"#).unwrap();
        assert_eq!(plan.status, PlanStatus::Active);
        assert!(plan.modules.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_read_active_plans() {
        let store = PlanStore::new(Database::new_in_memory().await.unwrap());
        store.insert_plan(&python_plan("u1")).await.unwrap();
        store.insert_plan(&python_plan("u2")).await.unwrap();

        let plans = store.active_plans("u1").await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].subject, "Python");
        assert_eq!(plans[0].modules[0].topics, vec!["variables", "control flow"]);
    }

    #[tokio::test]
    async fn test_inactive_plans_are_not_returned() {
        let store = PlanStore::new(Database::new_in_memory().await.unwrap());
        let id = store.insert_plan(&python_plan("u1")).await.unwrap();
        assert!(store.set_status(id, PlanStatus::Completed).await.unwrap());

        assert!(store.active_plans("u1").await.unwrap().is_empty());
        assert!(!store.set_status(9999, PlanStatus::Active).await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_subject_is_rejected() {
        let store = PlanStore::new(Database::new_in_memory().await.unwrap());
        let mut plan = python_plan("u1");
        plan.subject = "   ".to_string();
        let err = store.insert_plan(&plan).await.unwrap_err();
        assert!(matches!(err, PlanError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_module_json_is_reported() {
        let db = Database::new_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO learning_plans (user_id, subject, modules) VALUES ('u1', 'Rust', 'not json')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = PlanStore::new(db).active_plans("u1").await.unwrap_err();
        assert!(matches!(err, PlanError::CorruptModules { .. }));
    }
}
