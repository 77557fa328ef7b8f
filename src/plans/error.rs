//! Error types for learning-plan reads and writes.

use thiserror::Error;

use crate::db::DbErrorKind;

/// Errors that can occur while reading or storing learning plans.
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    /// Database operation failed.
    #[error("plan store database error ({kind}): {message}")]
    Database {
        /// Typed classification of the sqlx failure.
        kind: DbErrorKind,
        /// Human-readable database error text.
        message: String,
    },

    /// The stored module list of a plan is not valid JSON.
    #[error(
        "learning plan {plan_id} has unreadable modules: {reason}\n  Suggestion: Re-import the plan with a valid module list"
    )]
    CorruptModules {
        /// Row id of the offending plan.
        plan_id: i64,
        /// Parser message.
        reason: String,
    },

    /// A plan was submitted without a usable subject or owner.
    #[error("invalid learning plan: {reason}")]
    Invalid {
        /// What was wrong with the submitted plan.
        reason: String,
    },
}

impl From<sqlx::Error> for PlanError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            kind: DbErrorKind::from_sqlx(&err),
            message: err.to_string(),
        }
    }
}

impl PlanError {
    /// Creates an `Invalid` error.
    #[must_use]
    pub fn invalid(reason: &str) -> Self {
        Self::Invalid {
            reason: reason.to_string(),
        }
    }
}
