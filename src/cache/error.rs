//! Error types for topic cache operations.

use thiserror::Error;

use crate::db::DbErrorKind;

/// Errors that can occur while reading or writing the topic cache.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Database operation failed.
    #[error("topic cache database error ({kind}): {message}")]
    Database {
        /// Typed classification of the sqlx failure.
        kind: DbErrorKind,
        /// Human-readable database error text.
        message: String,
    },

    /// A stored row cannot be mapped back into a record.
    #[error("topic cache row {id} is unreadable: {reason}")]
    CorruptRow {
        /// Row id.
        id: i64,
        /// What could not be mapped.
        reason: String,
    },
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            kind: DbErrorKind::from_sqlx(&err),
            message: err.to_string(),
        }
    }
}

impl CacheError {
    /// Returns the database error kind, if this is a database failure.
    #[must_use]
    pub fn db_kind(&self) -> Option<DbErrorKind> {
        match self {
            Self::Database { kind, .. } => Some(*kind),
            Self::CorruptRow { .. } => None,
        }
    }
}
