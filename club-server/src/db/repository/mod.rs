//! Repository Module
//!
//! CRUD and atomic mutations over the SQLite pool. Repositories are free
//! functions taking `&SqlitePool`; all row types live in `shared::models`.

pub mod adjustment;
pub mod membership;
pub mod membership_type;
pub mod player;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            // Lost races against a unique index (one ACTIVE membership per
            // player) are retryable conflicts, not store failures
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Conflict(db.to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
