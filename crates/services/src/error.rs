//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{PassageError, PassageId, ScoreError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the session engine and `AssessmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("passage {0} not found")]
    NotFound(PassageId),
    #[error("passage cannot be assessed: {0}")]
    Malformed(#[from] PassageError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("{answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
    #[error("session is not active")]
    NotActive,
    #[error("session is not waiting for content")]
    NotLoading,
    #[error("expected passage {expected}, got {actual}")]
    PassageMismatch {
        expected: PassageId,
        actual: PassageId,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
