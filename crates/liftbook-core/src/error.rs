//! Error types for Liftbook core operations.
//!
//! Errors are descriptive at the core level; callers classify them with
//! [`LiftbookError::kind`] and map the kind to their own surface (exit codes,
//! HTTP statuses).

use thiserror::Error;

/// Result type alias for Liftbook operations.
pub type Result<T> = std::result::Result<T, LiftbookError>;

/// Core error type for Liftbook operations.
#[derive(Debug, Error)]
pub enum LiftbookError {
    /// Resource absent, soft-deleted, or owned by someone else
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or contradictory input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Payload refers to a child that does not belong to the current parent
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Caller-facing classification of a [`LiftbookError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl LiftbookError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        LiftbookError::NotFound(format!("{} {}", what, id))
    }

    /// Classify this error for the caller.
    ///
    /// Constraint violations raised by SQLite can only be produced by
    /// references the caller supplied, so they count as validation failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LiftbookError::NotFound(_) => ErrorKind::NotFound,
            LiftbookError::Validation(_) | LiftbookError::Json { .. } => ErrorKind::Validation,
            LiftbookError::Conflict(_) => ErrorKind::Conflict,
            LiftbookError::Sqlite { .. } if self.is_constraint_violation() => {
                ErrorKind::Validation
            }
            LiftbookError::Storage(_) | LiftbookError::Sqlite { .. } | LiftbookError::Io { .. } => {
                ErrorKind::Internal
            }
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            LiftbookError::Sqlite {
                source: rusqlite::Error::SqliteFailure(e, _)
            } if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
