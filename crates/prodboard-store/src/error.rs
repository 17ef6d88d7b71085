//! Error types for the workspace item store.
//!
//! Every failure collapses into one of five [`ErrorKind`]s. Transport layers
//! map a kind to their own status space via [`ErrorKind::status_code`].

/// Errors that can occur in workspace store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Referenced workspace, user or item does not exist in the given scope
    #[error("{0}")]
    NotFound(String),

    /// Malformed creation request (wrong variant count, empty text, ...)
    #[error("{0}")]
    Validation(String),

    /// Login already taken by another user
    #[error("login '{0}' already exists")]
    DuplicateLogin(String),

    /// Two writers raced for the same scoped identifier. Retried internally.
    #[error("identifier conflict in {scope}")]
    SequenceConflict {
        /// Scope the colliding identifier was assigned in
        scope: String,
    },

    /// Unrecoverable storage failure with a caller-safe message
    #[error("storage error: {0}")]
    Storage(String),

    /// SQLite engine error. The engine text stays in the source chain.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Stored graph violates a model invariant
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Workspace or item not found
    NotFound,
    /// Invalid request
    Validation,
    /// Login conflict on user creation or update
    DuplicateLogin,
    /// Identifier collision (never surfaced by the public operations)
    SequenceConflict,
    /// Storage fault
    Storage,
}

impl Error {
    /// Taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateLogin(_) => ErrorKind::DuplicateLogin,
            Self::SequenceConflict { .. } => ErrorKind::SequenceConflict,
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl ErrorKind {
    /// HTTP-equivalent status code for transport layers.
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::DuplicateLogin => 409,
            Self::SequenceConflict | Self::Storage => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::DuplicateLogin => write!(f, "duplicate_login"),
            Self::SequenceConflict => write!(f, "sequence_conflict"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// SQLite primary result codes that signal lock contention.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// True when the engine rejected a write because of a UNIQUE/PRIMARY KEY clash.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// True when the engine gave up waiting on another writer.
pub(crate) fn is_busy(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db) = err else {
        return false;
    };
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::DuplicateLogin("bob".into()).kind(),
            ErrorKind::DuplicateLogin
        );
        assert_eq!(Error::Internal("x".into()).kind(), ErrorKind::Storage);
        assert_eq!(
            Error::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Validation.status_code(), 400);
        assert_eq!(ErrorKind::DuplicateLogin.status_code(), 409);
        assert_eq!(ErrorKind::Storage.status_code(), 500);
    }

    #[test]
    fn test_database_message_hides_engine_text() {
        let err = Error::Database(sqlx::Error::Protocol("near \"SELEC\": syntax error".into()));
        assert_eq!(err.to_string(), "database error");
        assert!(std::error::Error::source(&err).is_some());
    }
}
