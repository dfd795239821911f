//! Error types for the kanban engine

use thiserror::Error;

/// Result type for kanban operations
pub type Result<T> = std::result::Result<T, KanbanError>;

/// The coarse categories callers branch on
///
/// Transport layers map these onto status codes; the reconciler decides what to retry
/// with [`KanbanError::is_retryable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity or parent is absent
    NotFound,
    /// The caller's assumed state is stale relative to the ledger
    Conflict,
    /// Malformed input
    Validation,
    /// Missing or bad credentials
    Unauthorized,
    /// The store could not commit
    StorageFailure,
    /// Anything else that is the server's fault
    Internal,
}

/// Errors that can occur in kanban operations
#[derive(Debug, Error)]
pub enum KanbanError {
    /// Generic resource not found (boards, sections, tasks, users)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The moved item is no longer where the client believes it is
    #[error("{id} is no longer a child of {parent}")]
    StaleSource { id: String, parent: String },

    /// Duplicate ID or unique name
    #[error("duplicate {item_type}: {id}")]
    DuplicateId { item_type: String, id: String },

    /// Source and destination are not collections of the same kind
    #[error("cannot move between {source_parent} and {destination}")]
    MismatchedParents {
        source_parent: String,
        destination: String,
    },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Username or password did not match
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Token missing, unknown or expired
    #[error("unauthorized")]
    Unauthorized,

    /// A parent changed between read and write
    #[error("{parent} changed while the move was being applied")]
    VersionMismatch { parent: String },

    /// Positions under a parent would stop being 0..n after a write
    #[error("positions under {parent} are not dense")]
    OrderViolation { parent: String },

    /// Password hashing failed
    #[error("credential error: {message}")]
    Credential { message: String },

    /// A blocking ledger task panicked or was cancelled
    #[error("background task failed: {message}")]
    Background { message: String },

    /// SQLite error
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KanbanError {
    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StaleSource { .. } | Self::DuplicateId { .. } => ErrorKind::Conflict,
            Self::MismatchedParents { .. }
            | Self::InvalidValue { .. }
            | Self::MissingField { .. } => ErrorKind::Validation,
            Self::InvalidCredentials | Self::Unauthorized => ErrorKind::Unauthorized,
            Self::VersionMismatch { .. } | Self::OrderViolation { .. } | Self::Storage(_) => {
                ErrorKind::StorageFailure
            }
            Self::Credential { .. } | Self::Background { .. } | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if this is a retryable error
    ///
    /// Only transient storage conditions qualify: a concurrent writer bumped a parent's
    /// version, or SQLite reported the database busy or locked.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::VersionMismatch { .. } => true,
            Self::Storage(e) => matches!(
                e.sqlite_error_code(),
                Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KanbanError::not_found("task", "abc123");
        assert_eq!(err.to_string(), "task not found: abc123");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            KanbanError::not_found("board", "b").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            KanbanError::StaleSource {
                id: "t".into(),
                parent: "section:s".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            KanbanError::invalid_value("destinationIndex", "negative").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            KanbanError::VersionMismatch {
                parent: "board:b".into()
            }
            .kind(),
            ErrorKind::StorageFailure
        );
        assert_eq!(KanbanError::Unauthorized.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_retryable() {
        assert!(KanbanError::VersionMismatch {
            parent: "section:s".into()
        }
        .is_retryable());
        assert!(!KanbanError::not_found("task", "x").is_retryable());
        assert!(!KanbanError::StaleSource {
            id: "x".into(),
            parent: "section:s".into()
        }
        .is_retryable());
        assert!(!KanbanError::OrderViolation {
            parent: "section:s".into()
        }
        .is_retryable());
    }
}
