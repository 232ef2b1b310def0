//! Error types for breezemoon services
//!
//! Covers:
//! - Content validation failures
//! - Missing records
//! - Ownership violations
//! - Storage faults

/// Result alias for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Main service error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Content blank after trimming
    #[error("content is empty")]
    ContentEmpty,

    /// Content over the configured limit
    #[error("content too long: {actual} characters (max {max})")]
    ContentTooLong { max: usize, actual: usize },

    /// Breezemoon does not exist
    #[error("breezemoon not found: {0}")]
    NotFound(String),

    /// Acting user is not the author
    #[error("only the author may change this breezemoon")]
    NotAuthor,

    /// User does not exist
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Backing storage failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    /// Whether the caller caused the error (as opposed to the backend)
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
