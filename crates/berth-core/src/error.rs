//! Error types for Berth
//!
//! TigerStyle: Explicit error types with context, using thiserror.

use thiserror::Error;

/// Result type alias for Berth store and core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Berth error types
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid space name: {name:?}, reason: {reason}")]
    InvalidSpaceName { name: String, reason: String },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Transaction conflict: {reason}")]
    TransactionConflict { reason: String },

    #[error("Transaction too large: {count} writes exceeds limit of {limit}")]
    TransactionTooLarge { count: usize, limit: usize },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {field}, reason: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {reason}")]
    Internal { reason: String },

    #[error("Deserialization failed: {reason}")]
    DeserializationFailed { reason: String },
}

impl Error {
    /// Create an invalid space name error
    pub fn invalid_space_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpaceName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a document not found error
    pub fn document_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a storage unavailable error
    pub fn storage_unavailable(reason: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a transaction conflict error
    pub fn transaction_conflict(reason: impl Into<String>) -> Self {
        Self::TransactionConflict {
            reason: reason.into(),
        }
    }

    /// Create a transaction failed error
    pub fn transaction_failed(reason: impl Into<String>) -> Self {
        Self::TransactionFailed {
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Check if this error is a commit-time conflict with another writer
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::TransactionConflict { .. })
    }

    /// Check if this error is retriable
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::TransactionConflict { .. } | Self::StorageUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::document_not_found("spaces", "abc");
        assert!(err.to_string().contains("spaces/abc"));

        let err = Error::invalid_space_name("  ", "empty after trimming");
        assert!(err.to_string().contains("empty after trimming"));
    }

    #[test]
    fn test_error_is_retriable() {
        assert!(Error::transaction_conflict("test").is_retriable());
        assert!(Error::storage_unavailable("down").is_retriable());
        assert!(!Error::document_not_found("spaces", "x").is_retriable());
        assert!(!Error::internal("bug").is_retriable());
    }

    #[test]
    fn test_error_is_conflict() {
        assert!(Error::transaction_conflict("test").is_conflict());
        assert!(!Error::storage_unavailable("down").is_conflict());
    }
}
