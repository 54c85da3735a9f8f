//! Registry error types
//!
//! TigerStyle: Explicit error variants with context.

use berth_core::{Error as CoreError, SpaceId};
use thiserror::Error;

/// Registry-specific errors
///
/// Every variant is recoverable. `Contention`, `Timeout` and
/// `StorageUnavailable` may succeed on retry; the rest will not without
/// different input.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Name is empty after trimming or otherwise malformed
    #[error("invalid input {name:?}: {reason}")]
    InvalidInput { name: String, reason: String },

    /// No space has the given name
    #[error("space not found: {name}")]
    NotFound { name: String },

    /// Another space already uses the name
    #[error("space name {name} already used by {existing_id}")]
    NameConflict { name: String, existing_id: SpaceId },

    /// Concurrent writers kept the transaction from committing
    #[error("contention: {reason}")]
    Contention { reason: String },

    /// The operation did not finish before its deadline
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The store failed or could not be reached
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },
}

impl RegistryError {
    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a name conflict error
    pub fn name_conflict(name: impl Into<String>, existing_id: SpaceId) -> Self {
        Self::NameConflict {
            name: name.into(),
            existing_id,
        }
    }

    /// Check if this error indicates a retriable condition
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Contention { .. } | Self::Timeout { .. } | Self::StorageUnavailable { .. }
        )
    }
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSpaceName { name, reason } => Self::InvalidInput { name, reason },
            CoreError::TransactionConflict { reason } => Self::Contention { reason },
            other => Self::StorageUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::not_found("P1");
        assert!(err.to_string().contains("P1"));

        let err = RegistryError::name_conflict("P2", SpaceId::new("abc"));
        assert!(err.to_string().contains("P2"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_error_retriable() {
        assert!(RegistryError::Contention {
            reason: "busy".into()
        }
        .is_retriable());
        assert!(RegistryError::StorageUnavailable {
            reason: "down".into()
        }
        .is_retriable());
        assert!(RegistryError::Timeout {
            operation: "create",
            timeout_ms: 10
        }
        .is_retriable());

        assert!(!RegistryError::not_found("x").is_retriable());
        assert!(!RegistryError::name_conflict("x", SpaceId::new("id")).is_retriable());
        assert!(!RegistryError::InvalidInput {
            name: String::new(),
            reason: "empty".into()
        }
        .is_retriable());
    }

    #[test]
    fn test_from_core_error() {
        let err: RegistryError = CoreError::transaction_conflict("lost race").into();
        assert!(matches!(err, RegistryError::Contention { .. }));

        let err: RegistryError = CoreError::invalid_space_name(" ", "empty").into();
        assert!(matches!(err, RegistryError::InvalidInput { .. }));

        let err: RegistryError = CoreError::storage_unavailable("connection refused").into();
        match err {
            RegistryError::StorageUnavailable { reason } => {
                assert!(reason.contains("connection refused"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
