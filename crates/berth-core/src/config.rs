//! Configuration for Berth
//!
//! TigerStyle: Explicit defaults, validation, reasonable limits.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for Berth
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BerthConfig {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Registry engine configuration
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl BerthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.registry.validate()?;
        Ok(())
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Storage backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process store (state is lost on exit)
    #[default]
    Memory,
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
        }
    }
}

/// Registry engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Collection holding space documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Deadline for each registry operation (milliseconds)
    #[serde(default = "default_transaction_timeout_ms")]
    pub transaction_timeout_ms: u64,

    /// Commit attempts before a conflict is surfaced as contention
    #[serde(default = "default_transaction_attempts")]
    pub transaction_attempts_max: u32,

    /// Base delay for exponential backoff between attempts (milliseconds)
    #[serde(default = "default_retry_backoff_ms_base")]
    pub retry_backoff_ms_base: u64,
}

fn default_collection() -> String {
    SPACES_COLLECTION_DEFAULT.to_string()
}

fn default_transaction_timeout_ms() -> u64 {
    TRANSACTION_TIMEOUT_MS_DEFAULT
}

fn default_transaction_attempts() -> u32 {
    TRANSACTION_ATTEMPTS_COUNT_DEFAULT
}

fn default_retry_backoff_ms_base() -> u64 {
    RETRY_BACKOFF_MS_BASE_DEFAULT
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            transaction_timeout_ms: default_transaction_timeout_ms(),
            transaction_attempts_max: default_transaction_attempts(),
            retry_backoff_ms_base: default_retry_backoff_ms_base(),
        }
    }
}

impl RegistryConfig {
    /// Validate the registry section
    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(Error::InvalidConfiguration {
                field: "registry.collection".into(),
                reason: "must not be empty".into(),
            });
        }

        if self.collection.len() > COLLECTION_NAME_LENGTH_BYTES_MAX {
            return Err(Error::InvalidConfiguration {
                field: "registry.collection".into(),
                reason: format!(
                    "{} bytes exceeds limit {}",
                    self.collection.len(),
                    COLLECTION_NAME_LENGTH_BYTES_MAX
                ),
            });
        }

        if self.transaction_timeout_ms == 0
            || self.transaction_timeout_ms > TRANSACTION_TIMEOUT_MS_MAX
        {
            return Err(Error::InvalidConfiguration {
                field: "registry.transaction_timeout_ms".into(),
                reason: format!(
                    "{} must be in 1..={}",
                    self.transaction_timeout_ms, TRANSACTION_TIMEOUT_MS_MAX
                ),
            });
        }

        if self.transaction_attempts_max == 0
            || self.transaction_attempts_max > TRANSACTION_ATTEMPTS_COUNT_MAX
        {
            return Err(Error::InvalidConfiguration {
                field: "registry.transaction_attempts_max".into(),
                reason: format!(
                    "{} must be in 1..={}",
                    self.transaction_attempts_max, TRANSACTION_ATTEMPTS_COUNT_MAX
                ),
            });
        }

        if self.retry_backoff_ms_base > RETRY_BACKOFF_MS_MAX {
            return Err(Error::InvalidConfiguration {
                field: "registry.retry_backoff_ms_base".into(),
                reason: format!(
                    "{} exceeds limit {}",
                    self.retry_backoff_ms_base, RETRY_BACKOFF_MS_MAX
                ),
            });
        }

        Ok(())
    }
}
