//! Space registry engine
//!
//! TigerStyle: Every uniqueness-sensitive read and its write share one
//! transaction. The engine holds no cross-call state.

use crate::error::{RegistryError, RegistryResult};
use crate::index::UniquenessIndex;
use crate::listing::Listing;
use crate::record::{decode_space, encode_changes, encode_space};
use async_trait::async_trait;
use berth_core::{RegistryConfig, Space, SpaceId, SpaceName};
use berth_storage::{
    run_transaction, DocumentId, DocumentStore, DocumentTransaction, RetryPolicy, TransactionBody,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// Registry
// =============================================================================

/// Registry of uniquely named spaces
///
/// # Guarantees
/// - No two spaces share a name, whatever the interleaving of callers
/// - A space keeps its id across renames and occupancy changes
/// - Every operation either commits fully or has no effect
#[derive(Clone)]
pub struct SpaceRegistry {
    store: Arc<dyn DocumentStore>,
    index: UniquenessIndex,
    config: RegistryConfig,
    retry: RetryPolicy,
}

impl fmt::Debug for SpaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceRegistry")
            .field("collection", &self.index.collection())
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SpaceRegistry {
    /// Create a registry over `store` with default configuration
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::from_parts(store, RegistryConfig::default())
    }

    /// Create a registry over `store` with explicit configuration
    pub fn with_config(
        store: Arc<dyn DocumentStore>,
        config: RegistryConfig,
    ) -> berth_core::Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(store, config))
    }

    fn from_parts(store: Arc<dyn DocumentStore>, config: RegistryConfig) -> Self {
        Self {
            index: UniquenessIndex::new(config.collection.clone()),
            retry: RetryPolicy::from_config(&config),
            store,
            config,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Create a space and return its new id
    ///
    /// # Errors
    /// `InvalidInput` for a blank name, `NameConflict` if the name is taken.
    #[instrument(skip(self), fields(collection = %self.index.collection()))]
    pub async fn create(&self, name: &str, occupied: bool) -> RegistryResult<SpaceId> {
        let name = SpaceName::new(name)?;
        let body = CreateSpace {
            index: &self.index,
            name,
            occupied,
        };

        let id = self
            .with_deadline("create", run_transaction(&*self.store, &self.retry, &body))
            .await?;

        info!(name = %body.name, id = %id, "Space created");
        Ok(id)
    }

    /// Rename a space, keeping its id and occupancy
    ///
    /// Renaming a space to its current name succeeds without touching the
    /// store.
    pub async fn rename(&self, current_name: &str, new_name: &str) -> RegistryResult<()> {
        self.update(current_name, Some(new_name), None).await
    }

    /// Set the occupancy of a space
    pub async fn set_occupancy(&self, name: &str, occupied: bool) -> RegistryResult<()> {
        self.update(name, None, Some(occupied)).await
    }

    /// Change the name, the occupancy, or both, of one space atomically
    ///
    /// # Errors
    /// `NotFound` if `current_name` is absent, `NameConflict` if `new_name`
    /// belongs to a different space.
    #[instrument(skip(self), fields(collection = %self.index.collection()))]
    pub async fn update(
        &self,
        current_name: &str,
        new_name: Option<&str>,
        occupied: Option<bool>,
    ) -> RegistryResult<()> {
        let current = SpaceName::new(current_name)?;
        let new_name = new_name.map(SpaceName::new).transpose()?;

        let new_name = new_name.filter(|name| *name != current);
        if new_name.is_none() && occupied.is_none() {
            debug!(name = %current, "Nothing to update");
            return Ok(());
        }

        let body = UpdateSpace {
            index: &self.index,
            current,
            new_name,
            occupied,
        };

        self.with_deadline("update", run_transaction(&*self.store, &self.retry, &body))
            .await?;

        info!(
            name = %body.current,
            new_name = ?body.new_name.as_ref().map(SpaceName::as_str),
            occupied = ?body.occupied,
            "Space updated"
        );
        Ok(())
    }

    /// Delete a space
    ///
    /// Returns `false` if no space had the name.
    #[instrument(skip(self), fields(collection = %self.index.collection()))]
    pub async fn delete(&self, name: &str) -> RegistryResult<bool> {
        let name = SpaceName::new(name)?;
        let body = DeleteSpace {
            index: &self.index,
            name,
        };

        let deleted = self
            .with_deadline("delete", run_transaction(&*self.store, &self.retry, &body))
            .await?;

        if deleted {
            info!(name = %body.name, "Space deleted");
        }
        Ok(deleted)
    }

    /// Snapshot of every space
    ///
    /// Not transactional; reflects the store at scan time. Documents that do
    /// not decode as spaces are logged and left out.
    #[instrument(skip(self), fields(collection = %self.index.collection()))]
    pub async fn list(&self) -> RegistryResult<Listing> {
        self.with_deadline("list", async {
            let docs = self.store.scan_all(self.index.collection()).await?;
            let mut spaces = Vec::with_capacity(docs.len());
            for doc in docs {
                let id = doc.id.clone();
                match decode_space(doc) {
                    Ok(space) => spaces.push(space),
                    Err(e) => {
                        warn!(id = %id, error = %e, "Skipping undecodable space document")
                    }
                }
            }
            Ok(Listing::new(spaces))
        })
        .await
    }

    /// Look up a single space by name outside any transaction
    #[instrument(skip(self), fields(collection = %self.index.collection()))]
    pub async fn get(&self, name: &str) -> RegistryResult<Option<Space>> {
        let name = SpaceName::new(name)?;
        self.with_deadline("get", self.index.lookup_snapshot(&*self.store, &name))
            .await
    }

    /// Run `fut` under the configured operation deadline
    ///
    /// A transaction dropped before commit leaves the store untouched.
    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> RegistryResult<T>
    where
        F: Future<Output = RegistryResult<T>>,
    {
        let timeout_ms = self.config.transaction_timeout_ms;

        match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms, "Registry operation timed out");
                Err(RegistryError::Timeout {
                    operation,
                    timeout_ms,
                })
            }
        }
    }
}

// =============================================================================
// Transaction Bodies
// =============================================================================

struct CreateSpace<'a> {
    index: &'a UniquenessIndex,
    name: SpaceName,
    occupied: bool,
}

#[async_trait]
impl<'a> TransactionBody for CreateSpace<'a> {
    type Output = SpaceId;
    type Error = RegistryError;

    async fn run(&self, txn: &mut dyn DocumentTransaction) -> RegistryResult<SpaceId> {
        if let Some(existing) = self.index.lookup(txn, &self.name).await? {
            return Err(RegistryError::name_conflict(
                self.name.as_str(),
                existing.id,
            ));
        }

        let id = txn
            .insert(
                self.index.collection(),
                encode_space(&self.name, self.occupied),
            )
            .await?;
        Ok(SpaceId::new(id.as_str()))
    }
}

/// `new_name`, when present, differs from `current`
struct UpdateSpace<'a> {
    index: &'a UniquenessIndex,
    current: SpaceName,
    new_name: Option<SpaceName>,
    occupied: Option<bool>,
}

#[async_trait]
impl<'a> TransactionBody for UpdateSpace<'a> {
    type Output = ();
    type Error = RegistryError;

    async fn run(&self, txn: &mut dyn DocumentTransaction) -> RegistryResult<()> {
        let space = self
            .index
            .lookup(txn, &self.current)
            .await?
            .ok_or_else(|| RegistryError::not_found(self.current.as_str()))?;

        if let Some(target) = &self.new_name {
            if let Some(holder) = self.index.lookup(txn, target).await? {
                if holder.id != space.id {
                    return Err(RegistryError::name_conflict(target.as_str(), holder.id));
                }
            }
        }

        let changes = encode_changes(self.new_name.as_ref(), self.occupied);
        debug_assert!(!changes.is_empty());

        txn.update_fields(
            self.index.collection(),
            &DocumentId::new(space.id.as_str()),
            changes,
        )
        .await?;
        Ok(())
    }
}

struct DeleteSpace<'a> {
    index: &'a UniquenessIndex,
    name: SpaceName,
}

#[async_trait]
impl<'a> TransactionBody for DeleteSpace<'a> {
    type Output = bool;
    type Error = RegistryError;

    async fn run(&self, txn: &mut dyn DocumentTransaction) -> RegistryResult<bool> {
        let Some(space) = self.index.lookup(txn, &self.name).await? else {
            return Ok(false);
        };

        txn.delete(self.index.collection(), &DocumentId::new(space.id.as_str()))
            .await?;
        Ok(true)
    }
}
