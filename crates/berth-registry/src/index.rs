//! Uniqueness index
//!
//! Name to space lookup derived live from the store. There is no separate
//! index structure: every lookup is an exact-match field query, so its answer
//! is only as fresh as the read that produced it. Decisions that depend on a
//! name being free must use [`UniquenessIndex::lookup`] inside the same
//! transaction as the write; the transaction's commit-time validation then
//! rejects the write if the name was taken in the meantime.

use crate::error::RegistryResult;
use crate::record::{decode_space, name_value};
use berth_core::constants::SPACE_FIELD_NAME;
use berth_core::{Space, SpaceName};
use berth_storage::{Document, DocumentStore, DocumentTransaction};
use tracing::warn;

/// Exact-match name lookup over a space collection
#[derive(Debug, Clone)]
pub struct UniquenessIndex {
    collection: String,
}

impl UniquenessIndex {
    /// Create an index over `collection`
    pub fn new(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        assert!(!collection.is_empty(), "collection cannot be empty");
        Self { collection }
    }

    /// Collection this index reads
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Find the space holding `name`, as seen by `txn`
    ///
    /// The query joins the transaction's read set.
    pub async fn lookup(
        &self,
        txn: &mut dyn DocumentTransaction,
        name: &SpaceName,
    ) -> RegistryResult<Option<Space>> {
        let docs = txn
            .find_by_field(&self.collection, SPACE_FIELD_NAME, &name_value(name))
            .await?;
        self.resolve(name, docs)
    }

    /// Find the space holding `name` outside any transaction
    ///
    /// The answer may be stale by the time the caller acts on it.
    pub async fn lookup_snapshot(
        &self,
        store: &dyn DocumentStore,
        name: &SpaceName,
    ) -> RegistryResult<Option<Space>> {
        let docs = store
            .find_by_field(&self.collection, SPACE_FIELD_NAME, &name_value(name))
            .await?;
        self.resolve(name, docs)
    }

    fn resolve(&self, name: &SpaceName, docs: Vec<Document>) -> RegistryResult<Option<Space>> {
        if docs.len() > 1 {
            // Only reachable if something wrote the collection around the registry
            warn!(
                collection = %self.collection,
                name = %name,
                count = docs.len(),
                "Duplicate space name in store, using first match"
            );
        }

        docs.into_iter().next().map(decode_space).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_space;
    use berth_storage::MemoryStore;

    const COLLECTION: &str = "spaces";

    fn name(raw: &str) -> SpaceName {
        SpaceName::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_snapshot() {
        let store = MemoryStore::new();
        let index = UniquenessIndex::new(COLLECTION);
        let id = store
            .insert(COLLECTION, encode_space(&name("P1"), false))
            .await
            .unwrap();

        let found = index.lookup_snapshot(&store, &name("P1")).await.unwrap();
        let space = found.unwrap();
        assert_eq!(space.id.as_str(), id.as_str());
        assert!(!space.occupied);

        assert!(index
            .lookup_snapshot(&store, &name("p1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_lookup_sees_transaction_writes() {
        let store = MemoryStore::new();
        let index = UniquenessIndex::new(COLLECTION);

        let mut txn = store.begin_transaction().await.unwrap();
        assert!(index.lookup(&mut *txn, &name("P1")).await.unwrap().is_none());

        txn.insert(COLLECTION, encode_space(&name("P1"), true))
            .await
            .unwrap();
        let space = index.lookup(&mut *txn, &name("P1")).await.unwrap().unwrap();
        assert!(space.occupied);

        txn.abort().await.unwrap();
        assert!(index
            .lookup_snapshot(&store, &name("P1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_lookup_resolves_duplicates_to_first() {
        let store = MemoryStore::new();
        let index = UniquenessIndex::new(COLLECTION);

        // Written around the registry
        store
            .insert(COLLECTION, encode_space(&name("P1"), false))
            .await
            .unwrap();
        store
            .insert(COLLECTION, encode_space(&name("P1"), true))
            .await
            .unwrap();

        let found = index.lookup_snapshot(&store, &name("P1")).await.unwrap();
        assert!(found.is_some());
    }
}
