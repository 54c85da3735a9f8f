//! Simulated document store for deterministic testing
//!
//! TigerStyle: Real OCC semantics from `MemoryStore`, faults injected at the
//! operation boundary.

use crate::fault::{FaultInjector, FaultType};
use crate::rng::DeterministicRng;
use async_trait::async_trait;
use berth_core::{Error, Result};
use berth_storage::{
    Document, DocumentId, DocumentStore, DocumentTransaction, Fields, MemoryStore,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Where in the store an operation lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Read,
    Write,
    Commit,
}

impl OperationKind {
    /// Operation name matched by fault filters
    fn name(self, in_transaction: bool) -> &'static str {
        match (self, in_transaction) {
            (Self::Read, false) => "storage_read",
            (Self::Write, false) => "storage_write",
            (Self::Read, true) => "transaction_read",
            (Self::Write, true) => "transaction_write",
            (Self::Commit, _) => "transaction_commit",
        }
    }
}

/// Shared fault state of a store and its transactions
#[derive(Debug, Clone)]
struct Faults {
    injector: Arc<FaultInjector>,
    rng: DeterministicRng,
}

impl Faults {
    /// Consult the injector before an operation
    ///
    /// Latency delays the operation and lets it proceed. A fault that makes no
    /// sense for the operation kind is ignored.
    async fn check(&self, kind: OperationKind, in_transaction: bool) -> Result<()> {
        let operation = kind.name(in_transaction);
        let Some(fault) = self.injector.should_inject(operation) else {
            return Ok(());
        };

        match (fault, kind) {
            (FaultType::StorageLatency { min_ms, max_ms }, _) => {
                let delay_ms = self.rng.next_range_inclusive(min_ms, max_ms.max(min_ms));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(())
            }
            (FaultType::StorageReadFail, OperationKind::Read) => Err(Error::storage_unavailable(
                format!("injected read failure during {}", operation),
            )),
            (FaultType::StorageWriteFail, OperationKind::Write | OperationKind::Commit) => Err(
                Error::storage_unavailable(format!("injected write failure during {}", operation)),
            ),
            (FaultType::TransactionConflict, OperationKind::Commit) => Err(
                Error::transaction_conflict("injected conflict at commit validation"),
            ),
            (FaultType::CrashDuringTransaction, OperationKind::Commit) => Err(
                Error::transaction_failed("crash during transaction commit (injected)"),
            ),
            _ => Ok(()),
        }
    }
}

/// Simulated document store for DST
///
/// Delegates to a [`MemoryStore`], so optimistic concurrency and atomic commit
/// behave as in production, with faults injected before each operation.
#[derive(Debug, Clone)]
pub struct SimStore {
    inner: MemoryStore,
    faults: Faults,
}

impl SimStore {
    /// Create an empty simulated store
    pub fn new(rng: DeterministicRng, injector: Arc<FaultInjector>) -> Self {
        Self::wrap(MemoryStore::new(), rng, injector)
    }

    /// Inject faults in front of an existing store
    pub fn wrap(inner: MemoryStore, rng: DeterministicRng, injector: Arc<FaultInjector>) -> Self {
        Self {
            inner,
            faults: Faults { injector, rng },
        }
    }

    /// The fault-free store underneath, for inspecting state
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// The fault injector driving this store
    pub fn injector(&self) -> &FaultInjector {
        &self.faults.injector
    }
}

#[async_trait]
impl DocumentStore for SimStore {
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        self.faults.check(OperationKind::Read, false).await?;
        self.inner.get(collection, id).await
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        self.faults.check(OperationKind::Read, false).await?;
        self.inner.find_by_field(collection, field, value).await
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<DocumentId> {
        self.faults.check(OperationKind::Write, false).await?;
        self.inner.insert(collection, fields).await
    }

    async fn update_fields(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<()> {
        self.faults.check(OperationKind::Write, false).await?;
        self.inner.update_fields(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<()> {
        self.faults.check(OperationKind::Write, false).await?;
        self.inner.delete(collection, id).await
    }

    async fn scan_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.faults.check(OperationKind::Read, false).await?;
        self.inner.scan_all(collection).await
    }

    async fn begin_transaction(&self) -> Result<Box<dyn DocumentTransaction>> {
        // Faults land on the transaction's operations and its commit
        let inner = self.inner.begin_transaction().await?;
        Ok(Box::new(SimTransaction {
            inner,
            faults: self.faults.clone(),
        }))
    }
}

/// Transaction over [`SimStore`]
///
/// A fault at commit leaves the store untouched.
pub struct SimTransaction {
    inner: Box<dyn DocumentTransaction>,
    faults: Faults,
}

#[async_trait]
impl DocumentTransaction for SimTransaction {
    async fn get(&mut self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        self.faults.check(OperationKind::Read, true).await?;
        self.inner.get(collection, id).await
    }

    async fn find_by_field(
        &mut self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        self.faults.check(OperationKind::Read, true).await?;
        self.inner.find_by_field(collection, field, value).await
    }

    async fn insert(&mut self, collection: &str, fields: Fields) -> Result<DocumentId> {
        self.faults.check(OperationKind::Write, true).await?;
        self.inner.insert(collection, fields).await
    }

    async fn update_fields(
        &mut self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<()> {
        self.faults.check(OperationKind::Write, true).await?;
        self.inner.update_fields(collection, id, fields).await
    }

    async fn delete(&mut self, collection: &str, id: &DocumentId) -> Result<()> {
        self.faults.check(OperationKind::Write, true).await?;
        self.inner.delete(collection, id).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let SimTransaction { inner, faults } = *self;

        if let Err(e) = faults.check(OperationKind::Commit, true).await {
            inner.abort().await?;
            return Err(e);
        }
        inner.commit().await
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        self.inner.abort().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{FaultConfig, FaultInjectorBuilder};
    use serde_json::json;

    const COLLECTION: &str = "spaces";

    fn fields(name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), json!(name));
        fields
    }

    fn store_with(faults: Vec<FaultConfig>) -> SimStore {
        let rng = DeterministicRng::new(42);
        let mut builder = FaultInjectorBuilder::new(rng.fork());
        for fault in faults {
            builder = builder.with_fault(fault);
        }
        SimStore::new(rng, Arc::new(builder.build()))
    }

    #[tokio::test]
    async fn test_sim_store_without_faults() {
        let store = store_with(Vec::new());

        let id = store.insert(COLLECTION, fields("P1")).await.unwrap();
        let doc = store.get(COLLECTION, &id).await.unwrap().unwrap();
        assert_eq!(doc.fields.get("name"), Some(&json!("P1")));

        let mut txn = store.begin_transaction().await.unwrap();
        txn.delete(COLLECTION, &id).await.unwrap();
        txn.commit().await.unwrap();
        assert!(store.inner().is_empty(COLLECTION).await);
    }

    #[tokio::test]
    async fn test_sim_store_read_fault() {
        let store = store_with(vec![FaultConfig::new(FaultType::StorageReadFail, 1.0)]);

        let result = store.scan_all(COLLECTION).await;
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));

        // Read faults never fire on writes
        store.insert(COLLECTION, fields("P1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_sim_store_commit_fault_applies_nothing() {
        let store = store_with(vec![FaultConfig::new(
            FaultType::StorageWriteFail,
            1.0,
        )
        .with_filter("transaction_commit")]);

        let mut txn = store.begin_transaction().await.unwrap();
        txn.insert(COLLECTION, fields("P1")).await.unwrap();

        let result = txn.commit().await;
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
        assert!(store.inner().is_empty(COLLECTION).await);
    }

    #[tokio::test]
    async fn test_sim_store_injected_conflict() {
        let store = store_with(vec![FaultConfig::new(FaultType::TransactionConflict, 1.0)
            .with_filter("transaction_commit")
            .max_triggers(1)]);

        let mut txn = store.begin_transaction().await.unwrap();
        txn.insert(COLLECTION, fields("P1")).await.unwrap();
        let err = txn.commit().await.unwrap_err();
        assert!(err.is_conflict());

        let mut txn = store.begin_transaction().await.unwrap();
        txn.insert(COLLECTION, fields("P1")).await.unwrap();
        txn.commit().await.unwrap();
        assert_eq!(store.inner().len(COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn test_sim_store_latency_proceeds() {
        let store = store_with(vec![FaultConfig::new(
            FaultType::StorageLatency {
                min_ms: 1,
                max_ms: 5,
            },
            1.0,
        )]);

        let id = store.insert(COLLECTION, fields("P1")).await.unwrap();
        assert!(store.get(COLLECTION, &id).await.unwrap().is_some());
        assert_eq!(store.injector().total_triggers(), 2);
    }
}
