//! In-memory document store
//!
//! Reference backend for the registry and for tests.
//!
//! TigerStyle: Optimistic concurrency control with explicit read-set validation.
//!
//! # Concurrency
//!
//! Transactions buffer their writes and record what they read: the version of
//! every document they looked at, and the matching ids of every field query
//! they ran. Commit takes the write lock, re-checks both, and either applies
//! every buffered write or fails with `TransactionConflict`. Re-checking
//! query results is what catches a concurrent insert of a document that
//! would have matched (a phantom).

use crate::document::{fields_match, merge_fields, Document, DocumentId, Fields};
use crate::store::{DocumentStore, DocumentTransaction};
use async_trait::async_trait;
use berth_core::constants::TRANSACTION_WRITES_COUNT_MAX;
use berth_core::{Error, Result, Version};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// A document at rest
#[derive(Debug, Clone)]
struct StoredDocument {
    fields: Fields,
    version: Version,
}

/// Collection data: id -> document, in id order
type CollectionData = BTreeMap<DocumentId, StoredDocument>;

/// Storage data: collection name -> collection data
type StorageData = HashMap<String, CollectionData>;

/// (collection, id)
type DocumentKey = (String, DocumentId);

fn to_document(id: &DocumentId, stored: &StoredDocument) -> Document {
    Document {
        id: id.clone(),
        fields: stored.fields.clone(),
        version: stored.version,
    }
}

fn version_of(data: &StorageData, collection: &str, id: &DocumentId) -> Version {
    data.get(collection)
        .and_then(|docs| docs.get(id))
        .map(|stored| stored.version)
        .unwrap_or(Version::INITIAL)
}

fn matching(data: &StorageData, collection: &str, field: &str, value: &Value) -> Vec<Document> {
    data.get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, stored)| fields_match(&stored.fields, field, value))
                .map(|(id, stored)| to_document(id, stored))
                .collect()
        })
        .unwrap_or_default()
}

fn matching_ids(
    data: &StorageData,
    collection: &str,
    field: &str,
    value: &Value,
) -> Vec<DocumentId> {
    data.get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, stored)| fields_match(&stored.fields, field, value))
                .map(|(id, _)| id.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// In-memory document store
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<StorageData>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: &str) -> usize {
        let data = self.data.read().await;
        data.get(collection).map(|docs| docs.len()).unwrap_or(0)
    }

    /// Whether a collection has no documents
    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        let data = self.data.read().await;
        Ok(data
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|stored| to_document(id, stored)))
    }

    #[instrument(skip(self, value))]
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let data = self.data.read().await;
        Ok(matching(&data, collection, field, value))
    }

    #[instrument(skip(self, fields))]
    async fn insert(&self, collection: &str, fields: Fields) -> Result<DocumentId> {
        let id = DocumentId::generate();
        let mut data = self.data.write().await;
        data.entry(collection.to_string()).or_default().insert(
            id.clone(),
            StoredDocument {
                fields,
                version: Version::INITIAL.increment(),
            },
        );
        Ok(id)
    }

    #[instrument(skip(self, fields))]
    async fn update_fields(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<()> {
        let mut data = self.data.write().await;
        let stored = data
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::document_not_found(collection, id.as_str()))?;

        merge_fields(&mut stored.fields, fields);
        stored.version = stored.version.increment();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<()> {
        let mut data = self.data.write().await;
        if let Some(docs) = data.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn scan_all(&self, collection: &str) -> Result<Vec<Document>> {
        let data = self.data.read().await;
        Ok(data
            .get(collection)
            .map(|docs| docs.iter().map(|(id, stored)| to_document(id, stored)).collect())
            .unwrap_or_default())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn DocumentTransaction>> {
        Ok(Box::new(MemoryTransaction::new(self.clone())))
    }
}

/// Buffered write
#[derive(Debug, Clone)]
enum PendingWrite {
    /// Full field set the document will have after commit
    Put(Fields),
    Delete,
}

/// A field query recorded for commit-time validation
#[derive(Debug, Clone)]
struct QueryRead {
    collection: String,
    field: String,
    value: Value,
    /// Matching ids in the committed store at read time
    matched: Vec<DocumentId>,
}

/// Transaction for the in-memory store
///
/// Buffers writes until commit. All writes are applied atomically on commit,
/// provided nothing in the read set changed.
pub struct MemoryTransaction {
    storage: MemoryStore,
    /// First-observed version of every document read
    read_versions: HashMap<DocumentKey, Version>,
    /// Field queries evaluated against committed state
    query_reads: Vec<QueryRead>,
    /// Buffered writes in key order
    write_buffer: BTreeMap<DocumentKey, PendingWrite>,
}

impl MemoryTransaction {
    fn new(storage: MemoryStore) -> Self {
        Self {
            storage,
            read_versions: HashMap::new(),
            query_reads: Vec::new(),
            write_buffer: BTreeMap::new(),
        }
    }

    fn key(collection: &str, id: &DocumentId) -> DocumentKey {
        (collection.to_string(), id.clone())
    }

    fn record_read(&mut self, collection: &str, id: &DocumentId, version: Version) {
        self.read_versions
            .entry(Self::key(collection, id))
            .or_insert(version);
    }

    fn check_write_budget(&self) -> Result<()> {
        if self.write_buffer.len() >= TRANSACTION_WRITES_COUNT_MAX {
            return Err(Error::TransactionTooLarge {
                count: self.write_buffer.len() + 1,
                limit: TRANSACTION_WRITES_COUNT_MAX,
            });
        }
        Ok(())
    }

    /// Re-check the read set against committed state
    fn validate(&self, data: &StorageData) -> Result<()> {
        for ((collection, id), read_version) in &self.read_versions {
            let current = version_of(data, collection, id);
            if current != *read_version {
                return Err(Error::transaction_conflict(format!(
                    "document {}/{} changed: read {}, current {}",
                    collection, id, read_version, current
                )));
            }
        }

        for query in &self.query_reads {
            let current = matching_ids(data, &query.collection, &query.field, &query.value);
            if current != query.matched {
                return Err(Error::transaction_conflict(format!(
                    "query {}.{} == {} changed: {} matches at read, {} now",
                    query.collection,
                    query.field,
                    query.value,
                    query.matched.len(),
                    current.len()
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentTransaction for MemoryTransaction {
    async fn get(&mut self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        // Read-your-writes
        if let Some(pending) = self.write_buffer.get(&Self::key(collection, id)) {
            return Ok(match pending {
                PendingWrite::Put(fields) => Some(Document {
                    id: id.clone(),
                    fields: fields.clone(),
                    version: self
                        .read_versions
                        .get(&Self::key(collection, id))
                        .copied()
                        .unwrap_or(Version::INITIAL),
                }),
                PendingWrite::Delete => None,
            });
        }

        let found = {
            let data = self.storage.data.read().await;
            data.get(collection)
                .and_then(|docs| docs.get(id))
                .map(|stored| to_document(id, stored))
        };

        let version = found
            .as_ref()
            .map(|doc| doc.version)
            .unwrap_or(Version::INITIAL);
        self.record_read(collection, id, version);

        Ok(found)
    }

    async fn find_by_field(
        &mut self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let committed = {
            let data = self.storage.data.read().await;
            matching(&data, collection, field, value)
        };

        for doc in &committed {
            self.record_read(collection, &doc.id, doc.version);
        }
        self.query_reads.push(QueryRead {
            collection: collection.to_string(),
            field: field.to_string(),
            value: value.clone(),
            matched: committed.iter().map(|doc| doc.id.clone()).collect(),
        });

        // Overlay buffered writes for this collection
        let mut view: BTreeMap<DocumentId, Document> = committed
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect();

        for ((pending_collection, id), pending) in &self.write_buffer {
            if pending_collection != collection {
                continue;
            }
            match pending {
                PendingWrite::Put(fields) if fields_match(fields, field, value) => {
                    let version = view
                        .get(id)
                        .map(|doc| doc.version)
                        .unwrap_or(Version::INITIAL);
                    view.insert(
                        id.clone(),
                        Document {
                            id: id.clone(),
                            fields: fields.clone(),
                            version,
                        },
                    );
                }
                PendingWrite::Put(_) | PendingWrite::Delete => {
                    view.remove(id);
                }
            }
        }

        Ok(view.into_values().collect())
    }

    async fn insert(&mut self, collection: &str, fields: Fields) -> Result<DocumentId> {
        self.check_write_budget()?;

        let id = DocumentId::generate();
        self.write_buffer
            .insert(Self::key(collection, &id), PendingWrite::Put(fields));
        Ok(id)
    }

    async fn update_fields(
        &mut self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<()> {
        let mut current = self
            .get(collection, id)
            .await?
            .ok_or_else(|| Error::document_not_found(collection, id.as_str()))?
            .fields;

        if !self.write_buffer.contains_key(&Self::key(collection, id)) {
            self.check_write_budget()?;
        }

        merge_fields(&mut current, fields);
        self.write_buffer
            .insert(Self::key(collection, id), PendingWrite::Put(current));
        Ok(())
    }

    async fn delete(&mut self, collection: &str, id: &DocumentId) -> Result<()> {
        if !self.write_buffer.contains_key(&Self::key(collection, id)) {
            self.check_write_budget()?;
        }

        self.write_buffer
            .insert(Self::key(collection, id), PendingWrite::Delete);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        // Read-only transactions have nothing to publish
        if self.write_buffer.is_empty() {
            return Ok(());
        }

        let storage = Arc::clone(&self.storage.data);
        let mut data = storage.write().await;
        self.validate(&data)?;

        // No await points below: the apply phase cannot be cancelled halfway
        let write_count = self.write_buffer.len();
        let read_count = self.read_versions.len();
        let query_count = self.query_reads.len();
        for ((collection, id), pending) in self.write_buffer {
            match pending {
                PendingWrite::Put(fields) => {
                    let docs = data.entry(collection).or_default();
                    match docs.get_mut(&id) {
                        Some(stored) => {
                            stored.fields = fields;
                            stored.version = stored.version.increment();
                        }
                        None => {
                            docs.insert(
                                id,
                                StoredDocument {
                                    fields,
                                    version: Version::INITIAL.increment(),
                                },
                            );
                        }
                    }
                }
                PendingWrite::Delete => {
                    if let Some(docs) = data.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }

        debug!(
            write_count = write_count,
            read_count = read_count,
            query_count = query_count,
            "Memory transaction committed"
        );
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        debug!(
            write_count = self.write_buffer.len(),
            "Memory transaction aborted"
        );
        Ok(())
    }
}
