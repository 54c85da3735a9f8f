//! Document store traits
//!
//! TigerStyle: Explicit operations, explicit transaction lifecycle.

use crate::document::{Document, DocumentId, Fields};
use async_trait::async_trait;
use berth_core::Result;
use serde_json::Value;

/// Durable document store with atomic multi-document transactions
///
/// Direct operations are individually atomic. Anything that must read and
/// then write consistently goes through [`DocumentStore::begin_transaction`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a document by id
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>>;

    /// Find documents whose `field` equals `value` exactly
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>>;

    /// Insert a new document and return its fresh id
    async fn insert(&self, collection: &str, fields: Fields) -> Result<DocumentId>;

    /// Merge `fields` into an existing document
    ///
    /// # Errors
    /// `DocumentNotFound` if the document does not exist.
    async fn update_fields(&self, collection: &str, id: &DocumentId, fields: Fields)
        -> Result<()>;

    /// Delete a document (no-op if absent)
    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<()>;

    /// All documents in a collection, in the store's enumeration order
    async fn scan_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Begin a transaction
    async fn begin_transaction(&self) -> Result<Box<dyn DocumentTransaction>>;
}

/// A read-modify-write unit against a [`DocumentStore`]
///
/// Reads observe the transaction's own buffered writes. Writes become visible
/// to others only on commit, and commit fails with `TransactionConflict` if
/// anything the transaction read was changed by another writer meanwhile.
#[async_trait]
pub trait DocumentTransaction: Send {
    /// Get a document by id
    async fn get(&mut self, collection: &str, id: &DocumentId) -> Result<Option<Document>>;

    /// Find documents whose `field` equals `value` exactly
    async fn find_by_field(
        &mut self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>>;

    /// Buffer an insert and return the id the document will have
    async fn insert(&mut self, collection: &str, fields: Fields) -> Result<DocumentId>;

    /// Buffer a merge of `fields` into an existing document
    ///
    /// # Errors
    /// `DocumentNotFound` if the document does not exist in this transaction's view.
    async fn update_fields(
        &mut self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<()>;

    /// Buffer a delete
    async fn delete(&mut self, collection: &str, id: &DocumentId) -> Result<()>;

    /// Validate reads and apply all buffered writes atomically
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard all buffered writes
    async fn abort(self: Box<Self>) -> Result<()>;
}
