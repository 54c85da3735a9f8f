//! Berth Storage
//!
//! Transactional document store capability for the Berth registry.
//!
//! # Overview
//!
//! The registry treats its backing store as a capability: a collection of
//! schemaless documents with exact-match field lookup, full scans, and
//! multi-document transactions that commit atomically or not at all.
//!
//! Backends:
//! - In-memory with optimistic concurrency control (reference and tests)
//!
//! The store knows nothing about name uniqueness. Callers build that on top
//! of [`run_transaction`], which retries commit conflicts up to a bound.

pub mod document;
pub mod memory;
pub mod store;
pub mod transaction;

pub use document::{Document, DocumentId, Fields};
pub use memory::{MemoryStore, MemoryTransaction};
pub use store::{DocumentStore, DocumentTransaction};
pub use transaction::{run_transaction, RetryPolicy, TransactionBody};
