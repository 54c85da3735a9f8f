//! Document model
//!
//! TigerStyle: Opaque ids, schemaless field maps, explicit versions.

use berth_core::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field map of a document
pub type Fields = serde_json::Map<String, Value>;

/// Store-assigned document identifier
///
/// Generated as a random UUID on insert, so identifiers are never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document as read from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier within its collection
    pub id: DocumentId,
    /// Field values
    pub fields: Fields,
    /// Version at read time (`Version::INITIAL` for unflushed inserts)
    pub version: Version,
}

impl Document {
    /// Whether `field` is present and equal to `value`
    pub fn matches(&self, field: &str, value: &Value) -> bool {
        fields_match(&self.fields, field, value)
    }
}

/// Exact-match predicate shared by every backend
pub(crate) fn fields_match(fields: &Fields, field: &str, value: &Value) -> bool {
    fields.get(field) == Some(value)
}

/// Merge `updates` into `base`, overwriting existing keys
pub(crate) fn merge_fields(base: &mut Fields, updates: Fields) {
    for (key, value) in updates {
        base.insert(key, value);
    }
}
