//! Invariant checks over store state
//!
//! Checks run against a raw scan of the store, bypassing the registry, so a
//! registry bug cannot hide its own violations.

use berth_core::constants::SPACE_FIELD_NAME;
use berth_storage::Document;
use std::collections::HashMap;
use thiserror::Error;

/// Error indicating an invariant violation
#[derive(Error, Debug, Clone)]
#[error("Invariant '{name}' violated: {message}")]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub name: &'static str,
    /// Human-readable description of the violation
    pub message: String,
}

/// No two live documents share a name
pub fn check_name_uniqueness(docs: &[Document]) -> Result<(), InvariantViolation> {
    let mut holders: HashMap<String, Vec<&str>> = HashMap::new();
    for doc in docs {
        if let Some(name) = doc.fields.get(SPACE_FIELD_NAME) {
            holders
                .entry(name.to_string())
                .or_default()
                .push(doc.id.as_str());
        }
    }

    let mut duplicates: Vec<String> = holders
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(name, ids)| format!("{} held by [{}]", name, ids.join(", ")))
        .collect();

    if duplicates.is_empty() {
        return Ok(());
    }

    duplicates.sort();
    Err(InvariantViolation {
        name: "NameUniqueness",
        message: duplicates.join("; "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::Version;
    use berth_storage::{DocumentId, Fields};
    use serde_json::json;

    fn doc(id: &str, name: &str) -> Document {
        let mut fields = Fields::new();
        fields.insert("name".into(), json!(name));
        Document {
            id: DocumentId::new(id),
            fields,
            version: Version::new(1),
        }
    }

    #[test]
    fn test_unique_names_pass() {
        let docs = vec![doc("1", "P1"), doc("2", "P2")];
        assert!(check_name_uniqueness(&docs).is_ok());
        assert!(check_name_uniqueness(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_names_reported() {
        let docs = vec![doc("1", "P1"), doc("2", "P2"), doc("3", "P1")];
        let violation = check_name_uniqueness(&docs).unwrap_err();
        assert_eq!(violation.name, "NameUniqueness");
        assert!(violation.message.contains("\"P1\""));
        assert!(violation.message.contains('1'));
        assert!(violation.message.contains('3'));
    }
}
