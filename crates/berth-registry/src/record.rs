//! Space <-> document mapping
//!
//! Persisted shape: `{ "name": string, "occupied": bool }` plus the store id.

use crate::error::RegistryResult;
use berth_core::constants::{SPACE_FIELD_NAME, SPACE_FIELD_OCCUPIED};
use berth_core::{Error, Space, SpaceId, SpaceName};
use berth_storage::{Document, Fields};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SpaceRecord {
    name: String,
    occupied: bool,
}

/// Fields for a new space document
pub(crate) fn encode_space(name: &SpaceName, occupied: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert(SPACE_FIELD_NAME.into(), Value::from(name.as_str()));
    fields.insert(SPACE_FIELD_OCCUPIED.into(), Value::from(occupied));
    fields
}

/// Partial update touching only the supplied fields
pub(crate) fn encode_changes(name: Option<&SpaceName>, occupied: Option<bool>) -> Fields {
    let mut fields = Fields::new();
    if let Some(name) = name {
        fields.insert(SPACE_FIELD_NAME.into(), Value::from(name.as_str()));
    }
    if let Some(occupied) = occupied {
        fields.insert(SPACE_FIELD_OCCUPIED.into(), Value::from(occupied));
    }
    fields
}

/// Lookup key for the name field
pub(crate) fn name_value(name: &SpaceName) -> Value {
    Value::from(name.as_str())
}

/// Decode a stored document into a space
pub(crate) fn decode_space(doc: Document) -> RegistryResult<Space> {
    let record: SpaceRecord =
        serde_json::from_value(Value::Object(doc.fields)).map_err(|e| {
            Error::DeserializationFailed {
                reason: format!("space document {}: {}", doc.id, e),
            }
        })?;

    let name = SpaceName::from_stored(record.name).map_err(|e| Error::DeserializationFailed {
        reason: format!("space document {}: {}", doc.id, e),
    })?;

    Ok(Space {
        id: SpaceId::new(doc.id.as_str()),
        name,
        occupied: record.occupied,
    })
}
