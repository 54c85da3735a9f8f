//! Space types
//!
//! TigerStyle: Validated names, opaque identifiers.

use crate::constants::SPACE_NAME_LENGTH_BYTES_MAX;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the store when a space is created
///
/// Never changes across renames or occupancy updates and is never reused
/// after the space is deleted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(String);

impl SpaceId {
    /// Wrap a store-assigned identifier
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "space id cannot be empty");
        Self(id)
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated space name
///
/// Surrounding whitespace is trimmed; the remainder must be non-empty and at
/// most `SPACE_NAME_LENGTH_BYTES_MAX` bytes. Comparison is exact and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpaceName(String);

impl SpaceName {
    /// Validate and normalize a raw name
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(Error::invalid_space_name(raw, "empty after trimming"));
        }
        if trimmed.len() > SPACE_NAME_LENGTH_BYTES_MAX {
            return Err(Error::invalid_space_name(
                trimmed,
                format!(
                    "{} bytes exceeds limit of {} bytes",
                    trimmed.len(),
                    SPACE_NAME_LENGTH_BYTES_MAX
                ),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Accept a name read back from the store exactly as written
    ///
    /// Stored names are not re-trimmed so they stay byte-equal to what exact
    /// lookups match against.
    pub fn from_stored(raw: String) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::invalid_space_name(raw, "stored name is empty"));
        }
        Ok(Self(raw))
    }

    /// Borrow the normalized name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SpaceName {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<SpaceName> for String {
    fn from(name: SpaceName) -> Self {
        name.0
    }
}

/// A space as stored in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Store-assigned identifier
    pub id: SpaceId,
    /// Unique name
    pub name: SpaceName,
    /// Whether the space is currently occupied
    pub occupied: bool,
}

impl Space {
    /// Human-readable occupancy label used in listings
    pub fn occupancy_label(&self) -> &'static str {
        if self.occupied {
            "Full"
        } else {
            "Empty"
        }
    }
}
