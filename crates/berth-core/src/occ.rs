//! Optimistic concurrency control primitives
//!
//! TigerStyle: Explicit version type for commit-time validation.
//!
//! Every stored document carries a [`Version`]. A transaction remembers the
//! version of each document it read; commit succeeds only if those versions
//! are unchanged, otherwise the transaction aborts with a conflict and may be
//! retried.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version number for optimistic concurrency control
///
/// Monotonically increasing on each write to a document. A document that
/// does not exist is at `Version::INITIAL`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Version(u64);

impl Version {
    /// Version of a document that has never been written
    pub const INITIAL: Self = Version(0);

    /// Create a new version
    pub const fn new(v: u64) -> Self {
        Version(v)
    }

    /// Get the raw version number
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Next version after a write
    pub fn increment(&self) -> Self {
        Version(self.0.saturating_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Version(v)
    }
}
