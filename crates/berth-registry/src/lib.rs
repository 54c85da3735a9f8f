//! Berth Registry
//!
//! Registry engine for uniquely named spaces with an occupancy flag.
//!
//! # Overview
//!
//! - [`SpaceRegistry`]: create, rename, update, delete, list and get spaces
//! - [`UniquenessIndex`]: exact-match name lookups joined to a transaction
//! - [`format_listing`]: render spaces as `<name>: Full|Empty` lines
//!
//! Every mutating operation runs as one store transaction via
//! [`berth_storage::run_transaction`], so the name uniqueness check and the
//! write it guards commit together or not at all.

pub mod error;
pub mod format;
pub mod index;
pub mod listing;
mod record;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use format::format_listing;
pub use index::UniquenessIndex;
pub use listing::Listing;
pub use registry::SpaceRegistry;
