//! Berth Core
//!
//! Core types, errors, and constants for the Berth space registry.
//!
//! # Overview
//!
//! Berth keeps a small registry of named spaces, each with an occupancy flag,
//! and guarantees that no two spaces ever share a name. The guarantee is
//! enforced by the registry engine (`berth-registry`) on top of a transactional
//! document store (`berth-storage`).
//!
//! # TigerStyle
//!
//! - Explicit limits with big-endian naming (e.g., `SPACE_NAME_LENGTH_BYTES_MAX`)
//! - Validated newtypes at the boundary, raw strings never cross it
//! - Errors are returned, never panics

pub mod config;
pub mod constants;
pub mod error;
pub mod occ;
pub mod space;
pub mod telemetry;

pub use config::{BerthConfig, RegistryConfig, StorageBackend, StorageConfig};
pub use constants::*;
pub use error::{Error, Result};
pub use occ::Version;
pub use space::{Space, SpaceId, SpaceName};
pub use telemetry::{init_telemetry, TelemetryConfig};
