//! Berth DST - Deterministic Simulation Testing
//!
//! Seeded randomness and fault injection for exercising the space registry
//! against an unreliable store.
//!
//! # Overview
//!
//! - Reproducible random numbers ([`DeterministicRng`], replay with `DST_SEED`)
//! - Fault injection ([`FaultInjector`])
//! - A document store that injects those faults ([`SimStore`])
//! - Invariant checks over raw store state ([`check_name_uniqueness`])
//!
//! # Example
//!
//! ```rust,ignore
//! use berth_dst::{DeterministicRng, FaultConfig, FaultInjectorBuilder, FaultType, SimStore};
//!
//! let rng = DeterministicRng::from_env_or_random();
//! let injector = FaultInjectorBuilder::new(rng.fork())
//!     .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 0.1))
//!     .build();
//! let store = SimStore::new(rng, Arc::new(injector));
//! ```
//!
//! # TigerStyle
//!
//! - All fault decisions are deterministic given the same seed
//! - Always log the seed for reproducibility

pub mod fault;
pub mod invariants;
pub mod rng;
pub mod storage;

pub use fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
pub use invariants::{check_name_uniqueness, InvariantViolation};
pub use rng::DeterministicRng;
pub use storage::{SimStore, SimTransaction};
