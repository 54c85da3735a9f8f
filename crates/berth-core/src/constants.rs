//! TigerStyle constants for Berth
//!
//! All limits are explicit, use big-endian naming (most significant first),
//! and include units in the name.

// =============================================================================
// Space Limits
// =============================================================================

/// Maximum length of a space name in bytes (after trimming)
pub const SPACE_NAME_LENGTH_BYTES_MAX: usize = 256;

/// Maximum length of a collection name in bytes
pub const COLLECTION_NAME_LENGTH_BYTES_MAX: usize = 128;

/// Collection that holds space documents unless configured otherwise
pub const SPACES_COLLECTION_DEFAULT: &str = "spaces";

/// Document field holding the space name
pub const SPACE_FIELD_NAME: &str = "name";

/// Document field holding the occupancy flag
pub const SPACE_FIELD_OCCUPIED: &str = "occupied";

// =============================================================================
// Transaction Limits
// =============================================================================

/// Maximum number of buffered writes in a single transaction
pub const TRANSACTION_WRITES_COUNT_MAX: usize = 10_000;

/// Default deadline for a registry operation in milliseconds (2 sec)
pub const TRANSACTION_TIMEOUT_MS_DEFAULT: u64 = 2 * 1000;

/// Maximum deadline for a registry operation in milliseconds (30 sec)
pub const TRANSACTION_TIMEOUT_MS_MAX: u64 = 30 * 1000;

/// Default number of commit attempts before surfacing contention
pub const TRANSACTION_ATTEMPTS_COUNT_DEFAULT: u32 = 5;

/// Maximum number of commit attempts
pub const TRANSACTION_ATTEMPTS_COUNT_MAX: u32 = 20;

/// Default base delay for exponential retry backoff in milliseconds
pub const RETRY_BACKOFF_MS_BASE_DEFAULT: u64 = 10;

/// Cap on a single retry backoff in milliseconds
pub const RETRY_BACKOFF_MS_MAX: u64 = 1000;

// =============================================================================
// DST Limits
// =============================================================================

/// Default fault injection probability
pub const DST_FAULT_PROBABILITY_DEFAULT: f64 = 0.01;

// Compile-time assertions for constant validity
const _: () = {
    assert!(SPACE_NAME_LENGTH_BYTES_MAX >= 64);
    assert!(TRANSACTION_TIMEOUT_MS_DEFAULT <= TRANSACTION_TIMEOUT_MS_MAX);
    assert!(TRANSACTION_ATTEMPTS_COUNT_DEFAULT >= 1);
    assert!(TRANSACTION_ATTEMPTS_COUNT_DEFAULT <= TRANSACTION_ATTEMPTS_COUNT_MAX);
    assert!(RETRY_BACKOFF_MS_BASE_DEFAULT <= RETRY_BACKOFF_MS_MAX);
};
