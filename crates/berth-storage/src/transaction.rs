//! Transaction execution with bounded retry
//!
//! TigerStyle: Explicit attempt budget, exponential backoff, no unbounded loops.

use crate::store::{DocumentStore, DocumentTransaction};
use async_trait::async_trait;
use berth_core::constants::{
    RETRY_BACKOFF_MS_BASE_DEFAULT, RETRY_BACKOFF_MS_MAX, TRANSACTION_ATTEMPTS_COUNT_DEFAULT,
};
use berth_core::{Error, RegistryConfig};
use std::time::Duration;
use tracing::{debug, warn};

/// How many times to attempt a transaction and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total commit attempts, including the first
    pub attempts_max: u32,
    /// Delay before the second attempt; doubles per attempt
    pub backoff_ms_base: u64,
    /// Cap on a single delay
    pub backoff_ms_max: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts_max: TRANSACTION_ATTEMPTS_COUNT_DEFAULT,
            backoff_ms_base: RETRY_BACKOFF_MS_BASE_DEFAULT,
            backoff_ms_max: RETRY_BACKOFF_MS_MAX,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and base delay
    pub fn new(attempts_max: u32, backoff_ms_base: u64) -> Self {
        assert!(attempts_max >= 1, "at least one attempt is required");
        Self {
            attempts_max,
            backoff_ms_base,
            backoff_ms_max: RETRY_BACKOFF_MS_MAX,
        }
    }

    /// Build from the registry section of the configuration
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(
            config.transaction_attempts_max.max(1),
            config.retry_backoff_ms_base,
        )
    }

    /// Delay after the given failed attempt (1-based)
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(31);
        self.backoff_ms_base
            .saturating_mul(1u64 << shift)
            .min(self.backoff_ms_max)
    }
}

/// The read-modify-write logic of one transaction
///
/// `run` may be invoked several times if commits conflict, each time against a
/// fresh transaction, so it must derive everything it writes from what it reads
/// through `txn`.
#[async_trait]
pub trait TransactionBody: Send + Sync {
    /// Value produced by a committed run
    type Output: Send;
    /// Error type of the caller's domain
    type Error: From<Error> + Send;

    /// Perform reads and buffer writes
    async fn run(
        &self,
        txn: &mut dyn DocumentTransaction,
    ) -> std::result::Result<Self::Output, Self::Error>;
}

/// Run `body` in a transaction, retrying commit conflicts
///
/// An error returned by `body` aborts the transaction and is returned as is.
/// A commit conflict is retried until `policy.attempts_max` attempts were made,
/// then surfaced as `TransactionConflict`. Any other commit error is returned
/// immediately.
pub async fn run_transaction<B>(
    store: &dyn DocumentStore,
    policy: &RetryPolicy,
    body: &B,
) -> std::result::Result<B::Output, B::Error>
where
    B: TransactionBody + ?Sized,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        debug_assert!(attempt <= policy.attempts_max);

        let mut txn = store.begin_transaction().await?;

        let output = match body.run(&mut *txn).await {
            Ok(output) => output,
            Err(e) => {
                if let Err(abort_err) = txn.abort().await {
                    warn!(error = %abort_err, "Transaction abort failed");
                }
                return Err(e);
            }
        };

        match txn.commit().await {
            Ok(()) => {
                debug!(attempt = attempt, "Transaction committed");
                return Ok(output);
            }
            Err(e) if e.is_conflict() && attempt < policy.attempts_max => {
                let backoff_ms = policy.backoff_ms(attempt);
                warn!(
                    attempt = attempt,
                    attempts_max = policy.attempts_max,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction conflict, retrying"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) if e.is_conflict() => {
                return Err(Error::transaction_conflict(format!(
                    "commit conflict after {} attempts: {}",
                    attempt, e
                ))
                .into());
            }
            Err(e) => return Err(e.into()),
        }
    }
}
