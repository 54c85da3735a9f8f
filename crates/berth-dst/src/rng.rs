//! Deterministic RNG for simulation
//!
//! TigerStyle: ChaCha20-based RNG for reproducibility.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Deterministic random number generator
///
/// Given the same seed, produces the same sequence of values. Clones share
/// one stream.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    /// The original seed (for logging/reproduction)
    seed: u64,
    rng: Arc<Mutex<ChaCha20Rng>>,
    fork_counter: Arc<AtomicU64>,
}

impl DeterministicRng {
    /// Create a new deterministic RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            fork_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create from environment variable DST_SEED or generate random seed
    ///
    /// Always logs the seed for reproducibility.
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("DST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);

        tracing::info!(seed = seed, "DST seed (set DST_SEED={} to replay)", seed);

        Self::new(seed)
    }

    /// Seed this RNG was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn stream(&self) -> MutexGuard<'_, ChaCha20Rng> {
        // A panic while holding the lock cannot leave the stream half-updated
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Generate a random u64
    pub fn next_u64(&self) -> u64 {
        self.stream().gen()
    }

    /// Generate a random f64 in [0, 1)
    pub fn next_f64(&self) -> f64 {
        self.stream().gen()
    }

    /// Generate a random bool with given probability of true
    pub fn next_bool(&self, probability: f64) -> bool {
        debug_assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1]"
        );
        self.next_f64() < probability
    }

    /// Generate a random value in [min, max]
    pub fn next_range_inclusive(&self, min: u64, max: u64) -> u64 {
        debug_assert!(min <= max, "min must not exceed max");
        self.stream().gen_range(min..=max)
    }

    /// Generate a random index for a slice of given length
    pub fn next_index(&self, len: usize) -> usize {
        debug_assert!(len > 0, "length must be positive");
        self.stream().gen_range(0..len)
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            Some(&slice[self.next_index(slice.len())])
        }
    }

    /// Fork the RNG to create an independent stream
    ///
    /// The forked RNG is seeded deterministically from the parent.
    pub fn fork(&self) -> Self {
        let fork_id = self.fork_counter.fetch_add(1, Ordering::SeqCst);
        let fork_seed = self
            .seed
            .wrapping_add(fork_id)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15);

        Self::new(fork_seed)
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_reproducibility() {
        let rng1 = DeterministicRng::new(12345);
        let rng2 = DeterministicRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let rng1 = DeterministicRng::new(12345);
        let rng2 = DeterministicRng::new(54321);

        let seq1: Vec<_> = (0..10).map(|_| rng1.next_u64()).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.next_u64()).collect();
        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_rng_bool_extremes() {
        let rng = DeterministicRng::new(42);

        for _ in 0..100 {
            assert!(!rng.next_bool(0.0));
            assert!(rng.next_bool(1.0));
        }
    }

    #[test]
    fn test_rng_range_inclusive() {
        let rng = DeterministicRng::new(42);

        for _ in 0..100 {
            let value = rng.next_range_inclusive(10, 20);
            assert!((10..=20).contains(&value));
        }
        assert_eq!(rng.next_range_inclusive(7, 7), 7);
    }

    #[test]
    fn test_rng_fork_deterministic() {
        let a = DeterministicRng::new(12345).fork();
        let b = DeterministicRng::new(12345).fork();
        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_rng_choose() {
        let rng = DeterministicRng::new(42);
        let data = ["a", "b", "c"];

        let choice = rng.choose(&data).unwrap();
        assert!(data.contains(choice));

        let empty: [i32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
