//! Fault injection for deterministic testing
//!
//! TigerStyle: Explicit fault types, probabilistic injection.

use crate::rng::DeterministicRng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Types of faults that can be injected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultType {
    /// A read against the store fails
    StorageReadFail,
    /// A write, or a commit, against the store fails
    StorageWriteFail,
    /// A store operation is delayed, then proceeds
    StorageLatency { min_ms: u64, max_ms: u64 },
    /// Commit-time validation reports a concurrent writer
    TransactionConflict,
    /// The store goes away mid-commit; nothing is applied
    CrashDuringTransaction,
}

impl FaultType {
    /// Get a human-readable name for this fault type
    pub fn name(&self) -> &'static str {
        match self {
            FaultType::StorageReadFail => "storage_read_fail",
            FaultType::StorageWriteFail => "storage_write_fail",
            FaultType::StorageLatency { .. } => "storage_latency",
            FaultType::TransactionConflict => "transaction_conflict",
            FaultType::CrashDuringTransaction => "crash_during_transaction",
        }
    }
}

/// One injection rule: which fault, how often, and where
#[derive(Debug, Clone)]
pub struct FaultConfig {
    pub fault_type: FaultType,
    /// Chance of firing per eligible operation, in [0, 1]
    pub probability: f64,
    /// Substring an operation name must contain to be eligible
    pub operation_filter: Option<String>,
    /// Stop firing after this many injections
    pub max_triggers: Option<u64>,
}

impl FaultConfig {
    /// Rule firing `fault_type` with `probability` on every operation
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1]"
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_triggers: None,
        }
    }

    /// Restrict the rule to operations whose name contains `filter`
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Cap the number of injections
    pub fn max_triggers(mut self, max: u64) -> Self {
        self.max_triggers = Some(max);
        self
    }
}

#[derive(Debug)]
struct Rule {
    config: FaultConfig,
    triggers: AtomicU64,
}

impl Rule {
    fn eligible(&self, operation: &str) -> bool {
        let filtered_in = self
            .config
            .operation_filter
            .as_deref()
            .map_or(true, |filter| operation.contains(filter));
        filtered_in && !self.exhausted()
    }

    fn exhausted(&self) -> bool {
        self.config
            .max_triggers
            .is_some_and(|max| self.triggers.load(Ordering::SeqCst) >= max)
    }
}

/// Decides, per operation, whether a registered fault fires
///
/// Every decision draws from one seeded stream, so a run replays exactly
/// under the same seed and operation order.
#[derive(Debug)]
pub struct FaultInjector {
    rules: Vec<Rule>,
    rng: DeterministicRng,
}

impl FaultInjector {
    /// Injector with no rules
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rules: Vec::new(),
            rng,
        }
    }

    /// Add a rule; earlier rules take precedence
    pub fn register(&mut self, config: FaultConfig) {
        self.rules.push(Rule {
            config,
            triggers: AtomicU64::new(0),
        });
    }

    /// The fault to inject into `operation`, if any
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        let rule = self
            .rules
            .iter()
            .filter(|rule| rule.eligible(operation))
            .find(|rule| self.rng.next_bool(rule.config.probability))?;

        let triggers = rule.triggers.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            fault = rule.config.fault_type.name(),
            operation,
            triggers,
            "Injecting fault"
        );

        Some(rule.config.fault_type.clone())
    }

    /// Injections so far of faults named `fault_name`
    pub fn trigger_count(&self, fault_name: &str) -> u64 {
        self.rules
            .iter()
            .filter(|rule| rule.config.fault_type.name() == fault_name)
            .map(|rule| rule.triggers.load(Ordering::SeqCst))
            .sum()
    }

    /// Injections so far across all rules
    pub fn total_triggers(&self) -> u64 {
        self.rules
            .iter()
            .map(|rule| rule.triggers.load(Ordering::SeqCst))
            .sum()
    }

    /// Number of registered rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Builder for creating a FaultInjector with multiple faults
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    faults: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            faults: Vec::new(),
        }
    }

    /// Add a fault configuration
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.faults.push(config);
        self
    }

    /// Add read and write failures with the given probability
    pub fn with_storage_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::StorageWriteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, probability))
    }

    /// Add commit conflicts and mid-commit crashes with the given probability
    pub fn with_commit_faults(self, probability: f64) -> Self {
        self.with_fault(
            FaultConfig::new(FaultType::TransactionConflict, probability)
                .with_filter("transaction_commit"),
        )
        .with_fault(
            FaultConfig::new(FaultType::CrashDuringTransaction, probability / 2.0)
                .with_filter("transaction_commit"),
        )
    }

    /// Build the fault injector
    pub fn build(self) -> FaultInjector {
        let mut injector = FaultInjector::new(self.rng);
        for config in self.faults {
            injector.register(config);
        }
        injector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injector_with(config: FaultConfig) -> FaultInjector {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(config);
        injector
    }

    #[test]
    fn test_certain_fault_always_fires() {
        let injector = injector_with(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        for _ in 0..10 {
            assert_eq!(
                injector.should_inject("storage_write"),
                Some(FaultType::StorageWriteFail)
            );
        }
        assert_eq!(injector.total_triggers(), 10);
        assert_eq!(injector.trigger_count("storage_write_fail"), 10);
    }

    #[test]
    fn test_impossible_fault_never_fires() {
        let injector = injector_with(FaultConfig::new(FaultType::StorageWriteFail, 0.0));

        for _ in 0..100 {
            assert!(injector.should_inject("storage_write").is_none());
        }
        assert_eq!(injector.total_triggers(), 0);
    }

    #[test]
    fn test_filter_limits_operations() {
        let injector = injector_with(
            FaultConfig::new(FaultType::TransactionConflict, 1.0).with_filter("commit"),
        );

        assert!(injector.should_inject("transaction_commit").is_some());
        assert!(injector.should_inject("transaction_read").is_none());
        assert!(injector.should_inject("storage_write").is_none());
    }

    #[test]
    fn test_max_triggers_caps_injections() {
        let injector =
            injector_with(FaultConfig::new(FaultType::StorageReadFail, 1.0).max_triggers(2));

        assert!(injector.should_inject("storage_read").is_some());
        assert!(injector.should_inject("storage_read").is_some());
        assert!(injector.should_inject("storage_read").is_none());
        assert_eq!(injector.trigger_count("storage_read_fail"), 2);
    }

    #[test]
    fn test_first_eligible_rule_wins() {
        let mut injector = FaultInjector::new(DeterministicRng::new(7));
        injector.register(FaultConfig::new(FaultType::StorageReadFail, 1.0).with_filter("read"));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        assert_eq!(
            injector.should_inject("storage_read"),
            Some(FaultType::StorageReadFail)
        );
        assert_eq!(
            injector.should_inject("storage_write"),
            Some(FaultType::StorageWriteFail)
        );
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let decisions = |seed| {
            let mut injector = FaultInjector::new(DeterministicRng::new(seed));
            injector.register(FaultConfig::new(FaultType::StorageReadFail, 0.5));
            (0..64)
                .map(|_| injector.should_inject("storage_read").is_some())
                .collect::<Vec<_>>()
        };

        assert_eq!(decisions(99), decisions(99));
    }

    #[test]
    fn test_builder_registers_rules() {
        let injector = FaultInjectorBuilder::new(DeterministicRng::new(42))
            .with_storage_faults(0.1)
            .with_commit_faults(0.05)
            .build();

        assert_eq!(injector.rule_count(), 4);
    }

    #[test]
    fn test_fault_type_names() {
        assert_eq!(FaultType::StorageWriteFail.name(), "storage_write_fail");
        assert_eq!(
            FaultType::StorageLatency {
                min_ms: 1,
                max_ms: 2
            }
            .name(),
            "storage_latency"
        );
    }
}
