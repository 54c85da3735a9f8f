//! DST tests for the name uniqueness guarantee
//!
//! Many writers race on the same names through real optimistic transactions.
//! However the commits interleave, no two live spaces may share a name.
//!
//! TigerStyle: Deterministic fault decisions, seed logged for replay.

use berth_core::{RegistryConfig, DST_FAULT_PROBABILITY_DEFAULT};
use berth_dst::{
    check_name_uniqueness, DeterministicRng, FaultConfig, FaultInjectorBuilder, FaultType,
    SimStore,
};
use berth_registry::{RegistryError, SpaceRegistry};
use berth_storage::{DocumentStore, MemoryStore};
use std::sync::Arc;
use tokio::task::JoinSet;

const COLLECTION: &str = "spaces";
const WRITERS_COUNT: usize = 16;

fn config() -> RegistryConfig {
    RegistryConfig {
        transaction_attempts_max: 20,
        retry_backoff_ms_base: 1,
        ..RegistryConfig::default()
    }
}

fn registry_over(store: &SimStore) -> SpaceRegistry {
    SpaceRegistry::with_config(Arc::new(store.clone()), config()).unwrap()
}

fn fault_free_store(rng: &DeterministicRng) -> SimStore {
    let injector = FaultInjectorBuilder::new(rng.fork()).build();
    SimStore::new(rng.clone(), Arc::new(injector))
}

async fn assert_unique(store: &MemoryStore) {
    let docs = store.scan_all(COLLECTION).await.unwrap();
    if let Err(violation) = check_name_uniqueness(&docs) {
        panic!("{}", violation);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_same_name() {
    let rng = DeterministicRng::from_env_or_random();
    let store = fault_free_store(&rng);
    let registry = registry_over(&store);

    let mut tasks = JoinSet::new();
    for i in 0..WRITERS_COUNT {
        let registry = registry.clone();
        tasks.spawn(async move { registry.create("P1", i % 2 == 0).await });
    }

    let mut created = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => created += 1,
            Err(RegistryError::NameConflict { .. }) | Err(RegistryError::Contention { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(created, 1, "exactly one create must win");
    assert_eq!(store.inner().len(COLLECTION).await, 1);
    assert_unique(store.inner()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renames_to_same_target() {
    let rng = DeterministicRng::from_env_or_random();
    let store = fault_free_store(&rng);
    let registry = registry_over(&store);

    for i in 0..WRITERS_COUNT {
        registry.create(&format!("S{}", i), false).await.unwrap();
    }

    let mut tasks = JoinSet::new();
    for i in 0..WRITERS_COUNT {
        let registry = registry.clone();
        tasks.spawn(async move { registry.rename(&format!("S{}", i), "TARGET").await });
    }

    let mut renamed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(()) => renamed += 1,
            Err(RegistryError::NameConflict { .. }) | Err(RegistryError::Contention { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(renamed, 1, "exactly one rename must win");
    assert_eq!(store.inner().len(COLLECTION).await, WRITERS_COUNT);
    assert!(registry.get("TARGET").await.unwrap().is_some());
    assert_unique(store.inner()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_create_and_rename_race_for_name() {
    let rng = DeterministicRng::from_env_or_random();
    let store = fault_free_store(&rng);
    let registry = registry_over(&store);

    registry.create("OLD", true).await.unwrap();

    let creator = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.create("NEW", false).await.map(|_| ()) })
    };
    let renamer = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.rename("OLD", "NEW").await })
    };

    let outcomes = [creator.await.unwrap(), renamer.await.unwrap()];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert_unique(store.inner()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_operation_mix_preserves_uniqueness() {
    const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];
    const ROUNDS_COUNT: usize = 40;
    const BATCH_SIZE: usize = 4;

    let rng = DeterministicRng::from_env_or_random();
    let injector = FaultInjectorBuilder::new(rng.fork())
        .with_commit_faults(0.05)
        .with_fault(FaultConfig::new(
            FaultType::StorageReadFail,
            DST_FAULT_PROBABILITY_DEFAULT,
        ))
        .build();
    let store = SimStore::new(rng.fork(), Arc::new(injector));
    let registry = registry_over(&store);

    for _ in 0..ROUNDS_COUNT {
        let mut tasks = JoinSet::new();

        for _ in 0..BATCH_SIZE {
            let registry = registry.clone();
            let name = *rng.choose(&NAMES).unwrap();
            let other = *rng.choose(&NAMES).unwrap();
            let occupied = rng.next_bool(0.5);

            match rng.next_index(4) {
                0 => tasks.spawn(async move { registry.create(name, occupied).await.map(|_| ()) }),
                1 => tasks.spawn(async move { registry.rename(name, other).await }),
                2 => tasks.spawn(async move {
                    registry
                        .update(name, Some(other), Some(occupied))
                        .await
                }),
                _ => tasks.spawn(async move { registry.delete(name).await.map(|_| ()) }),
            };
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(RegistryError::Timeout { .. }) = joined.unwrap() {
                panic!("no latency is injected, operations must not time out");
            }
        }

        assert_unique(store.inner()).await;
    }

    assert!(store.inner().len(COLLECTION).await <= NAMES.len());
}
