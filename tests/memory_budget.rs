//! Memory accounting enforcement tests.

use std::sync::Arc;
use std::thread;

use frakt_core::budget::AllocationPriority;
use frakt_core::config::EngineConfig;
use frakt_core::params::ImageSize;
use frakt_mem::{AllocationError, AllocationRegistry, FixedProbe, ResourceManager};

const GIB: u64 = 1024 * 1024 * 1024;
const CAP: u64 = 1024 * 1024;

fn manager(total: u64, available: u64) -> ResourceManager {
    ResourceManager::with_probe(
        &EngineConfig::default(),
        Box::new(FixedProbe::new(total, available)),
    )
}

#[test]
fn registry_acquire_release() {
    let registry = AllocationRegistry::new();
    assert_eq!(registry.used_bytes(), 0);

    let guard = registry
        .try_register(100 * 1024, CAP, AllocationPriority::Normal, "test")
        .expect("acquire failed");
    assert_eq!(registry.used_bytes(), 100 * 1024);
    assert_eq!(guard.bytes(), 100 * 1024);

    drop(guard);
    assert_eq!(registry.used_bytes(), 0);
}

#[test]
fn registry_exhaustion() {
    let registry = AllocationRegistry::new();
    let capacity = 500 * 1024;

    let guard1 = registry
        .try_register(400 * 1024, capacity, AllocationPriority::Normal, "a")
        .expect("first acquire failed");
    assert_eq!(registry.used_bytes(), 400 * 1024);

    // another 200KB would exceed the 500KB capacity
    assert!(registry
        .try_register(200 * 1024, capacity, AllocationPriority::Normal, "b")
        .is_none());
    assert_eq!(registry.used_bytes(), 400 * 1024);

    drop(guard1);
    assert_eq!(registry.used_bytes(), 0);

    let guard2 = registry
        .try_register(200 * 1024, capacity, AllocationPriority::Normal, "c")
        .expect("acquire after release failed");
    assert_eq!(registry.used_bytes(), 200 * 1024);
    drop(guard2);
}

#[test]
fn registry_guard_drop_is_nested_and_panic_safe() {
    let registry = AllocationRegistry::new();
    {
        let _guard1 = registry
            .try_register(100 * 1024, CAP, AllocationPriority::Normal, "outer")
            .expect("acquire failed");
        assert_eq!(registry.used_bytes(), 100 * 1024);
        {
            let _guard2 = registry
                .try_register(200 * 1024, CAP, AllocationPriority::Normal, "inner")
                .expect("acquire failed");
            assert_eq!(registry.used_bytes(), 300 * 1024);
        }
        assert_eq!(registry.used_bytes(), 100 * 1024);
    }
    assert_eq!(registry.used_bytes(), 0);
}

#[test]
fn registry_concurrent_access() {
    let registry = Arc::new(AllocationRegistry::new());
    let mut handles = vec![];

    for _ in 0..10 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            if let Some(guard) =
                registry.try_register(50 * 1024, CAP, AllocationPriority::Normal, "worker")
            {
                thread::sleep(std::time::Duration::from_millis(10));
                assert_eq!(guard.bytes(), 50 * 1024);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(registry.used_bytes(), 0);
    let full = registry
        .try_register(CAP, CAP, AllocationPriority::Normal, "full")
        .expect("full-capacity acquire after drain");
    assert_eq!(registry.used_bytes(), CAP);
    drop(full);
}

#[test]
fn registry_exact_capacity() {
    let registry = AllocationRegistry::new();
    let guard = registry
        .try_register(1024, 1024, AllocationPriority::Normal, "exact")
        .expect("exact-capacity acquire");
    assert_eq!(registry.used_bytes(), 1024);
    assert!(registry
        .try_register(1, 1024, AllocationPriority::Normal, "overflow")
        .is_none());
    drop(guard);
    assert_eq!(registry.used_bytes(), 0);
}

#[test]
fn estimate_is_monotone_in_every_argument() {
    let mut previous = 0;
    for width in [1, 64, 512, 4096] {
        let est = ResourceManager::estimate_usage(width, 512, 1000);
        assert!(est >= previous);
        previous = est;
    }
    let mut previous = 0;
    for height in [1, 64, 512, 4096] {
        let est = ResourceManager::estimate_usage(512, height, 1000);
        assert!(est >= previous);
        previous = est;
    }
    let mut previous = 0;
    for iterations in [1, 100, 1000, 10000] {
        let est = ResourceManager::estimate_usage(512, 512, iterations);
        assert!(est >= previous);
        previous = est;
    }
}

#[test]
fn tiny_available_memory_refuses_large_images() {
    let tiny = manager(8 * GIB, 1024);
    assert!(!tiny.check_availability(ResourceManager::estimate_usage(4096, 4096, 1000)));

    let err = tiny
        .allocate_grid(
            ImageSize::new(2048, 2048).expect("valid size"),
            AllocationPriority::High,
            "grid",
        )
        .unwrap_err();
    assert!(matches!(err, AllocationError::SystemOutOfMemory { .. }));
}

#[test]
fn grid_allocation_accounts_and_detaches() {
    let manager = manager(8 * GIB, 8 * GIB);
    let grid = manager
        .allocate_grid(
            ImageSize::new(128, 128).expect("valid size"),
            AllocationPriority::High,
            "render target",
        )
        .expect("allocates");
    assert_eq!(manager.statistics().accounted_bytes, 128 * 128 * 4);

    let detached = grid.into_grid();
    assert_eq!(detached.as_slice().len(), 128 * 128);
    assert_eq!(manager.statistics().accounted_bytes, 0);
    assert_eq!(manager.statistics().peak_bytes, 128 * 128 * 4);
}

#[test]
fn downgrade_plan_shrinks_until_it_fits() {
    let manager = manager(8 * GIB, 32 * 1024 * 1024); // 32 MiB available
    let plan = manager.optimize_for_large_computation(8192, 8192, 10_000);
    assert!(!plan.sufficient);

    let (w, h) = plan.suggested_size.expect("needs a smaller image");
    let downgraded = ResourceManager::estimate_usage(w, h, 1000);
    // the suggested size actually fits in the available memory
    assert!(downgraded < 32 * 1024 * 1024);
}
