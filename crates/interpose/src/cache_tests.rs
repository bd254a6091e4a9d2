use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use interpose_core::JType;

use crate::cache::{ArtifactHandle, IdentityCache};
use crate::host::Loader;
use crate::test_utils::{RecordingLoader, artifact, counter, greeter, string, surface};

fn created(calls: &AtomicUsize, name: &str) -> Result<ArtifactHandle, String> {
    calls.fetch_add(1, Ordering::SeqCst);
    Ok(Arc::new(artifact(name)))
}

#[test]
fn second_request_reuses_artifact() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let surface = surface(vec![greeter()]);
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_create(&loader, &surface, &[], || created(&calls, "A"))
        .unwrap();
    let second = cache
        .get_or_create(&loader, &surface, &[], || created(&calls, "B"))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.name, "A");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn key_includes_constructor_args() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let surface = surface(vec![greeter()]);
    let calls = AtomicUsize::new(0);

    let plain = cache
        .get_or_create(&loader, &surface, &[], || created(&calls, "A"))
        .unwrap();
    let with_args = cache
        .get_or_create(&loader, &surface, &[string(), JType::Long], || {
            created(&calls, "B")
        })
        .unwrap();

    assert!(!Arc::ptr_eq(&plain, &with_args));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn contract_order_is_part_of_key() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let calls = AtomicUsize::new(0);

    cache
        .get_or_create(&loader, &surface(vec![greeter(), counter()]), &[], || {
            created(&calls, "A")
        })
        .unwrap();
    cache
        .get_or_create(&loader, &surface(vec![counter(), greeter()]), &[], || {
            created(&calls, "B")
        })
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn loaders_are_separate_scopes() {
    let cache = IdentityCache::new();
    let first_loader = RecordingLoader::shared();
    let second_loader = RecordingLoader::shared();
    let surface = surface(vec![greeter()]);
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_create(&first_loader, &surface, &[], || created(&calls, "A"))
        .unwrap();
    let second = cache
        .get_or_create(&second_loader, &surface, &[], || created(&calls, "B"))
        .unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(cache.loader_count(), 2);
    assert!(cache.get(&first_loader, &surface, &[]).is_some());
}

#[test]
fn concurrent_requests_generate_once() {
    const THREADS: usize = 8;

    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let surface = surface(vec![greeter(), counter()]);
    let calls = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);

    let handles: Vec<ArtifactHandle> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    cache
                        .get_or_create(&loader, &surface, &[], || {
                            std::thread::sleep(Duration::from_millis(50));
                            created(&calls, "Shared")
                        })
                        .unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
}

#[test]
fn failed_generation_leaves_no_placeholder() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let surface = surface(vec![greeter()]);
    let calls = AtomicUsize::new(0);

    let err = cache
        .get_or_create(&loader, &surface, &[], || Err::<ArtifactHandle, _>("boom".to_owned()))
        .unwrap_err();
    assert_eq!(err, "boom");
    assert!(cache.is_empty());
    assert!(cache.get(&loader, &surface, &[]).is_none());

    let retried = cache
        .get_or_create(&loader, &surface, &[], || created(&calls, "Retry"))
        .unwrap();
    assert_eq!(retried.name, "Retry");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn dropped_loader_is_expunged() {
    let cache = IdentityCache::new();
    let surface = surface(vec![greeter()]);
    let calls = AtomicUsize::new(0);

    let loader: Arc<dyn Loader> = RecordingLoader::shared();
    let handle = cache
        .get_or_create(&loader, &surface, &[], || created(&calls, "A"))
        .unwrap();
    assert_eq!(cache.loader_count(), 1);

    drop(loader);

    assert_eq!(cache.loader_count(), 0);
    assert!(cache.is_empty());
    // Handles already given out stay valid.
    assert_eq!(handle.name, "A");
}

#[test]
fn cache_does_not_keep_loader_alive() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let calls = AtomicUsize::new(0);

    cache
        .get_or_create(&loader, &surface(vec![greeter()]), &[], || {
            created(&calls, "A")
        })
        .unwrap();

    assert_eq!(Arc::strong_count(&loader), 1);
    assert_eq!(Arc::weak_count(&loader), 1);
}

#[test]
fn waiter_takes_over_after_failed_generation() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let surface = surface(vec![greeter()]);
    let calls = AtomicUsize::new(0);

    let generate = |label: &str| {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            std::thread::sleep(Duration::from_millis(50));
            return Err::<ArtifactHandle, _>("first attempt failed".to_owned());
        }
        Ok(Arc::new(artifact(label)))
    };

    let (first, second, third) = std::thread::scope(|scope| {
        let first = scope.spawn(|| cache.get_or_create(&loader, &surface, &[], || generate("A")));
        std::thread::sleep(Duration::from_millis(10));
        let second = scope.spawn(|| cache.get_or_create(&loader, &surface, &[], || generate("B")));
        let third = scope.spawn(|| {
            std::thread::sleep(Duration::from_millis(120));
            cache.get_or_create(&loader, &surface, &[], || generate("C"))
        });
        (
            first.join().unwrap(),
            second.join().unwrap(),
            third.join().unwrap(),
        )
    });

    assert_eq!(first.unwrap_err(), "first attempt failed");
    let second = second.unwrap();
    let third = third.unwrap();
    assert_eq!(second.name, "B");
    assert!(Arc::ptr_eq(&second, &third));
    assert!(Arc::ptr_eq(
        &cache.get(&loader, &surface, &[]).unwrap(),
        &second
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn failed_generation_removes_placeholder_when_nobody_waits() {
    let cache = IdentityCache::new();
    let loader = RecordingLoader::shared();
    let surface = surface(vec![greeter()]);

    for _ in 0..2 {
        cache
            .get_or_create(&loader, &surface, &[], || {
                Err::<ArtifactHandle, _>("boom".to_owned())
            })
            .unwrap_err();
        assert_eq!(cache.loader_count(), 0);
    }
}
