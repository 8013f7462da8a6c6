use firmware_sync::SyncOnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn set_once_then_reject() {
    let cell = SyncOnceCell::new();
    assert!(!cell.is_initialized());
    assert_eq!(cell.set(String::from("layout")).map(String::as_str), Ok("layout"));
    assert_eq!(cell.set(String::from("other")), Err(String::from("other")));
    assert_eq!(cell.get().map(String::as_str), Some("layout"));
}

#[test]
fn failed_init_leaves_cell_empty() {
    let cell: SyncOnceCell<u32> = SyncOnceCell::new();
    assert_eq!(cell.try_get_or_init(|| Err::<u32, &str>("overlap")), Err("overlap"));
    assert!(cell.get().is_none());

    // a later, successful attempt still publishes
    assert_eq!(cell.try_get_or_init(|| Ok::<u32, &str>(5)), Ok(&5));
    assert_eq!(cell.try_get_or_init(|| Err::<u32, &str>("ignored")), Ok(&5));
}

#[test]
fn concurrent_readers_see_single_initialization() {
    let cell = Arc::new(SyncOnceCell::new());
    let runs = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6)
        .map(|core| {
            let cell = Arc::clone(&cell);
            let runs = Arc::clone(&runs);
            thread::spawn(move || {
                *cell.get_or_init(|| {
                    runs.fetch_add(1, Ordering::SeqCst);
                    core * 100
                })
            })
        })
        .collect();

    let seen: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(seen.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn drops_published_value() {
    let marker = Arc::new(());
    {
        let cell = SyncOnceCell::new();
        assert!(cell.set(Arc::clone(&marker)).is_ok());
        assert_eq!(Arc::strong_count(&marker), 2);
    }
    assert_eq!(Arc::strong_count(&marker), 1);
}
