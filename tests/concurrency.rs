//! Subscribe/unsubscribe from several threads at once.

use multi_subject::MultiSubject;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_parallel_subscribers_keep_containers_consistent() {
    let source = Arc::new(MultiSubject::<u64>::new());
    let subscribed = Arc::new(AtomicUsize::new(0));
    let unsubscribed = Arc::new(AtomicUsize::new(0));

    let s = subscribed.clone();
    source.on_subscribe().subscribe_fn(move |info| {
        assert!(info.is_active());
        s.fetch_add(1, Ordering::SeqCst);
    });
    let u = unsubscribed.clone();
    source.on_unsubscribe().subscribe_fn(move |info| {
        assert!(!info.is_active());
        u.fetch_add(1, Ordering::SeqCst);
    });

    let threads = 8;
    let per_thread = 50;

    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let source = source.clone();
            thread::spawn(move || {
                let mut kept = Vec::new();
                for i in 0..per_thread {
                    let sub = source.subscribe_fn(|_| {});
                    if i % 2 == 0 {
                        sub.unsubscribe();
                        sub.unsubscribe();
                    } else {
                        kept.push(sub);
                    }
                }
                kept
            })
        })
        .collect();

    let kept: Vec<_> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();

    assert_eq!(source.subscriber_count(), threads * per_thread);
    assert_eq!(source.active_count(), kept.len());
    assert_eq!(subscribed.load(Ordering::SeqCst), threads * per_thread);
    assert_eq!(unsubscribed.load(Ordering::SeqCst), threads * per_thread / 2);

    // Every active handle belongs to an active record and vice versa.
    let active_ids: Vec<_> = source.active_subscribers().iter().map(|s| s.id()).collect();
    let record_ids: Vec<_> = source
        .subscribers()
        .iter()
        .filter(|info| info.is_active())
        .map(|info| info.id())
        .collect();
    assert_eq!(active_ids, record_ids);

    for sub in &kept {
        sub.unsubscribe();
    }
    assert_eq!(source.active_count(), 0);
    assert_eq!(unsubscribed.load(Ordering::SeqCst), threads * per_thread);
}
