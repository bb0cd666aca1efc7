//! Multicast source with per-subscriber lifecycle tracking.

use crate::observable::{
    ChannelHandle, FnObserver, Observable, Observer, Subject, Subscriber, Subscription, Teardown,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::types::{LifecycleEntry, MultiSubjectConfig, SubscriberInfo};

/// Tracking containers. Both live under one lock so a record is active
/// exactly when its subscriber is listed in `active`.
struct Registry<T> {
    /// Every record ever created, in subscription order. Append-only.
    history: Vec<SubscriberInfo<T>>,
    /// Subscribers whose record is still active, in subscription order.
    active: Vec<Subscriber<T>>,
}

struct Shared<T> {
    label: String,
    registry: Mutex<Registry<T>>,
    on_subscribe: Subject<SubscriberInfo<T>>,
    on_unsubscribe: Subject<SubscriberInfo<T>>,
}

impl<T: Send + 'static> Shared<T> {
    fn attach(self: &Arc<Self>, subscriber: &Subscriber<T>) -> Teardown {
        let info = SubscriberInfo::new(subscriber.clone());

        let (total, active) = {
            let mut registry = self.registry.lock();
            registry.history.push(info.clone());
            registry.active.push(subscriber.clone());
            (registry.history.len(), registry.active.len())
        };
        debug!(
            label = %self.label,
            subscriber = %info.id(),
            total,
            active,
            "subscriber attached"
        );

        self.on_subscribe.next(info.clone());

        // Both weak: the history keeps the record, the record keeps the
        // subscriber, and the subscriber keeps this teardown.
        let shared = Arc::downgrade(self);
        let record = info.downgrade();
        Teardown::new(move || {
            let Some(info) = record.upgrade() else {
                return;
            };
            match shared.upgrade() {
                Some(shared) => shared.detach(&info),
                None => {
                    info.deactivate();
                }
            }
        })
    }

    fn detach(&self, info: &SubscriberInfo<T>) {
        let active = {
            let mut registry = self.registry.lock();
            if !info.deactivate() {
                return;
            }
            let id = info.id();
            if let Some(index) = registry.active.iter().position(|s| s.id() == id) {
                registry.active.remove(index);
            }
            registry.active.len()
        };
        debug!(
            label = %self.label,
            subscriber = %info.id(),
            active,
            "subscriber detached"
        );

        self.on_unsubscribe.next(info.clone());
    }
}

/// An observable that hands every subscriber its own sink instead of
/// broadcasting one shared sequence.
///
/// The multi-subject never pushes values itself. Callers pick subscribers out
/// of [`active_subscribers`](Self::active_subscribers) or the
/// [`on_subscribe`](Self::on_subscribe) stream and drive each one
/// independently.
///
/// # Example
///
/// ```
/// use multi_subject::MultiSubject;
///
/// let source = MultiSubject::<String>::new();
///
/// // Greet every subscriber by its id.
/// source.on_subscribe().subscribe_fn(|info| {
///     info.subscriber().next(format!("hello #{}", info.id()));
/// });
///
/// let sub = source.subscribe_fn(|msg| println!("{}", msg));
/// assert_eq!(source.active_count(), 1);
///
/// sub.unsubscribe();
/// assert_eq!(source.active_count(), 0);
/// assert!(!source.subscribers()[0].is_active());
/// ```
pub struct MultiSubject<T> {
    shared: Arc<Shared<T>>,
    observable: Observable<T>,
    on_subscribe: Observable<SubscriberInfo<T>>,
    on_unsubscribe: Observable<SubscriberInfo<T>>,
}

impl<T: Send + 'static> MultiSubject<T> {
    pub fn new() -> Self {
        Self::with_config(MultiSubjectConfig::default())
    }

    pub fn with_config(config: MultiSubjectConfig) -> Self {
        let on_subscribe = Subject::new();
        let on_unsubscribe = Subject::new();
        let on_subscribe_stream = on_subscribe.as_observable();
        let on_unsubscribe_stream = on_unsubscribe.as_observable();

        let shared = Arc::new(Shared {
            label: config.label,
            registry: Mutex::new(Registry {
                history: Vec::new(),
                active: Vec::new(),
            }),
            on_subscribe,
            on_unsubscribe,
        });

        let setup_shared = shared.clone();
        let observable =
            Observable::new(move |subscriber: &Subscriber<T>| setup_shared.attach(subscriber));

        Self {
            shared,
            observable,
            on_subscribe: on_subscribe_stream,
            on_unsubscribe: on_unsubscribe_stream,
        }
    }

    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        self.observable.subscribe(observer)
    }

    pub fn subscribe_fn<F>(&self, next: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.observable.subscribe(FnObserver::new(next))
    }

    /// Subscribe through a bounded channel.
    pub fn into_channel(&self, capacity: usize) -> ChannelHandle<T> {
        self.observable.into_channel(capacity)
    }

    /// This multi-subject as a plain observable; subscribing to it is the
    /// same as subscribing here.
    pub fn as_observable(&self) -> Observable<T> {
        self.observable.clone()
    }

    /// Every lifecycle record so far, in subscription order.
    pub fn subscribers(&self) -> Vec<SubscriberInfo<T>> {
        self.shared.registry.lock().history.clone()
    }

    /// Sinks of the subscriptions still running, in subscription order.
    pub fn active_subscribers(&self) -> Vec<Subscriber<T>> {
        self.shared.registry.lock().active.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.registry.lock().history.len()
    }

    pub fn active_count(&self) -> usize {
        self.shared.registry.lock().active.len()
    }

    /// Emits each new record, already active, as its subscription starts.
    pub fn on_subscribe(&self) -> Observable<SubscriberInfo<T>> {
        self.on_subscribe.clone()
    }

    /// Emits each record, already inactive, as its subscription ends.
    pub fn on_unsubscribe(&self) -> Observable<SubscriberInfo<T>> {
        self.on_unsubscribe.clone()
    }

    /// Id/active summary of the whole history.
    pub fn lifecycle(&self) -> Vec<LifecycleEntry> {
        self.shared
            .registry
            .lock()
            .history
            .iter()
            .map(SubscriberInfo::entry)
            .collect()
    }
}

impl<T: Send + 'static> Default for MultiSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MultiSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.registry.lock();
        f.debug_struct("MultiSubject")
            .field("label", &self.shared.label)
            .field("subscribers", &registry.history.len())
            .field("active", &registry.active.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::SubscriberId;

    fn ids<T>(subscribers: &[Subscriber<T>]) -> Vec<SubscriberId> {
        subscribers.iter().map(|s| s.id()).collect()
    }

    #[test]
    fn test_setup_records_before_announcing() {
        let source = Arc::new(MultiSubject::<u8>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (src, s) = (source.clone(), seen.clone());
        source.on_subscribe().subscribe_fn(move |info| {
            // Containers are already updated when the event fires.
            s.lock().push((
                info.is_active(),
                src.subscriber_count(),
                ids(&src.active_subscribers()),
            ));
        });

        let sub = source.subscribe_fn(|_| {});

        assert_eq!(*seen.lock(), vec![(true, 1, vec![sub.id()])]);
    }

    #[test]
    fn test_teardown_updates_before_announcing() {
        let source = Arc::new(MultiSubject::<u8>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (src, s) = (source.clone(), seen.clone());
        source.on_unsubscribe().subscribe_fn(move |info| {
            s.lock().push((info.is_active(), src.active_count()));
        });

        let sub = source.subscribe_fn(|_| {});
        sub.unsubscribe();

        assert_eq!(*seen.lock(), vec![(false, 0)]);
    }

    #[test]
    fn test_each_subscriber_gets_its_own_values() {
        let source = MultiSubject::<u32>::new();
        let a_seen = Arc::new(Mutex::new(Vec::new()));
        let b_seen = Arc::new(Mutex::new(Vec::new()));

        let a = a_seen.clone();
        source.subscribe_fn(move |v| a.lock().push(v));
        let b = b_seen.clone();
        source.subscribe_fn(move |v| b.lock().push(v));

        for (i, subscriber) in source.active_subscribers().iter().enumerate() {
            subscriber.next(i as u32 * 100);
        }

        assert_eq!(*a_seen.lock(), vec![0]);
        assert_eq!(*b_seen.lock(), vec![100]);
    }

    #[test]
    fn test_completing_a_subscriber_ends_its_lifecycle() {
        let source = MultiSubject::<u8>::new();
        let completed = Arc::new(Mutex::new(false));

        let c = completed.clone();
        let sub = source
            .subscribe(FnObserver::new(|_: u8| {}).on_complete(move || *c.lock() = true));
        source.active_subscribers()[0].complete();

        assert!(*completed.lock());
        assert!(sub.is_closed());
        assert_eq!(source.active_count(), 0);
        assert_eq!(
            source.lifecycle(),
            vec![LifecycleEntry {
                id: sub.id(),
                active: false
            }]
        );
    }

    #[test]
    fn test_dropped_source_leaves_teardown_harmless() {
        let source = MultiSubject::<u8>::new();
        let sub = source.subscribe_fn(|_| {});
        let info = source.subscribers().remove(0);
        drop(source);

        sub.unsubscribe();
        assert!(!info.is_active());
    }

    #[test]
    fn test_dropped_subscription_releases_observer() {
        let source = MultiSubject::<u8>::new();
        let captured = Arc::new(());

        let c = captured.clone();
        let sub = source.subscribe_fn(move |_| {
            let _ = &c;
        });
        assert_eq!(Arc::strong_count(&captured), 2);

        // Never unsubscribed: dropping both ends must still free the observer.
        drop(sub);
        drop(source);

        assert_eq!(Arc::strong_count(&captured), 1);
    }

    #[test]
    fn test_config_label_in_debug_output() {
        let source = MultiSubject::<u8>::with_config(MultiSubjectConfig {
            label: "feeds".to_string(),
        });
        source.subscribe_fn(|_| {});

        let debug = format!("{:?}", source);
        assert!(debug.contains("feeds"));
        assert!(debug.contains("active: 1"));
    }
}
