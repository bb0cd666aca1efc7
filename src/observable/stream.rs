//! Lazy push sequences.

use std::fmt;
use std::sync::Arc;

use super::channel::{self, ChannelHandle};
use super::subscriber::{Subscriber, Unsubscribable};
use super::types::{FnObserver, Observer, SubscriberId, Teardown};

type Setup<T> = dyn Fn(&Subscriber<T>) -> Teardown + Send + Sync;

/// A lazy, push-based sequence of values.
///
/// Nothing happens until `subscribe` is called; each call runs the setup
/// function once with a fresh [`Subscriber`], synchronously, and the
/// teardown it returns runs when that subscription ends.
pub struct Observable<T> {
    setup: Arc<Setup<T>>,
}

impl<T: Send + 'static> Observable<T> {
    pub fn new<F>(setup: F) -> Self
    where
        F: Fn(&Subscriber<T>) -> Teardown + Send + Sync + 'static,
    {
        Self {
            setup: Arc::new(setup),
        }
    }

    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        self.subscribe_observer(Arc::new(observer))
    }

    /// Subscribe with a plain `next` callback.
    pub fn subscribe_fn<F>(&self, next: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(FnObserver::new(next))
    }

    pub fn subscribe_observer(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let subscriber = Subscriber::new(observer);
        let teardown = (self.setup)(&subscriber);
        // A setup that already ended the subscriber gets its teardown run here.
        subscriber.add_teardown(teardown);
        Subscription {
            inner: Arc::new(subscriber),
        }
    }

    /// Subscribe through a bounded channel and pull values from it.
    pub fn into_channel(&self, capacity: usize) -> ChannelHandle<T> {
        channel::bridge(self, capacity)
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            setup: self.setup.clone(),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping it leaves the subscription running; call `unsubscribe` to end it.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<dyn Unsubscribable>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.inner.id()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// End the subscription. Calling it again does nothing.
    pub fn unsubscribe(&self) {
        self.inner.unsubscribe()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id())
            .field("closed", &self.is_closed())
            .finish()
    }
}
