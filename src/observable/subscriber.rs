//! Per-subscription sink handles.

use crate::error::StreamError;
use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::types::{Observer, SubscriberId, Teardown};

struct SubscriberInner<T> {
    id: SubscriberId,
    observer: Arc<dyn Observer<T>>,
    closed: AtomicBool,
    teardowns: Mutex<Vec<Teardown>>,
}

impl<T> SubscriberInner<T> {
    /// Flip to closed. Returns false if some other call got there first.
    fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    fn run_teardowns(&self) {
        // Take the list before running so a teardown can touch this subscriber.
        let teardowns = std::mem::take(&mut *self.teardowns.lock());
        tracing::trace!(subscriber = %self.id, count = teardowns.len(), "running teardowns");
        for teardown in teardowns {
            teardown.run();
        }
    }
}

/// Handle to one subscription's sink.
///
/// Cloning yields another handle to the same sink; equality and hashing go
/// by [`SubscriberId`]. Once closed (by `error`, `complete` or
/// `unsubscribe`) every further notification is ignored.
pub struct Subscriber<T> {
    inner: Arc<SubscriberInner<T>>,
}

impl<T> Subscriber<T> {
    pub(crate) fn new(observer: Arc<dyn Observer<T>>) -> Self {
        Self {
            inner: Arc::new(SubscriberInner {
                id: SubscriberId::next(),
                observer,
                closed: AtomicBool::new(false),
                teardowns: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Push a value. Returns false if the subscription has already ended.
    pub fn next(&self, value: T) -> bool {
        if self.is_closed() {
            return false;
        }
        self.inner.observer.next(value);
        true
    }

    /// Deliver an error, then end the subscription.
    pub fn error(&self, err: StreamError) {
        if self.inner.close() {
            self.inner.observer.error(err);
            self.inner.run_teardowns();
        }
    }

    /// Signal completion, then end the subscription.
    pub fn complete(&self) {
        if self.inner.close() {
            self.inner.observer.complete();
            self.inner.run_teardowns();
        }
    }

    /// End the subscription without notifying the observer.
    pub fn unsubscribe(&self) {
        if self.inner.close() {
            self.inner.run_teardowns();
        }
    }

    /// Register cleanup for when the subscription ends.
    ///
    /// Runs immediately if it has already ended.
    pub fn add_teardown(&self, teardown: Teardown) {
        if teardown.is_empty() {
            return;
        }
        {
            let mut teardowns = self.inner.teardowns.lock();
            if !self.is_closed() {
                teardowns.push(teardown);
                return;
            }
        }
        teardown.run();
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PartialEq for Subscriber<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<T> Eq for Subscriber<T> {}

impl<T> Hash for Subscriber<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Type-erased view of a subscriber, enough to end it.
pub(crate) trait Unsubscribable: Send + Sync {
    fn id(&self) -> SubscriberId;
    fn is_closed(&self) -> bool;
    fn unsubscribe(&self);
}

impl<T: Send + 'static> Unsubscribable for Subscriber<T> {
    fn id(&self) -> SubscriberId {
        Subscriber::id(self)
    }

    fn is_closed(&self) -> bool {
        Subscriber::is_closed(self)
    }

    fn unsubscribe(&self) {
        Subscriber::unsubscribe(self)
    }
}
