//! Building blocks shared by observables, subscribers and subjects.

use crate::error::StreamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a single subscription's sink.
///
/// Ids are unique within the process and increase with creation order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

impl SubscriberId {
    pub(crate) fn next() -> Self {
        SubscriberId(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receives the notifications of one subscription.
///
/// At most one of `error`/`complete` is ever delivered, and nothing follows it.
pub trait Observer<T>: Send + Sync {
    fn next(&self, value: T);

    fn error(&self, _err: StreamError) {}

    fn complete(&self) {}
}

/// Bare closures observe values only.
impl<T, F> Observer<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn next(&self, value: T) {
        self(value)
    }
}

type NextFn<T> = Box<dyn Fn(T) + Send + Sync>;
type ErrorFn = Box<dyn Fn(StreamError) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;

/// Observer assembled from closures.
pub struct FnObserver<T> {
    next: NextFn<T>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
}

impl<T> FnObserver<T> {
    pub fn new<F>(next: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            error: None,
            complete: None,
        }
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(StreamError) + Send + Sync + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.complete = Some(Box::new(f));
        self
    }
}

impl<T> Observer<T> for FnObserver<T> {
    fn next(&self, value: T) {
        (self.next)(value)
    }

    fn error(&self, err: StreamError) {
        if let Some(ref f) = self.error {
            f(err);
        }
    }

    fn complete(&self) {
        if let Some(ref f) = self.complete {
            f();
        }
    }
}

/// Cleanup returned by an observable's setup, run when the subscription ends.
#[derive(Default)]
pub struct Teardown(Option<Box<dyn FnOnce() + Send>>);

impl Teardown {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Teardown(Some(Box::new(f)))
    }

    /// A teardown with nothing to clean up.
    pub fn empty() -> Self {
        Teardown(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn run(self) {
        if let Some(f) = self.0 {
            f();
        }
    }
}

impl<F> From<F> for Teardown
where
    F: FnOnce() + Send + 'static,
{
    fn from(f: F) -> Self {
        Teardown::new(f)
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("empty", &self.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_subscriber_ids_increase() {
        let a = SubscriberId::next();
        let b = SubscriberId::next();
        assert!(b > a);
    }

    #[test]
    fn test_fn_observer_routes_notifications() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let observer = FnObserver::new(move |v: i32| l1.lock().push(format!("next {}", v)))
            .on_error(move |e| l2.lock().push(format!("error {}", e)))
            .on_complete(move || l3.lock().push("complete".to_string()));

        observer.next(7);
        observer.error(StreamError::failed("boom"));
        observer.complete();

        assert_eq!(
            *log.lock(),
            vec!["next 7", "error Stream failed: boom", "complete"]
        );
    }

    #[test]
    fn test_fn_observer_without_handlers_ignores_terminal_events() {
        let observer = FnObserver::new(|_: i32| {});
        observer.error(StreamError::Closed);
        observer.complete();
    }

    #[test]
    fn test_closure_is_an_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let observer = move |v: i32| s.lock().push(v);

        Observer::next(&observer, 3);
        Observer::error(&observer, StreamError::Closed);
        Observer::complete(&observer);

        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_teardown_runs_closure() {
        let ran = Arc::new(Mutex::new(false));
        let r = ran.clone();
        let teardown = Teardown::from(move || *r.lock() = true);
        assert!(!teardown.is_empty());

        teardown.run();
        assert!(*ran.lock());
        assert!(Teardown::empty().is_empty());
    }
}
