//! Multicast broadcast channel.

use crate::error::StreamError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use super::stream::Observable;
use super::subscriber::Subscriber;
use super::types::{SubscriberId, Teardown};

#[derive(Clone, Debug)]
enum Stopped {
    Completed,
    Errored(StreamError),
}

struct SubjectState<T> {
    observers: Vec<Subscriber<T>>,
    stopped: Option<Stopped>,
}

/// Pushes every value to all current subscribers, in subscription order.
///
/// Late subscribers see only values pushed after they subscribed. Once
/// completed or errored the subject ignores further values and tells late
/// subscribers about the terminal event straight away.
pub struct Subject<T> {
    state: Arc<Mutex<SubjectState<T>>>,
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                observers: Vec::new(),
                stopped: None,
            })),
        }
    }

    pub fn next(&self, value: T) {
        let observers = {
            let state = self.state.lock();
            if state.stopped.is_some() {
                return;
            }
            state.observers.clone()
        };
        tracing::trace!(observers = observers.len(), "subject emit");
        for observer in observers {
            observer.next(value.clone());
        }
    }

    pub fn error(&self, err: StreamError) {
        for observer in self.stop(Stopped::Errored(err.clone())) {
            observer.error(err.clone());
        }
    }

    pub fn complete(&self) {
        for observer in self.stop(Stopped::Completed) {
            observer.complete();
        }
    }

    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped.is_some()
    }

    /// The subscribe-only facet of this subject.
    pub fn as_observable(&self) -> Observable<T> {
        let state = self.state.clone();
        Observable::new(move |subscriber: &Subscriber<T>| {
            let stopped = {
                let mut guard = state.lock();
                if guard.stopped.is_none() {
                    guard.observers.push(subscriber.clone());
                }
                guard.stopped.clone()
            };
            match stopped {
                Some(Stopped::Completed) => subscriber.complete(),
                Some(Stopped::Errored(err)) => subscriber.error(err),
                None => {}
            }

            let id = subscriber.id();
            let state = Arc::downgrade(&state);
            Teardown::new(move || {
                if let Some(state) = state.upgrade() {
                    remove_observer(&mut state.lock().observers, id);
                }
            })
        })
    }

    fn stop(&self, stopped: Stopped) -> Vec<Subscriber<T>> {
        let mut state = self.state.lock();
        if state.stopped.is_some() {
            return Vec::new();
        }
        state.stopped = Some(stopped);
        std::mem::take(&mut state.observers)
    }
}

fn remove_observer<T>(observers: &mut Vec<Subscriber<T>>, id: SubscriberId) {
    if let Some(index) = observers.iter().position(|o| o.id() == id) {
        observers.remove(index);
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Subject")
            .field("observers", &state.observers.len())
            .field("stopped", &state.stopped)
            .finish()
    }
}
