//! # Multi Subject
//!
//! A multicast observable that gives each subscriber its own, independently
//! driven sequence of values, and keeps track of who is listening.
//!
//! ## Core Concepts
//!
//! - **Observables**: Lazy push sequences with per-subscription teardown
//! - **Subjects**: Broadcast one value to every current subscriber
//! - **MultiSubject**: Per-subscriber sinks plus lifecycle tracking
//! - **Lifecycle streams**: `on_subscribe` / `on_unsubscribe` announcements
//!
//! ## Example
//!
//! ```
//! use multi_subject::MultiSubject;
//! use std::sync::{Arc, Mutex};
//!
//! let source = MultiSubject::<u32>::new();
//!
//! let left = Arc::new(Mutex::new(Vec::new()));
//! let l = left.clone();
//! let left_sub = source.subscribe_fn(move |v| l.lock().unwrap().push(v));
//!
//! let right = Arc::new(Mutex::new(Vec::new()));
//! let r = right.clone();
//! source.subscribe_fn(move |v| r.lock().unwrap().push(v));
//!
//! // Each active subscriber gets its own value.
//! for (i, subscriber) in source.active_subscribers().iter().enumerate() {
//!     subscriber.next(i as u32);
//! }
//! assert_eq!(*left.lock().unwrap(), vec![0]);
//! assert_eq!(*right.lock().unwrap(), vec![1]);
//!
//! left_sub.unsubscribe();
//! assert_eq!(source.subscriber_count(), 2);
//! assert_eq!(source.active_count(), 1);
//! ```

pub mod error;
pub mod multi_subject;
pub mod observable;

// Re-exports
pub use error::{Result, StreamError};
pub use multi_subject::{LifecycleEntry, MultiSubject, MultiSubjectConfig, SubscriberInfo};
pub use observable::{
    ChannelHandle, FnObserver, Observable, Observer, Subject, Subscriber, SubscriberId,
    Subscription, Teardown,
};
