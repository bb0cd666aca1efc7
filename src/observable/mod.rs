//! Synchronous push sequences.
//!
//! This module provides the small reactive core the rest of the crate is
//! built on:
//! - [`Observable`]: lazy sequence, set up once per subscription
//! - [`Subscriber`]: the sink a producer pushes into
//! - [`Subject`]: multicast to every current subscriber
//! - [`ChannelHandle`]: pull values out through a bounded channel
//!
//! Everything runs in the calling thread; there are no schedulers.
//!
//! # Example
//!
//! ```
//! use multi_subject::{Observable, Subscriber, Teardown};
//!
//! let numbers = Observable::new(|subscriber: &Subscriber<u32>| {
//!     for n in 1..=3 {
//!         subscriber.next(n);
//!     }
//!     subscriber.complete();
//!     Teardown::empty()
//! });
//!
//! let handle = numbers.into_channel(8);
//! assert_eq!(handle.drain().unwrap(), vec![1, 2, 3]);
//! ```

mod channel;
mod stream;
mod subject;
mod subscriber;
mod types;

pub use channel::ChannelHandle;
pub use stream::{Observable, Subscription};
pub use subject::Subject;
pub use subscriber::Subscriber;
pub use types::{FnObserver, Observer, SubscriberId, Teardown};
