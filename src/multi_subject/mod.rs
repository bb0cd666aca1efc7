//! Multicast source that tracks every subscriber's lifecycle.
//!
//! For each subscription a [`SubscriberInfo`] record is kept forever in the
//! history, the subscriber is listed as active until its subscription ends,
//! and both transitions are announced on dedicated streams:
//! - `on_subscribe` fires with the fresh, active record
//! - `on_unsubscribe` fires with the same record, now inactive

mod emitter;
mod types;

pub use emitter::MultiSubject;
pub use types::{LifecycleEntry, MultiSubjectConfig, SubscriberInfo};
