//! Lifecycle records and configuration for [`MultiSubject`](super::MultiSubject).

use crate::observable::{Subscriber, SubscriberId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Configuration for a multi-subject.
#[derive(Clone, Debug)]
pub struct MultiSubjectConfig {
    /// Name attached to this instance's log events.
    /// Default: "multi_subject"
    pub label: String,
}

impl Default for MultiSubjectConfig {
    fn default() -> Self {
        Self {
            label: "multi_subject".to_string(),
        }
    }
}

struct InfoInner<T> {
    subscriber: Subscriber<T>,
    active: AtomicBool,
}

/// Lifecycle record of one subscription.
///
/// Clones share state: the record kept in the history, the one emitted on
/// subscribe and the one emitted on unsubscribe are the same record, so the
/// `active` flip is visible through all of them. Once inactive, a record
/// never becomes active again.
pub struct SubscriberInfo<T> {
    inner: Arc<InfoInner<T>>,
}

impl<T> SubscriberInfo<T> {
    pub(crate) fn new(subscriber: Subscriber<T>) -> Self {
        Self {
            inner: Arc::new(InfoInner {
                subscriber,
                active: AtomicBool::new(true),
            }),
        }
    }

    /// The subscription's sink. Push values here to reach this subscriber only.
    pub fn subscriber(&self) -> &Subscriber<T> {
        &self.inner.subscriber
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.subscriber.id()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Mark inactive. Returns false if it already was.
    pub(crate) fn deactivate(&self) -> bool {
        self.inner.active.swap(false, Ordering::SeqCst)
    }

    /// Handle that does not keep the record (or its subscriber) alive.
    pub(crate) fn downgrade(&self) -> WeakSubscriberInfo<T> {
        WeakSubscriberInfo {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn entry(&self) -> LifecycleEntry {
        LifecycleEntry {
            id: self.id(),
            active: self.is_active(),
        }
    }
}

impl<T> Clone for SubscriberInfo<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub(crate) struct WeakSubscriberInfo<T> {
    inner: Weak<InfoInner<T>>,
}

impl<T> WeakSubscriberInfo<T> {
    pub(crate) fn upgrade(&self) -> Option<SubscriberInfo<T>> {
        self.inner.upgrade().map(|inner| SubscriberInfo { inner })
    }
}

impl<T> PartialEq for SubscriberInfo<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for SubscriberInfo<T> {}

impl<T> fmt::Debug for SubscriberInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberInfo")
            .field("id", &self.id())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Point-in-time summary of a lifecycle record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEntry {
    pub id: SubscriberId,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::FnObserver;

    fn info() -> SubscriberInfo<u8> {
        SubscriberInfo::new(Subscriber::new(Arc::new(FnObserver::new(|_: u8| {}))))
    }

    #[test]
    fn test_deactivate_is_one_way() {
        let info = info();
        let shared = info.clone();
        assert!(info.is_active());

        assert!(info.deactivate());
        assert!(!shared.is_active());
        assert!(!shared.deactivate());
        assert!(!info.is_active());
    }

    #[test]
    fn test_weak_handle_does_not_keep_record_alive() {
        let info = info();
        let weak = info.downgrade();
        assert_eq!(weak.upgrade(), Some(info.clone()));

        drop(info);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_entry_serializes() {
        let info = info();
        info.deactivate();

        let json = serde_json::to_value(info.entry()).unwrap();
        assert_eq!(json["id"], info.id().0);
        assert_eq!(json["active"], false);
    }

    #[test]
    fn test_default_config_label() {
        assert_eq!(MultiSubjectConfig::default().label, "multi_subject");
    }
}
