//! Pull-style bridge from an observable to a bounded channel.

use crate::error::{Result, StreamError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::stream::{Observable, Subscription};
use super::types::Observer;

/// State shared by the observer side and the handle.
struct Bridge<T> {
    sender: Mutex<Option<Sender<T>>>,
    /// Set before the sender is dropped, so it is visible by the time the
    /// receiver sees the disconnect.
    failure: Mutex<Option<StreamError>>,
}

impl<T> Bridge<T> {
    fn disconnect(&self) {
        self.sender.lock().take();
    }
}

struct ChannelObserver<T> {
    bridge: Arc<Bridge<T>>,
}

impl<T: Send> Observer<T> for ChannelObserver<T> {
    fn next(&self, value: T) {
        let guard = self.bridge.sender.lock();
        let Some(sender) = guard.as_ref() else {
            return;
        };
        match sender.try_send(value) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(capacity = ?sender.capacity(), "channel full, dropping value");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    fn error(&self, err: StreamError) {
        let mut sender = self.bridge.sender.lock();
        if sender.is_some() {
            *self.bridge.failure.lock() = Some(err);
            sender.take();
        }
    }

    fn complete(&self) {
        self.bridge.disconnect();
    }
}

/// Subscription whose values are read from a channel.
///
/// Values that arrive while the buffer is full are dropped. Completion, error
/// and unsubscription disconnect the channel. Once buffered values are
/// drained, receives fail with the stream's error, or with
/// [`StreamError::Closed`] if it ended without one. The error is never lost
/// to a full buffer and keeps being reported on every later receive.
pub struct ChannelHandle<T> {
    subscription: Subscription,
    receiver: Receiver<T>,
    bridge: Arc<Bridge<T>>,
}

pub(crate) fn bridge<T: Send + 'static>(
    observable: &Observable<T>,
    capacity: usize,
) -> ChannelHandle<T> {
    let (sender, receiver) = bounded(capacity);
    let bridge = Arc::new(Bridge {
        sender: Mutex::new(Some(sender)),
        failure: Mutex::new(None),
    });
    let subscription = observable.subscribe(ChannelObserver {
        bridge: bridge.clone(),
    });
    ChannelHandle {
        subscription,
        receiver,
        bridge,
    }
}

impl<T> ChannelHandle<T> {
    /// Receive the next value (blocking).
    pub fn recv(&self) -> Result<T> {
        self.receiver.recv().map_err(|_| self.terminal())
    }

    /// Receive a value if one is buffered.
    pub fn try_recv(&self) -> Result<Option<T>> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(self.terminal()),
        }
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => StreamError::Timeout,
            RecvTimeoutError::Disconnected => self.terminal(),
        })
    }

    /// Drain everything currently buffered.
    ///
    /// Fails only when nothing is buffered and the stream has errored.
    pub fn drain(&self) -> Result<Vec<T>> {
        let values: Vec<T> = self.receiver.try_iter().collect();
        if values.is_empty() {
            if let Some(err) = self.bridge.failure.lock().clone() {
                return Err(err);
            }
        }
        Ok(values)
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// End the subscription and disconnect the channel.
    pub fn unsubscribe(&self) {
        self.subscription.unsubscribe();
        self.bridge.disconnect();
    }

    fn terminal(&self) -> StreamError {
        self.bridge
            .failure
            .lock()
            .clone()
            .unwrap_or(StreamError::Closed)
    }
}
