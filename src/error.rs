//! Error types for push sequences.

use thiserror::Error;

/// Errors carried through an observable's error channel.
///
/// Nothing on the subscribe/unsubscribe path fails; this type only travels
/// from producers to observers, and out of channel bridges.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("Stream failed: {0}")]
    Failed(String),

    #[error("Stream closed")]
    Closed,

    #[error("Timed out waiting for a value")]
    Timeout,
}

impl StreamError {
    /// Shorthand for a producer-side failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        StreamError::Failed(msg.into())
    }
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;
