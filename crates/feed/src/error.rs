//! Feed error types

use thiserror::Error;

/// Errors raised by the transport
#[derive(Error, Debug)]
pub enum FeedError {
    /// Nobody is listening on the topic
    #[error("Topic '{0}' has no subscribers")]
    NoSubscribers(String),
}

/// Result type for feed operations
pub type FeedResult<T> = std::result::Result<T, FeedError>;
