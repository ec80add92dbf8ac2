//! Judgment producer abstraction.

use async_trait::async_trait;
use sri_core::{Judgment, Profile};

/// Errors a judgment producer can report.
///
/// None of these reach a caller of the service: the decision gate turns
/// them into the failure sentinel judgment.
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// Transport-level failure talking to the model API
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request did not complete in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Model API answered with a non-success status
    #[error("upstream error (status {status}): {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Model API answered without any content
    #[error("empty reply from model")]
    EmptyReply,

    /// Model reply could not be read as a judgment
    #[error("malformed judgment: {0}")]
    Malformed(String),

    /// Producer is not usable as configured
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProducerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProducerError::Timeout(err.to_string())
        } else {
            ProducerError::Http(err.to_string())
        }
    }
}

/// Result alias for producer calls.
pub type Result<T> = std::result::Result<T, ProducerError>;

/// Produces a recommendation judgment for a client profile.
///
/// Implementations may block on network I/O. They report failure through
/// [`ProducerError`] and must not panic.
#[async_trait]
pub trait JudgmentProducer: Send + Sync {
    /// Produce a judgment for the given profile.
    async fn produce_judgment(&self, profile: &Profile) -> Result<Judgment>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
