//! Stream error types

use thiserror::Error;

/// Event stream errors
#[derive(Error, Debug)]
pub enum StreamError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stream entry that cannot be turned into an `Event`
    #[error("Malformed stream entry {id}: {reason}")]
    MalformedEntry { id: String, reason: String },
}

impl StreamError {
    /// Create a malformed entry error
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        StreamError::MalformedEntry {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether Redis reported that the consumer group does not exist
    pub fn is_nogroup_error(&self) -> bool {
        matches!(self, StreamError::Redis(e) if e.to_string().contains("NOGROUP"))
    }
}
