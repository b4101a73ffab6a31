//! Session error types

use crate::resp::RedisError;

/// Errors that can occur during session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Configuration, transport or protocol failure talking to Redis
    #[error(transparent)]
    Redis(#[from] RedisError),
    /// A stored session could not be decoded, or a session could not be encoded
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The server answered with a reply that does not fit the command
    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply {
        /// Command that was sent
        command: &'static str,
        /// Debug rendering of the reply
        reply: String,
    },
}
