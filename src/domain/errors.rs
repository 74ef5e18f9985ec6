//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("chat platform error: {0}")]
    Chat(String),

    #[error("social client error: {0}")]
    Social(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Sender id could not be parsed as a numeric user id.
    #[error("invalid sender id {0:?}")]
    InvalidSender(String),

    #[error("configuration error: {0}")]
    Config(String),
}
