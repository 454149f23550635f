//! Error types for the ChatKit client.

use thiserror::Error;

/// ChatKit client error type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// HTTP client error (connect, timeout, body read).
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The user submitted an empty (or whitespace-only) message.
    #[error("message must not be empty")]
    EmptyInput,
    /// The exchange was dropped before a reply arrived.
    #[error("exchange cancelled before a reply arrived")]
    Cancelled,
    /// A thread identifier was empty.
    #[error("thread id must not be empty")]
    InvalidThreadId,
}

/// Convenience result alias for client operations.
pub type ChatResult<T> = Result<T, ChatError>;
