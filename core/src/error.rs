//! Error types for the Zendesk API client.
//!
//! # Design
//! `NotFound` and `RateLimited` get dedicated variants because callers
//! routinely branch on them. All other non-2xx responses land in `Http` with
//! the status code and the most useful text Zendesk gave back.

use thiserror::Error;

/// Errors returned by `ZendeskClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 429. `retry_after` is the `Retry-After` header in
    /// seconds, when present and numeric.
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// List options could not be encoded as a query string.
    #[error("query encoding failed: {0}")]
    QueryEncoding(#[from] serde_urlencoded::ser::Error),

    /// The client was configured with an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
