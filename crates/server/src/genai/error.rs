//! Error types for the generation client.

use thiserror::Error;

/// Errors that can occur when calling the generation API.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse the response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// The call did not finish in time.
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// The client could not be constructed.
    #[error("client configuration error: {0}")]
    Config(String),
}

/// Error body returned by OpenAI-compatible APIs.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// Error message.
    pub message: String,
}
