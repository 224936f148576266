/// Error types for the dam monitoring toolkit
use thiserror::Error;

/// Main error type for monitoring data operations
#[derive(Error, Debug)]
pub enum DmsError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request failed with status {status}")]
    Status { status: u16 },

    /// Failed to parse HTTP response body
    #[error("Failed to parse response body: {0}")]
    ResponseParse(String),

    /// API envelope carried an error payload instead of data
    #[error("API error: {0}")]
    Api(String),

    /// A data request was issued without a point code
    #[error("Point code must not be empty")]
    EmptyPointCode,

    /// A window with limit 0 would request nothing
    #[error("Window limit must be greater than zero")]
    ZeroLimit,

    /// Window bounds are malformed
    #[error("Invalid observation window: {0}")]
    InvalidWindow(String),
}

/// Type alias for Results using DmsError
pub type Result<T> = std::result::Result<T, DmsError>;
