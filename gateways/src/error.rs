//! Gateway error types.

use thiserror::Error;

/// Result type for gateway calls.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failures talking to an external service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Credentials or settings are missing.
    #[error("Gateway not configured: {0}")]
    Configuration(String),

    /// Transport-level failure (DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("Gateway rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or summary.
        message: String,
    },

    /// The service answered with something we could not decode.
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// The caller supplied unusable input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Email could not be built or delivered.
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    /// Local filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
