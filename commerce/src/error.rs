//! Commerce errors.

use clientdesk_core::MoneyError;
use clientdesk_core::store::StoreError;
use clientdesk_gateways::GatewayError;
use thiserror::Error;

/// Result type for commerce operations.
pub type Result<T> = std::result::Result<T, CommerceError>;

/// Errors raised by catalog, cart, checkout, voucher, task and document
/// operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The addressed record does not exist.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of record.
        resource: &'static str,
        /// Requested id.
        id: String,
    },

    /// The caller may not touch this record.
    #[error("{0}")]
    Forbidden(String),

    /// Checkout payment could not be verified.
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    /// A gateway is missing credentials.
    #[error("{0}")]
    GatewayConfiguration(String),

    /// A gateway call on the critical path failed.
    #[error("Gateway error: {0}")]
    Gateway(GatewayError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommerceError {
    pub(crate) fn not_found(resource: &'static str, id: &str) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<GatewayError> for CommerceError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Configuration(message) => Self::GatewayConfiguration(message),
            GatewayError::InvalidInput(message) => Self::Validation(message),
            other => Self::Gateway(other),
        }
    }
}

impl From<MoneyError> for CommerceError {
    fn from(err: MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}
