//! Booking workflow errors.

use clientdesk_core::store::StoreError;
use clientdesk_core::{AppointmentStatus, NaiveDate, TimeOfDay};
use clientdesk_gateways::GatewayError;
use thiserror::Error;

/// Result type for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Errors raised by the booking workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
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

    /// Business configuration is incomplete (e.g. no active rate).
    #[error("{0}")]
    Configuration(String),

    /// A gateway is missing credentials.
    #[error("{0}")]
    GatewayConfiguration(String),

    /// The requested slot is taken or outside office hours.
    #[error("The slot {date} {start}-{end} is not available")]
    SlotUnavailable {
        /// Requested date.
        date: NaiveDate,
        /// Requested start.
        start: TimeOfDay,
        /// Computed end.
        end: TimeOfDay,
    },

    /// Client-submitted payment could not be verified.
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),

    /// Webhook body signature is missing or wrong.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Cancelling something already cancelled.
    #[error("Appointment is already cancelled")]
    AlreadyCancelled,

    /// The action does not apply to the current status.
    #[error("Cannot {action} an appointment that is {from}")]
    InvalidTransition {
        /// Status at the time of the request.
        from: AppointmentStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// A gateway call on the critical path failed.
    #[error("Gateway error: {0}")]
    Gateway(GatewayError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<GatewayError> for BookingError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Configuration(message) => Self::GatewayConfiguration(message),
            other => Self::Gateway(other),
        }
    }
}

impl BookingError {
    pub(crate) fn appointment_not_found(id: &str) -> Self {
        Self::NotFound {
            resource: "Appointment",
            id: id.to_string(),
        }
    }
}
