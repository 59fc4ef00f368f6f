//! Error types for web handlers.
//!
//! [`AppError`] bridges the domain error enums and HTTP responses. Every
//! response body has the shape `{code, message, details?}`; `details` carries
//! the source of a server error and is only rendered when enabled with
//! [`expose_error_details`] (development deployments).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clientdesk_auth::AuthError;
use clientdesk_booking::BookingError;
use clientdesk_commerce::CommerceError;
use clientdesk_core::store::StoreError;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Render the source of server errors in response bodies.
///
/// Called once at startup; off unless the process runs in development.
pub fn expose_error_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Appointment>, AppError> {
///     let appointment = state.appointments.get(&id).await?;
///     Ok(Json(appointment))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error code (for client error handling)
    code: &'static str,
    /// Error message (user-facing)
    message: String,
    /// Internal error (logged, rendered only when details are exposed)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 `VALIDATION_ERROR`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// 401 `UNAUTHORIZED`.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// 403 `FORBIDDEN`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 404 `NOT_FOUND`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 400 `CONFIGURATION_ERROR`: business setup is incomplete.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", message)
    }

    /// 500 `CONFIGURATION_ERROR`: a gateway is missing credentials.
    #[must_use]
    pub fn gateway_configuration(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIGURATION_ERROR",
            message,
        )
    }

    /// 400 `PAYMENT_VERIFICATION_FAILED`.
    #[must_use]
    pub fn payment_verification(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "PAYMENT_VERIFICATION_FAILED", message)
    }

    /// 500 `INTERNAL_SERVER_ERROR`.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            message,
        )
    }

    /// 500 with a generic message; the cause is kept as the source.
    fn internal_from<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn body(&self, expose_details: bool) -> ErrorResponse {
        let details = if expose_details && self.status.is_server_error() {
            self.source.as_ref().map(|source| format!("{source:#}"))
        } else {
            None
        };
        ErrorResponse {
            code: self.code,
            message: self.message.clone(),
            details,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = self.body(EXPOSE_DETAILS.load(Ordering::Relaxed));
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            e @ StoreError::NotFound { .. } => Self::not_found(e.to_string()),
            e => Self::internal_from(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthenticated() {
            return Self::unauthorized(err.to_string());
        }
        if err.is_user_error() {
            return Self::validation(err.to_string());
        }
        match err {
            AuthError::Forbidden(message) => Self::forbidden(message),
            e @ AuthError::AccountNotFound(_) => Self::not_found(e.to_string()),
            AuthError::Store(e) => Self::from(e),
            e => Self::internal_from(e),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(message) => Self::validation(message),
            e @ BookingError::NotFound { .. } => Self::not_found(e.to_string()),
            BookingError::Configuration(message) => Self::configuration(message),
            BookingError::GatewayConfiguration(message) => Self::gateway_configuration(message),
            e @ BookingError::SlotUnavailable { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "SLOT_UNAVAILABLE", e.to_string())
            }
            e @ BookingError::PaymentVerification(_) => Self::payment_verification(e.to_string()),
            e @ BookingError::InvalidSignature => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_SIGNATURE", e.to_string())
            }
            e @ BookingError::AlreadyCancelled => {
                Self::new(StatusCode::BAD_REQUEST, "ALREADY_CANCELLED", e.to_string())
            }
            e @ BookingError::InvalidTransition { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_TRANSITION", e.to_string())
            }
            BookingError::Store(e) => Self::from(e),
            e @ BookingError::Gateway(_) => Self::internal_from(e),
        }
    }
}

impl From<CommerceError> for AppError {
    fn from(err: CommerceError) -> Self {
        match err {
            CommerceError::Validation(message) => Self::validation(message),
            e @ CommerceError::NotFound { .. } => Self::not_found(e.to_string()),
            CommerceError::Forbidden(message) => Self::forbidden(message),
            e @ CommerceError::PaymentVerification(_) => Self::payment_verification(e.to_string()),
            CommerceError::GatewayConfiguration(message) => Self::gateway_configuration(message),
            CommerceError::Store(e) => Self::from(e),
            e @ CommerceError::Gateway(_) => Self::internal_from(e),
        }
    }
}
