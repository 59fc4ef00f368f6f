//! Axum integration for ClientDesk.
//!
//! The HTTP shell around the workflow crates:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP shell (Axum)               │  ← routing, JSON, bearer auth
//! │  - extractors, AppError, middleware     │  ← correlation ids, tracing
//! ├─────────────────────────────────────────┤
//! │         Workflow services               │
//! │  - auth, booking, commerce              │  ← reducers + best-effort effects
//! │  - injected stores and gateways         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. The correlation middleware tags the request and opens a span
//! 2. Extractors resolve the caller and decode the body
//! 3. The handler calls one workflow operation
//! 4. Domain errors convert into [`AppError`] responses
//!
//! # Example
//!
//! ```ignore
//! use clientdesk_web::{AppError, JsonBody, MaybeUser};
//!
//! async fn create_appointment(
//!     State(state): State<AppState>,
//!     MaybeUser(actor): MaybeUser,
//!     JsonBody(request): JsonBody<CreateAppointmentRequest>,
//! ) -> Result<(StatusCode, Json<CreatedAppointment>), AppError> {
//!     let account_id = actor.map(|a| a.account_id);
//!     let created = state.appointments.create(&request, account_id).await?;
//!     Ok((StatusCode::CREATED, Json(created)))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::{AppError, expose_error_details};
pub use extractors::{
    BearerToken, CorrelationId, CurrentUser, JsonBody, MaybeUser, QueryParams, RequireAdmin,
    RequireSuperAdmin,
};
pub use handlers::{HealthProbe, Readiness};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
