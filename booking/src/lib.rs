//! # ClientDesk Booking
//!
//! The appointment booking and payment-confirmation workflow.
//!
//! ## Lifecycle
//!
//! ```text
//! pending ──verify/webhook──▶ confirmed ──▶ completed
//!    │                           │  └────▶ no-show
//!    └──────── cancel ───────────┴──▶ cancelled
//! ```
//!
//! Payment runs as a separate sub-state (`pending → paid | failed`,
//! `failed → paid`, `paid → refunded`). Transitions live in
//! [`AppointmentReducer`]; [`AppointmentService`] loads records, commits the
//! reducer's result and then runs the post-transition effects (calendar and
//! email) best-effort, reporting each one back to the caller.
//!
//! ## Concurrency
//!
//! Client verification and the gateway webhook can race on the same record.
//! Both commit through a conditional update guarded on the payment state they
//! loaded, so exactly one of them runs the confirmation effects.

pub mod appointments;
pub mod config;
pub mod error;
pub mod rates;
pub mod reducer;
pub mod requests;
pub mod webhook;

pub use appointments::{
    AppointmentOutcome, AppointmentService, BookingDependencies, CreatedAppointment, OrderSummary,
    RefundOutcome, WebhookReceipt,
};
pub use config::BookingConfig;
pub use error::{BookingError, Result};
pub use rates::RateService;
pub use reducer::{AppointmentAction, AppointmentEnvironment, AppointmentReducer, PostEffect};
pub use webhook::{SIGNATURE_HEADER, WebhookEvent};
