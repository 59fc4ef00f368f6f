//! # ClientDesk Gateways
//!
//! Narrow request/response contracts for the external services the
//! workflows depend on, with production adapters and test doubles.
//!
//! | Gateway | Trait | Adapters |
//! |---|---|---|
//! | Payment | [`PaymentGateway`] | [`RazorpayGateway`] |
//! | Calendar | [`CalendarGateway`] | [`GoogleCalendarGateway`], [`OfficeHoursCalendar`] |
//! | Notification | [`NotificationGateway`] | [`EmailNotifier`] over [`SmtpEmailTransport`] or [`ConsoleEmailTransport`] |
//! | Documents | [`DocumentGateway`] | [`LocalDocumentStorage`] |
//!
//! Every trait is object safe; workflows hold them as `Arc<dyn Trait>` built
//! once at process start.
//!
//! ## Features
//!
//! - `test-utils` (default): in-memory mocks under [`mocks`]

pub mod error;
pub mod providers;
pub mod signature;
pub mod templates;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use error::{GatewayError, Result};
pub use providers::{
    AccountNotice, AppointmentNotice, CalendarEvent, CalendarGateway, ConsoleEmailTransport,
    DeliveryReceipt, DocumentGateway, DocumentPolicy, EmailMessage, EmailNotifier, EmailTransport,
    EventDetails, FileMeta, FileValidation, GoogleCalendarConfig, GoogleCalendarGateway,
    LocalDocumentStorage, NotificationGateway, OfficeHours, OfficeHoursCalendar, OrderRequest,
    PasswordResetNotice, PaymentGateway, PaymentOrder, PurchaseNotice, RazorpayConfig,
    RazorpayGateway, RefundReceipt, ScheduleChange, SmtpConfig, SmtpEmailTransport, StoredFile,
};
