//! Mock gateway implementations for testing.
//!
//! Simple, in-memory implementations of every gateway trait. Each mock
//! records the calls it receives and can be switched into a failing mode so
//! tests can exercise best-effort error paths.

pub mod calendar;
pub mod documents;
pub mod notification;
pub mod payment;

pub use calendar::MockCalendarGateway;
pub use documents::MockDocumentGateway;
pub use notification::{MockEmailTransport, MockNotificationGateway, SentNotification};
pub use payment::MockPaymentGateway;
