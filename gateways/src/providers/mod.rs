//! Gateway traits and their production adapters.

pub mod calendar;
pub mod console_email;
pub mod documents;
pub mod google_calendar;
pub mod local_storage;
pub mod notification;
pub mod office_hours;
pub mod payment;
pub mod razorpay;
pub mod smtp_email;

pub use calendar::{CalendarEvent, CalendarGateway, EventDetails, OfficeHours};
pub use console_email::ConsoleEmailTransport;
pub use documents::{DocumentGateway, DocumentPolicy, FileMeta, FileValidation, StoredFile};
pub use google_calendar::{GoogleCalendarConfig, GoogleCalendarGateway};
pub use local_storage::LocalDocumentStorage;
pub use notification::{
    AccountNotice, AppointmentNotice, DeliveryReceipt, EmailMessage, EmailNotifier,
    EmailTransport, NotificationGateway, PasswordResetNotice, PurchaseNotice, ScheduleChange,
};
pub use office_hours::OfficeHoursCalendar;
pub use payment::{OrderRequest, PaymentGateway, PaymentOrder, RefundReceipt};
pub use razorpay::{RazorpayConfig, RazorpayGateway};
pub use smtp_email::{SmtpConfig, SmtpEmailTransport};
