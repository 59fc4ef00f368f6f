//! Transactional notifications.
//!
//! [`NotificationGateway`] is what workflows call. The production
//! implementation, [`EmailNotifier`], renders a template and hands the
//! message to an [`EmailTransport`] (SMTP or console).

use crate::error::Result;
use crate::templates;
use async_trait::async_trait;
use clientdesk_core::{Appointment, Money, NaiveDate, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text alternative.
    pub text: String,
}

/// Confirmation that a message was accepted for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    /// Transport-assigned id.
    pub message_id: String,
}

/// Appointment details for booking emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentNotice {
    /// Customer name.
    pub name: String,
    /// Customer email.
    pub email: String,
    /// Local date.
    pub date: NaiveDate,
    /// Local start.
    pub start_time: TimeOfDay,
    /// Local end.
    pub end_time: TimeOfDay,
    /// Zone name.
    pub timezone: String,
    /// Length in hours.
    pub duration_hours: u32,
    /// Amount charged.
    pub total_amount: Money,
    /// ISO currency code.
    pub currency: String,
    /// Meeting link.
    pub meet_link: Option<String>,
    /// Cancellation reason.
    pub reason: Option<String>,
}

impl From<&Appointment> for AppointmentNotice {
    fn from(appointment: &Appointment) -> Self {
        Self {
            name: appointment.name.clone(),
            email: appointment.email.clone(),
            date: appointment.date,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            timezone: appointment.timezone.clone(),
            duration_hours: appointment.duration_hours,
            total_amount: appointment.total_amount,
            currency: appointment.currency.clone(),
            meet_link: appointment.meet_link.clone(),
            reason: appointment.cancel_reason.clone(),
        }
    }
}

/// The schedule an appointment was moved away from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleChange {
    /// Previous date.
    pub previous_date: NaiveDate,
    /// Previous start.
    pub previous_start: TimeOfDay,
    /// Previous end.
    pub previous_end: TimeOfDay,
}

/// Account enable/disable notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNotice {
    /// Account holder.
    pub name: String,
    /// Address.
    pub email: String,
    /// New state.
    pub active: bool,
}

/// Purchase receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseNotice {
    /// Buyer.
    pub name: String,
    /// Address.
    pub email: String,
    /// `(title, display price)` pairs.
    pub items: Vec<(String, String)>,
    /// Sum of items.
    pub subtotal: Money,
    /// Voucher discount.
    pub discount: Money,
    /// Charged amount.
    pub total: Money,
    /// ISO currency code.
    pub currency: String,
    /// Gateway order id.
    pub order_id: String,
}

/// Password reset link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetNotice {
    /// Account holder.
    pub name: String,
    /// Address.
    pub email: String,
    /// Link containing the reset token.
    pub reset_link: String,
    /// Link lifetime.
    pub expires_in_minutes: i64,
}

/// Notification gateway trait
///
/// Callers treat delivery as best-effort; errors are reported, never retried.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Booking confirmed.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be sent.
    async fn send_confirmation(&self, notice: &AppointmentNotice) -> Result<DeliveryReceipt>;

    /// Booking cancelled.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be sent.
    async fn send_cancellation(&self, notice: &AppointmentNotice) -> Result<DeliveryReceipt>;

    /// Booking moved.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be sent.
    async fn send_reschedule(
        &self,
        notice: &AppointmentNotice,
        change: &ScheduleChange,
    ) -> Result<DeliveryReceipt>;

    /// Account activated or deactivated.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be sent.
    async fn send_account_status(&self, notice: &AccountNotice) -> Result<DeliveryReceipt>;

    /// Checkout paid.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be sent.
    async fn send_purchase_confirmation(&self, notice: &PurchaseNotice) -> Result<DeliveryReceipt>;

    /// Password reset requested.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be sent.
    async fn send_password_reset(&self, notice: &PasswordResetNotice) -> Result<DeliveryReceipt>;
}

/// Low-level delivery of a rendered message.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Deliver `message`.
    ///
    /// # Errors
    ///
    /// Returns `Delivery` when the message cannot be built or sent.
    async fn deliver(&self, message: EmailMessage) -> Result<DeliveryReceipt>;
}

/// Renders templates and delivers them through a transport.
#[derive(Clone)]
pub struct EmailNotifier {
    transport: Arc<dyn EmailTransport>,
    brand: String,
}

impl EmailNotifier {
    /// Create a notifier signing emails as `brand`.
    #[must_use]
    pub fn new(transport: Arc<dyn EmailTransport>, brand: impl Into<String>) -> Self {
        Self {
            transport,
            brand: brand.into(),
        }
    }
}

#[async_trait]
impl NotificationGateway for EmailNotifier {
    async fn send_confirmation(&self, notice: &AppointmentNotice) -> Result<DeliveryReceipt> {
        self.transport
            .deliver(templates::appointment_confirmation(&self.brand, notice))
            .await
    }

    async fn send_cancellation(&self, notice: &AppointmentNotice) -> Result<DeliveryReceipt> {
        self.transport
            .deliver(templates::appointment_cancellation(&self.brand, notice))
            .await
    }

    async fn send_reschedule(
        &self,
        notice: &AppointmentNotice,
        change: &ScheduleChange,
    ) -> Result<DeliveryReceipt> {
        self.transport
            .deliver(templates::appointment_reschedule(&self.brand, notice, change))
            .await
    }

    async fn send_account_status(&self, notice: &AccountNotice) -> Result<DeliveryReceipt> {
        self.transport
            .deliver(templates::account_status(&self.brand, notice))
            .await
    }

    async fn send_purchase_confirmation(&self, notice: &PurchaseNotice) -> Result<DeliveryReceipt> {
        self.transport
            .deliver(templates::purchase_confirmation(&self.brand, notice))
            .await
    }

    async fn send_password_reset(&self, notice: &PasswordResetNotice) -> Result<DeliveryReceipt> {
        self.transport
            .deliver(templates::password_reset(&self.brand, notice))
            .await
    }
}
