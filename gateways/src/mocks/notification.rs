//! Mock notification gateway and email transport.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for lock access

use crate::error::{GatewayError, Result};
use crate::providers::notification::{
    AccountNotice, AppointmentNotice, DeliveryReceipt, EmailMessage, EmailTransport,
    NotificationGateway, PasswordResetNotice, PurchaseNotice, ScheduleChange,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A notification captured by [`MockNotificationGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    /// Booking confirmed.
    Confirmation {
        /// Recipient.
        to: String,
    },
    /// Booking cancelled.
    Cancellation {
        /// Recipient.
        to: String,
        /// Cancellation reason.
        reason: Option<String>,
    },
    /// Booking moved.
    Reschedule {
        /// Recipient.
        to: String,
        /// Schedule before the move.
        change: ScheduleChange,
    },
    /// Account state change.
    AccountStatus {
        /// Recipient.
        to: String,
        /// New state.
        active: bool,
    },
    /// Checkout paid.
    Purchase {
        /// Recipient.
        to: String,
        /// Gateway order id.
        order_id: String,
    },
    /// Password reset.
    PasswordReset {
        /// Recipient.
        to: String,
        /// Link with token.
        reset_link: String,
    },
}

/// Mock notification gateway.
///
/// Records every notification; can be switched to fail delivery.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationGateway {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail: Arc<AtomicBool>,
}

impl MockNotificationGateway {
    /// Create a gateway that delivers successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries fail (or succeed again).
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of confirmation emails sent.
    #[must_use]
    pub fn confirmations(&self) -> usize {
        self.sent()
            .iter()
            .filter(|n| matches!(n, SentNotification::Confirmation { .. }))
            .count()
    }

    /// The most recent password reset link sent to `email`.
    #[must_use]
    pub fn last_reset_link(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|n| match n {
            SentNotification::PasswordReset { to, reset_link } if to == email => Some(reset_link),
            _ => None,
        })
    }

    fn record(&self, notification: SentNotification) -> Result<DeliveryReceipt> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Delivery("mock delivery failure".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(notification);
        Ok(DeliveryReceipt {
            message_id: format!("mock-{}", sent.len()),
        })
    }
}

#[async_trait]
impl NotificationGateway for MockNotificationGateway {
    async fn send_confirmation(&self, notice: &AppointmentNotice) -> Result<DeliveryReceipt> {
        self.record(SentNotification::Confirmation {
            to: notice.email.clone(),
        })
    }

    async fn send_cancellation(&self, notice: &AppointmentNotice) -> Result<DeliveryReceipt> {
        self.record(SentNotification::Cancellation {
            to: notice.email.clone(),
            reason: notice.reason.clone(),
        })
    }

    async fn send_reschedule(
        &self,
        notice: &AppointmentNotice,
        change: &ScheduleChange,
    ) -> Result<DeliveryReceipt> {
        self.record(SentNotification::Reschedule {
            to: notice.email.clone(),
            change: *change,
        })
    }

    async fn send_account_status(&self, notice: &AccountNotice) -> Result<DeliveryReceipt> {
        self.record(SentNotification::AccountStatus {
            to: notice.email.clone(),
            active: notice.active,
        })
    }

    async fn send_purchase_confirmation(&self, notice: &PurchaseNotice) -> Result<DeliveryReceipt> {
        self.record(SentNotification::Purchase {
            to: notice.email.clone(),
            order_id: notice.order_id.clone(),
        })
    }

    async fn send_password_reset(&self, notice: &PasswordResetNotice) -> Result<DeliveryReceipt> {
        self.record(SentNotification::PasswordReset {
            to: notice.email.clone(),
            reset_link: notice.reset_link.clone(),
        })
    }
}

/// Mock email transport capturing rendered messages.
#[derive(Debug, Clone, Default)]
pub struct MockEmailTransport {
    messages: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailTransport {
    /// Create an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far.
    #[must_use]
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for MockEmailTransport {
    async fn deliver(&self, message: EmailMessage) -> Result<DeliveryReceipt> {
        let mut messages = self.messages.lock().unwrap();
        messages.push(message);
        Ok(DeliveryReceipt {
            message_id: format!("mock-{}", messages.len()),
        })
    }
}
