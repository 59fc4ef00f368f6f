//! Appointment documents.

use crate::money::Money;
use crate::store::Document;
use crate::time::{TimeOfDay, TimeSlot};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    /// Awaiting payment.
    Pending,
    /// Paid (or bypassed) and scheduled.
    Confirmed,
    /// Session held.
    Completed,
    /// Cancelled by an admin or by refund.
    Cancelled,
    /// Customer did not attend a confirmed session.
    NoShow,
}

impl AppointmentStatus {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no-show",
        }
    }

    /// Statuses that hold a slot on the schedule.
    #[must_use]
    pub const fn holds_slot(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// No further lifecycle transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment sub-state, independent of [`AppointmentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Order created, not yet paid.
    Pending,
    /// Payment verified.
    Paid,
    /// Verification failed or the gateway reported a failure.
    Failed,
    /// Payment returned.
    Refunded,
}

impl PaymentStatus {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One booked consultation slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Document id.
    pub id: String,
    /// Customer name.
    pub name: String,
    /// Customer email.
    pub email: String,
    /// Customer phone.
    pub phone: String,
    /// Free-form notes from the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Account that booked, when the request was authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Local start time.
    pub start_time: TimeOfDay,
    /// Local end time, always `start_time + duration_hours`.
    pub end_time: TimeOfDay,
    /// IANA zone name the wall-clock times are expressed in.
    pub timezone: String,
    /// Booked length in whole hours.
    pub duration_hours: u32,
    /// Rate in effect at booking time.
    pub hourly_rate: Money,
    /// `hourly_rate * duration_hours`.
    pub total_amount: Money,
    /// ISO currency code.
    pub currency: String,
    /// Gateway order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Gateway payment id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Client-submitted payment signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_signature: Option<String>,
    /// Payment sub-state.
    pub payment_status: PaymentStatus,
    /// Lifecycle status.
    pub status: AppointmentStatus,
    /// External calendar event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_event_id: Option<String>,
    /// Video meeting link from the calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// When the booking was confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the booking was cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Why the booking was cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// When the session was marked completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// The booked interval.
    #[must_use]
    pub const fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }

    /// Whether this booking blocks `slot` on `date`.
    #[must_use]
    pub fn blocks(&self, date: NaiveDate, slot: &TimeSlot) -> bool {
        self.status.holds_slot() && self.date == date && self.slot().overlaps(slot)
    }
}

impl Document for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_string(&AppointmentStatus::NoShow).unwrap(), "\"no-show\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Refunded).unwrap(), "\"refunded\"");
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn only_active_statuses_hold_slots() {
        assert!(AppointmentStatus::Pending.holds_slot());
        assert!(AppointmentStatus::Confirmed.holds_slot());
        assert!(!AppointmentStatus::Cancelled.holds_slot());
        assert!(AppointmentStatus::NoShow.is_terminal());
        assert!(!AppointmentStatus::Confirmed.is_terminal());
    }
}
