//! Booking workflow settings.

use serde::{Deserialize, Serialize};

/// Settings injected into [`AppointmentService`](crate::AppointmentService).
///
/// # Example
///
/// ```
/// use clientdesk_booking::BookingConfig;
///
/// let config = BookingConfig::default()
///     .with_timezone("Europe/Berlin")
///     .with_bypass_payments(true);
/// assert_eq!(config.currency, "INR");
/// assert!(config.bypass_payments);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// ISO currency code for orders.
    pub currency: String,
    /// IANA zone the business operates in.
    pub timezone: String,
    /// Confirm bookings immediately without a payment order.
    pub bypass_payments: bool,
    /// Longest bookable session.
    pub max_duration_hours: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            bypass_payments: false,
            max_duration_hours: 12,
        }
    }
}

impl BookingConfig {
    /// Set the order currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the business timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Enable or disable payment bypass.
    #[must_use]
    pub const fn with_bypass_payments(mut self, bypass: bool) -> Self {
        self.bypass_payments = bypass;
        self
    }

    /// Set the longest bookable session.
    #[must_use]
    pub const fn with_max_duration_hours(mut self, hours: u32) -> Self {
        self.max_duration_hours = hours;
        self
    }
}
