//! Request bodies accepted by the booking workflow.
//!
//! Every field is optional at the wire level so that a missing value is
//! reported as a validation error naming the field, not a decode failure.

use crate::error::{BookingError, Result};
use clientdesk_core::validation::{is_valid_email, non_blank, normalize_email};
use clientdesk_core::{AppointmentStatus, Money, NaiveDate, TimeOfDay};
use serde::Deserialize;

/// `POST /api/appointment`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// Customer name.
    pub name: Option<String>,
    /// Customer email.
    pub email: Option<String>,
    /// Customer phone.
    pub phone: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
    /// `HH:mm`.
    pub start_time: Option<String>,
    /// Whole hours.
    #[serde(alias = "durationHours")]
    pub duration: Option<u32>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    /// Customer name.
    pub name: String,
    /// Normalized email.
    pub email: String,
    /// Customer phone.
    pub phone: String,
    /// Local date.
    pub date: NaiveDate,
    /// Local start.
    pub start_time: TimeOfDay,
    /// Whole hours, at least one.
    pub duration_hours: u32,
    /// Notes, when non-blank.
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// Check presence and shape of every field.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] naming the first offending field.
    pub fn validate(&self, max_duration_hours: u32) -> Result<NewAppointment> {
        let name = required("name", self.name.as_deref())?;
        let email = normalize_email(required("email", self.email.as_deref())?);
        if !is_valid_email(&email) {
            return Err(BookingError::Validation(
                "email must be a valid email address".to_string(),
            ));
        }
        let phone = required("phone", self.phone.as_deref())?;
        let date = parse_date(required("date", self.date.as_deref())?)?;
        let start_time = parse_time(required("startTime", self.start_time.as_deref())?)?;

        let duration_hours = self
            .duration
            .ok_or_else(|| BookingError::Validation("duration is required".to_string()))?;
        if duration_hours == 0 || duration_hours > max_duration_hours {
            return Err(BookingError::Validation(format!(
                "duration must be between 1 and {max_duration_hours} hours"
            )));
        }

        Ok(NewAppointment {
            name: name.to_string(),
            email,
            phone: phone.to_string(),
            date,
            start_time,
            duration_hours,
            notes: non_blank(self.notes.as_deref()).map(str::to_string),
        })
    }
}

/// `POST /api/appointment/verify-payment`
///
/// Accepts the gateway's checkout callback names as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Gateway order id.
    #[serde(alias = "razorpay_order_id")]
    pub order_id: Option<String>,
    /// Gateway payment id.
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    /// Hex HMAC over `order|payment`.
    #[serde(alias = "razorpay_signature")]
    pub signature: Option<String>,
    /// Local appointment id.
    #[serde(alias = "appointment_id")]
    pub appointment_id: Option<String>,
}

/// A verify request with every field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    /// Gateway order id.
    pub order_id: String,
    /// Gateway payment id.
    pub payment_id: String,
    /// Hex signature.
    pub signature: String,
    /// Local appointment id.
    pub appointment_id: String,
}

impl VerifyPaymentRequest {
    /// Require every field.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] when a field is missing.
    pub fn validate(&self) -> Result<PaymentProof> {
        Ok(PaymentProof {
            order_id: required("orderId", self.order_id.as_deref())?.to_string(),
            payment_id: required("paymentId", self.payment_id.as_deref())?.to_string(),
            signature: required("signature", self.signature.as_deref())?.to_string(),
            appointment_id: required("appointmentId", self.appointment_id.as_deref())?.to_string(),
        })
    }
}

/// `PATCH /api/appointment/:id/cancel`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    /// Why the booking is cancelled.
    pub reason: Option<String>,
}

/// `PATCH /api/appointment/:id/reschedule`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    /// New `YYYY-MM-DD`.
    #[serde(alias = "newDate")]
    pub date: Option<String>,
    /// New `HH:mm`.
    #[serde(alias = "newStartTime")]
    pub start_time: Option<String>,
}

impl RescheduleRequest {
    /// Parse the new date and start.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] when either is missing or malformed.
    pub fn validate(&self) -> Result<(NaiveDate, TimeOfDay)> {
        let date = parse_date(required("date", self.date.as_deref())?)?;
        let start = parse_time(required("startTime", self.start_time.as_deref())?)?;
        Ok((date, start))
    }
}

/// `POST /api/appointment/:id/refund`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundRequest {
    /// Partial amount in minor units; the full payment when absent.
    pub amount: Option<i64>,
}

impl RefundRequest {
    /// The requested amount.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a non-positive amount.
    pub fn validate(&self) -> Result<Option<Money>> {
        match self.amount {
            Some(minor) if minor <= 0 => Err(BookingError::Validation(
                "amount must be greater than zero".to_string(),
            )),
            other => Ok(other.map(Money::from_minor)),
        }
    }
}

/// `GET /api/appointment?status=&date=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Filter by status.
    pub status: Option<AppointmentStatus>,
    /// Filter by `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl ListQuery {
    /// Parse the date filter.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a malformed date.
    pub fn date(&self) -> Result<Option<NaiveDate>> {
        non_blank(self.date.as_deref()).map(parse_date).transpose()
    }
}

/// `GET /api/appointment/availability?date=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl AvailabilityQuery {
    /// The requested date.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] when missing or malformed.
    pub fn validate(&self) -> Result<NaiveDate> {
        parse_date(required("date", self.date.as_deref())?)
    }
}

/// `POST /api/hourly-rate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetRateRequest {
    /// Minor units per hour.
    pub amount: Option<i64>,
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    non_blank(value).ok_or_else(|| BookingError::Validation(format!("{field} is required")))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn parse_time(raw: &str) -> Result<TimeOfDay> {
    raw.parse()
        .map_err(|e: clientdesk_core::TimeError| BookingError::Validation(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            name: Some("Asha Rao".into()),
            email: Some("Asha@Example.com".into()),
            phone: Some("+91 98765 43210".into()),
            date: Some("2025-03-14".into()),
            start_time: Some("10:00".into()),
            duration: Some(2),
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn valid_request_is_normalized() {
        let booking = complete().validate(12).unwrap();
        assert_eq!(booking.email, "asha@example.com");
        assert_eq!(booking.start_time.to_string(), "10:00");
        assert_eq!(booking.notes, None);
    }

    #[test]
    fn each_missing_field_is_named() {
        let mut request = complete();
        request.phone = Some("   ".into());
        assert_eq!(
            request.validate(12),
            Err(BookingError::Validation("phone is required".into()))
        );

        let mut request = complete();
        request.duration = None;
        assert_eq!(
            request.validate(12),
            Err(BookingError::Validation("duration is required".into()))
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut request = complete();
        request.start_time = Some("25:99".into());
        assert!(matches!(request.validate(12), Err(BookingError::Validation(_))));

        let mut request = complete();
        request.date = Some("14/03/2025".into());
        assert!(matches!(request.validate(12), Err(BookingError::Validation(_))));

        let mut request = complete();
        request.duration = Some(0);
        assert!(matches!(request.validate(12), Err(BookingError::Validation(_))));
    }

    #[test]
    fn verify_accepts_gateway_field_names() {
        let request: VerifyPaymentRequest = serde_json::from_value(serde_json::json!({
            "razorpay_order_id": "order_1",
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": "abc",
            "appointmentId": "a1",
        }))
        .unwrap();
        let proof = request.validate().unwrap();
        assert_eq!(proof.order_id, "order_1");
        assert_eq!(proof.appointment_id, "a1");
    }

    #[test]
    fn refund_amount_must_be_positive() {
        assert!(RefundRequest { amount: Some(0) }.validate().is_err());
        assert_eq!(RefundRequest { amount: None }.validate(), Ok(None));
    }
}
