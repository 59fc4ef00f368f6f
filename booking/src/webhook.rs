//! Payment gateway webhook envelopes.
//!
//! Bodies are parsed only after their signature has been verified over the
//! raw bytes.

use serde::Deserialize;

/// Header carrying the hex HMAC of the raw body.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// A verified webhook, reduced to what the booking workflow acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `payment.captured`
    PaymentCaptured {
        /// Gateway order id.
        order_id: String,
        /// Gateway payment id.
        payment_id: String,
    },
    /// `payment.failed`
    PaymentFailed {
        /// Gateway order id.
        order_id: String,
    },
    /// `refund.created`
    RefundCreated {
        /// Refunded payment.
        payment_id: String,
    },
    /// Any other event kind.
    Ignored(String),
}

impl WebhookEvent {
    /// Event name for logs and receipts.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::PaymentCaptured { .. } => "payment.captured",
            Self::PaymentFailed { .. } => "payment.failed",
            Self::RefundCreated { .. } => "refund.created",
            Self::Ignored(kind) => kind,
        }
    }

    /// Decode a verified body.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body is not a recognizable envelope
    /// or a known event lacks the entity it needs.
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let envelope: Envelope = serde_json::from_slice(raw)?;
        let missing = |what: &str| serde_json::Error::custom(format!("{} without {what}", envelope.event));

        match envelope.event.as_str() {
            "payment.captured" => {
                let payment = envelope.payload.payment.ok_or_else(|| missing("payment entity"))?.entity;
                let order_id = payment.order_id.ok_or_else(|| missing("order_id"))?;
                Ok(Self::PaymentCaptured {
                    order_id,
                    payment_id: payment.id,
                })
            }
            "payment.failed" => {
                let payment = envelope.payload.payment.ok_or_else(|| missing("payment entity"))?.entity;
                let order_id = payment.order_id.ok_or_else(|| missing("order_id"))?;
                Ok(Self::PaymentFailed { order_id })
            }
            "refund.created" => {
                let refund = envelope.payload.refund.ok_or_else(|| missing("refund entity"))?.entity;
                Ok(Self::RefundCreated {
                    payment_id: refund.payment_id,
                })
            }
            _ => Ok(Self::Ignored(envelope.event)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Payload,
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    payment: Option<Wrapped<PaymentEntity>>,
    refund: Option<Wrapped<RefundEntity>>,
}

#[derive(Debug, Deserialize)]
struct Wrapped<T> {
    entity: T,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefundEntity {
    payment_id: String,
}
