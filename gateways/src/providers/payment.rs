//! Payment gateway contract.

use crate::error::Result;
use async_trait::async_trait;
use clientdesk_core::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for a new gateway order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Amount in minor units.
    pub amount: Money,
    /// ISO currency code.
    pub currency: String,
    /// Merchant-side reference (appointment or checkout id).
    pub receipt: String,
    /// Free-form metadata stored with the order.
    pub notes: BTreeMap<String, String>,
}

/// An order the client completes payment against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Gateway order id.
    pub id: String,
    /// Amount in minor units.
    pub amount: Money,
    /// ISO currency code.
    pub currency: String,
}

/// Outcome of a refund request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundReceipt {
    /// Gateway refund id.
    pub id: String,
    /// Refunded payment.
    pub payment_id: String,
    /// Refunded amount in minor units.
    pub amount: Money,
}

/// Payment gateway trait
///
/// Order creation and refunds are network calls; signature checks are local
/// HMAC computations over shared secrets.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id handed to the client-side checkout widget.
    fn key_id(&self) -> &str;

    /// Create an order for `request.amount`.
    ///
    /// # Errors
    ///
    /// - `Configuration` when credentials are missing
    /// - `Http`/`Rejected`/`InvalidResponse` on gateway failures
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder>;

    /// Check a client-submitted signature over `order_id|payment_id`.
    ///
    /// # Errors
    ///
    /// - `Configuration` when the key secret is missing
    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool>;

    /// Check a webhook signature over the raw, unparsed request body.
    ///
    /// # Errors
    ///
    /// - `Configuration` when the webhook secret is missing
    fn verify_webhook_signature(&self, raw_body: &[u8], signature: &str) -> Result<bool>;

    /// Refund a captured payment, fully when `amount` is `None`.
    ///
    /// # Errors
    ///
    /// - `Http`/`Rejected`/`InvalidResponse` on gateway failures
    async fn refund(&self, payment_id: &str, amount: Option<Money>) -> Result<RefundReceipt>;
}
