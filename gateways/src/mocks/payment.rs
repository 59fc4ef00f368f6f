//! Mock payment gateway.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for lock access

use crate::error::{GatewayError, Result};
use crate::providers::payment::{OrderRequest, PaymentGateway, PaymentOrder, RefundReceipt};
use crate::signature;
use async_trait::async_trait;
use clientdesk_core::Money;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Mock payment gateway.
///
/// Issues sequential order ids (`order_1`, `order_2`, ...) and verifies
/// signatures with real HMACs over the configured secrets, so tests can sign
/// payloads with [`MockPaymentGateway::sign_payment`] and
/// [`MockPaymentGateway::sign_webhook`].
#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
    key_secret: String,
    webhook_secret: String,
    next_order: Arc<AtomicU64>,
    fail_orders: Arc<AtomicBool>,
    orders: Arc<Mutex<Vec<OrderRequest>>>,
    refunds: Arc<Mutex<Vec<String>>>,
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentGateway {
    /// Create a gateway with fixed test secrets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            key_secret: "test_key_secret".to_string(),
            webhook_secret: "test_webhook_secret".to_string(),
            next_order: Arc::new(AtomicU64::new(1)),
            fail_orders: Arc::new(AtomicBool::new(false)),
            orders: Arc::new(Mutex::new(Vec::new())),
            refunds: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make order creation fail (or succeed again).
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Signature a real client would submit for `order_id`/`payment_id`.
    #[must_use]
    pub fn sign_payment(&self, order_id: &str, payment_id: &str) -> String {
        signature::sign(
            &self.key_secret,
            signature::payment_message(order_id, payment_id).as_bytes(),
        )
    }

    /// Signature header the gateway would send for `body`.
    #[must_use]
    pub fn sign_webhook(&self, body: &[u8]) -> String {
        signature::sign(&self.webhook_secret, body)
    }

    /// Orders created so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    /// Payment ids refunded so far.
    #[must_use]
    pub fn refunds(&self) -> Vec<String> {
        self.refunds.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn key_id(&self) -> &str {
        "rzp_test_mock"
    }

    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 502,
                message: "mock order failure".to_string(),
            });
        }
        let id = format!("order_{}", self.next_order.fetch_add(1, Ordering::SeqCst));
        tracing::info!(order_id = %id, amount = request.amount.minor_units(), "Mock order created");
        let order = PaymentOrder {
            id,
            amount: request.amount,
            currency: request.currency.clone(),
        };
        self.orders.lock().unwrap().push(request);
        Ok(order)
    }

    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool> {
        Ok(signature::verify(
            &self.key_secret,
            signature::payment_message(order_id, payment_id).as_bytes(),
            signature,
        ))
    }

    fn verify_webhook_signature(&self, raw_body: &[u8], signature: &str) -> Result<bool> {
        Ok(signature::verify(&self.webhook_secret, raw_body, signature))
    }

    async fn refund(&self, payment_id: &str, amount: Option<Money>) -> Result<RefundReceipt> {
        self.refunds.lock().unwrap().push(payment_id.to_string());
        Ok(RefundReceipt {
            id: format!("rfnd_{payment_id}"),
            payment_id: payment_id.to_string(),
            amount: amount.unwrap_or_default(),
        })
    }
}
