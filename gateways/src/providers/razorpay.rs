//! Razorpay payment gateway.

use crate::error::{GatewayError, Result};
use crate::providers::payment::{OrderRequest, PaymentGateway, PaymentOrder, RefundReceipt};
use crate::signature;
use async_trait::async_trait;
use clientdesk_core::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com/v1";

/// Razorpay credentials.
///
/// # Examples
///
/// ```
/// use clientdesk_gateways::RazorpayConfig;
///
/// let config = RazorpayConfig::new("rzp_test_key", "key_secret")
///     .with_webhook_secret("whsec");
/// assert!(config.is_configured());
/// ```
#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// Public key id.
    pub key_id: String,
    /// API secret, also the client signature secret.
    pub key_secret: String,
    /// Secret configured on the webhook endpoint.
    pub webhook_secret: String,
    /// REST endpoint.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RazorpayConfig {
    /// Credentials with default endpoint and timeout.
    #[must_use]
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            webhook_secret: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the webhook secret.
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = secret.into();
        self
    }

    /// Override the endpoint.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether order creation is possible.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.key_id.is_empty() && !self.key_secret.is_empty()
    }
}

/// Razorpay REST client.
#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    config: RazorpayConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Serialize)]
struct RefundBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<i64>,
}

#[derive(Deserialize)]
struct RefundResponse {
    id: String,
    payment_id: String,
    amount: i64,
}

impl RazorpayGateway {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns `Http` if the TLS client cannot be built.
    pub fn new(config: RazorpayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    fn require_credentials(&self) -> Result<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(GatewayError::Configuration(
                "Razorpay key id and secret are not set".to_string(),
            ))
        }
    }

    async fn read_error(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("unreadable body: {e}"));
        GatewayError::Rejected { status, message }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.config.key_id
    }

    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        self.require_credentials()?;
        if !request.amount.is_positive() {
            return Err(GatewayError::InvalidInput(
                "order amount must be positive".to_string(),
            ));
        }

        let body = CreateOrderBody {
            amount: request.amount.minor_units(),
            currency: &request.currency,
            receipt: &request.receipt,
            notes: &request.notes,
        };
        let response = self
            .http
            .post(format!("{}/orders", self.config.api_base))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let order: OrderResponse = response.json().await?;
        tracing::info!(
            order_id = %order.id,
            amount = order.amount,
            receipt = %request.receipt,
            "Razorpay order created"
        );
        Ok(PaymentOrder {
            id: order.id,
            amount: Money::from_minor(order.amount),
            currency: order.currency,
        })
    }

    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool> {
        if self.config.key_secret.is_empty() {
            return Err(GatewayError::Configuration(
                "Razorpay key secret is not set".to_string(),
            ));
        }
        let message = signature::payment_message(order_id, payment_id);
        Ok(signature::verify(
            &self.config.key_secret,
            message.as_bytes(),
            signature,
        ))
    }

    fn verify_webhook_signature(&self, raw_body: &[u8], signature: &str) -> Result<bool> {
        if self.config.webhook_secret.is_empty() {
            return Err(GatewayError::Configuration(
                "Razorpay webhook secret is not set".to_string(),
            ));
        }
        Ok(signature::verify(&self.config.webhook_secret, raw_body, signature))
    }

    async fn refund(&self, payment_id: &str, amount: Option<Money>) -> Result<RefundReceipt> {
        self.require_credentials()?;
        let response = self
            .http
            .post(format!("{}/payments/{payment_id}/refund", self.config.api_base))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&RefundBody {
                amount: amount.map(Money::minor_units),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let refund: RefundResponse = response.json().await?;
        tracing::info!(refund_id = %refund.id, payment_id = %refund.payment_id, "Razorpay refund issued");
        Ok(RefundReceipt {
            id: refund.id,
            payment_id: refund.payment_id,
            amount: Money::from_minor(refund.amount),
        })
    }
}
