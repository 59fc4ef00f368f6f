//! Cart checkout and payment verification.
//!
//! Checkout snapshots the cart into a [`CheckoutOrder`] and opens a gateway
//! order for the discounted total. Verification claims the order with a
//! conditional update, so a repeated or concurrent verify fulfils it once.
//! Fulfilment steps are independent writes reported back as
//! [`EffectReport`]s; a failure in one does not undo the others.

use crate::cart::CartService;
use crate::error::{CommerceError, Result};
use crate::vouchers::VoucherService;
use clientdesk_core::catalog::Service;
use clientdesk_core::commerce::{
    CartItem, CheckoutOrder, CheckoutStatus, Task, TaskStatus, TaskStep, TimelineEntry, Voucher,
};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter, new_id};
use clientdesk_core::{Account, EffectReport, Money};
use clientdesk_gateways::{NotificationGateway, OrderRequest, PaymentGateway, PurchaseNotice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Steps given to tasks whose service defines none.
pub const DEFAULT_TASK_STEPS: &[&str] = &[
    "Order received",
    "Documents reviewed",
    "Work in progress",
    "Delivered",
];

/// Body of `POST /cart/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Optional voucher code.
    pub voucher_code: Option<String>,
}

/// Body of `POST /cart/verify-payment`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPaymentRequest {
    /// Gateway order id.
    #[serde(alias = "razorpay_order_id", alias = "orderId")]
    pub order_id: String,
    /// Gateway payment id.
    #[serde(alias = "razorpay_payment_id", alias = "paymentId")]
    pub payment_id: String,
    /// Gateway signature.
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
}

/// Checkout opened; the client pays against `order_id` with `key_id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// Persisted snapshot.
    pub order: CheckoutOrder,
    /// Public gateway key.
    pub key_id: String,
}

/// Result of checkout verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    /// Order after the claim.
    pub order: CheckoutOrder,
    /// Tasks created for the order.
    pub tasks: Vec<Task>,
    /// Fulfilment steps run by this call; empty when it did not win the claim.
    pub effects: Vec<EffectReport>,
}

/// Stores and gateways used by checkout.
#[derive(Clone)]
pub struct CheckoutDependencies {
    /// Checkout snapshots.
    pub orders: Arc<dyn Collection<CheckoutOrder>>,
    /// Fulfilment tasks.
    pub tasks: Arc<dyn Collection<Task>>,
    /// Catalog, for task steps.
    pub services: Arc<dyn Collection<Service>>,
    /// Accounts, for the purchase email.
    pub accounts: Arc<dyn Collection<Account>>,
    /// Payment gateway.
    pub payments: Arc<dyn PaymentGateway>,
    /// Email gateway.
    pub notifier: Arc<dyn NotificationGateway>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Converts carts into paid orders and tasks.
#[derive(Clone)]
pub struct CheckoutService {
    deps: CheckoutDependencies,
    carts: CartService,
    vouchers: VoucherService,
    currency: String,
}

impl CheckoutService {
    /// Create a checkout service.
    #[must_use]
    pub fn new(
        deps: CheckoutDependencies,
        carts: CartService,
        vouchers: VoucherService,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            deps,
            carts,
            vouchers,
            currency: currency.into(),
        }
    }

    /// Open a gateway order for the account's cart.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::Validation`] for an empty cart, an unreadable price,
    ///   an invalid voucher or a non-positive total
    /// - [`CommerceError::GatewayConfiguration`] without payment credentials
    /// - [`CommerceError::Gateway`] when the order cannot be created
    pub async fn checkout(&self, account_id: &str, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let cart = self.carts.get(account_id).await?;
        if cart.items.is_empty() {
            return Err(CommerceError::validation("cart is empty"));
        }

        let subtotal = subtotal(&cart.items)?;
        let voucher_code = request
            .voucher_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        let (discount, voucher_code) = match voucher_code {
            Some(code) => {
                let check = self.vouchers.validate(code, subtotal).await?;
                if !check.valid {
                    return Err(CommerceError::Validation(
                        check.reason.unwrap_or_else(|| "voucher is not valid".to_string()),
                    ));
                }
                (check.discount_amount, Some(Voucher::normalize_code(code)))
            }
            None => (Money::ZERO, None),
        };
        let total = subtotal.saturating_sub(discount);
        if !total.is_positive() {
            return Err(CommerceError::validation("order total must be greater than zero"));
        }

        let id = new_id();
        let mut notes = BTreeMap::new();
        notes.insert("checkoutId".to_string(), id.clone());
        notes.insert("accountId".to_string(), account_id.to_string());
        let order = self
            .deps
            .payments
            .create_order(OrderRequest {
                amount: total,
                currency: self.currency.clone(),
                receipt: id.clone(),
                notes,
            })
            .await?;

        let now = self.deps.clock.now();
        let checkout = CheckoutOrder {
            id,
            account_id: account_id.to_string(),
            order_id: order.id,
            items: cart.items,
            subtotal,
            discount,
            total,
            currency: order.currency,
            voucher_code,
            status: CheckoutStatus::Created,
            payment_id: None,
            created_at: now,
            updated_at: now,
        };
        self.deps.orders.insert(&checkout).await?;
        tracing::info!(
            checkout_id = %checkout.id,
            order_id = %checkout.order_id,
            total = total.minor_units(),
            "Checkout order created"
        );

        Ok(CheckoutSession {
            order: checkout,
            key_id: self.deps.payments.key_id().to_string(),
        })
    }

    /// Verify the client's payment proof and fulfil the order.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown order
    /// - [`CommerceError::Forbidden`] when the order belongs to someone else
    /// - [`CommerceError::PaymentVerification`] on a signature mismatch
    pub async fn verify(&self, account_id: &str, proof: &CheckoutPaymentRequest) -> Result<CheckoutOutcome> {
        let loaded = self
            .deps
            .orders
            .find(&Filter::new().eq("orderId", proof.order_id.as_str()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CommerceError::not_found("Checkout order", &proof.order_id))?;
        if loaded.account_id != account_id {
            return Err(CommerceError::Forbidden(
                "checkout order belongs to another account".to_string(),
            ));
        }
        if loaded.status == CheckoutStatus::Paid {
            return self.settled(loaded).await;
        }

        let valid = self.deps.payments.verify_payment_signature(
            &proof.order_id,
            &proof.payment_id,
            &proof.signature,
        )?;
        let guard = Filter::new().eq("status", loaded.status.as_str());
        let now = self.deps.clock.now();

        if !valid {
            if loaded.status == CheckoutStatus::Created {
                let mut failed = loaded.clone();
                failed.status = CheckoutStatus::Failed;
                failed.updated_at = now;
                self.deps.orders.replace_if(&failed, &guard).await?;
            }
            tracing::warn!(order_id = %proof.order_id, "Checkout signature mismatch");
            return Err(CommerceError::PaymentVerification(
                "Invalid payment signature".to_string(),
            ));
        }

        let mut paid = loaded;
        paid.status = CheckoutStatus::Paid;
        paid.payment_id = Some(proof.payment_id.clone());
        paid.updated_at = now;
        if !self.deps.orders.replace_if(&paid, &guard).await? {
            tracing::info!(order_id = %paid.order_id, "Checkout already claimed");
            let current = self
                .deps
                .orders
                .get(&paid.id)
                .await?
                .ok_or_else(|| CommerceError::not_found("Checkout order", &paid.id))?;
            return self.settled(current).await;
        }
        tracing::info!(order_id = %paid.order_id, payment_id = %proof.payment_id, "Checkout paid");

        let (tasks, mut effects) = self.create_tasks(&paid).await;
        effects.push(self.clear_cart(&paid).await);
        effects.push(self.send_receipt(&paid).await);
        effects.push(self.redeem_voucher(&paid).await);

        Ok(CheckoutOutcome {
            order: paid,
            tasks,
            effects,
        })
    }

    /// Checkout orders of one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn orders(&self, account_id: &str) -> Result<Vec<CheckoutOrder>> {
        let mut orders = self
            .deps
            .orders
            .find(&Filter::new().eq("accountId", account_id))
            .await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn settled(&self, order: CheckoutOrder) -> Result<CheckoutOutcome> {
        let tasks = self
            .deps
            .tasks
            .find(&Filter::new().eq("orderId", order.order_id.as_str()))
            .await?;
        Ok(CheckoutOutcome {
            order,
            tasks,
            effects: Vec::new(),
        })
    }

    async fn create_tasks(&self, order: &CheckoutOrder) -> (Vec<Task>, Vec<EffectReport>) {
        let mut tasks = Vec::with_capacity(order.items.len());
        let mut failures = Vec::new();
        for item in &order.items {
            match self.create_task(order, item).await {
                Ok(task) => tasks.push(task),
                Err(err) => {
                    tracing::warn!(
                        order_id = %order.order_id,
                        service_id = %item.service_id,
                        error = %err,
                        "Task creation failed"
                    );
                    failures.push(err.to_string());
                }
            }
        }
        let report = if failures.is_empty() {
            EffectReport::succeeded("create-tasks")
        } else {
            EffectReport::failed("create-tasks", failures.join("; "))
        };
        (tasks, vec![report])
    }

    async fn create_task(&self, order: &CheckoutOrder, item: &CartItem) -> Result<Task> {
        let service_steps = self
            .deps
            .services
            .get(&item.service_id)
            .await?
            .map(|service| service.steps)
            .unwrap_or_default();
        let steps: Vec<TaskStep> = if service_steps.is_empty() {
            DEFAULT_TASK_STEPS.iter().map(ToString::to_string).collect()
        } else {
            service_steps
        }
        .into_iter()
        .map(|title| TaskStep {
            title,
            completed: false,
            completed_at: None,
        })
        .collect();

        let now = self.deps.clock.now();
        let task = Task {
            id: new_id(),
            account_id: order.account_id.clone(),
            service_id: item.service_id.clone(),
            title: item.title.clone(),
            steps,
            timeline: vec![TimelineEntry {
                at: now,
                message: "Order placed".to_string(),
            }],
            progress: 0,
            status: TaskStatus::NotStarted,
            order_id: Some(order.order_id.clone()),
            created_at: now,
            updated_at: now,
        };
        self.deps.tasks.insert(&task).await?;
        Ok(task)
    }

    async fn clear_cart(&self, order: &CheckoutOrder) -> EffectReport {
        match self.carts.clear(&order.account_id).await {
            Ok(_) => EffectReport::succeeded("clear-cart"),
            Err(err) => {
                tracing::warn!(account_id = %order.account_id, error = %err, "Cart not cleared");
                EffectReport::failed("clear-cart", err)
            }
        }
    }

    async fn send_receipt(&self, order: &CheckoutOrder) -> EffectReport {
        const EFFECT: &str = "send-purchase-email";
        let account = match self.deps.accounts.get(&order.account_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return EffectReport::skipped(EFFECT),
            Err(err) => return EffectReport::failed(EFFECT, err),
        };
        let notice = PurchaseNotice {
            name: account.name,
            email: account.email,
            items: order
                .items
                .iter()
                .map(|item| (item.title.clone(), item.price.clone()))
                .collect(),
            subtotal: order.subtotal,
            discount: order.discount,
            total: order.total,
            currency: order.currency.clone(),
            order_id: order.order_id.clone(),
        };
        match self.deps.notifier.send_purchase_confirmation(&notice).await {
            Ok(_) => EffectReport::succeeded(EFFECT),
            Err(err) => {
                tracing::warn!(order_id = %order.order_id, error = %err, "Purchase email failed");
                EffectReport::failed(EFFECT, err)
            }
        }
    }

    async fn redeem_voucher(&self, order: &CheckoutOrder) -> EffectReport {
        const EFFECT: &str = "redeem-voucher";
        let Some(code) = order.voucher_code.as_deref() else {
            return EffectReport::skipped(EFFECT);
        };
        match self.vouchers.redeem(code).await {
            Ok(_) => EffectReport::succeeded(EFFECT),
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "Voucher redemption failed");
                EffectReport::failed(EFFECT, err)
            }
        }
    }
}

/// Sum of the display prices of `items`.
///
/// # Errors
///
/// Returns [`CommerceError::Validation`] when a price cannot be read.
pub fn subtotal(items: &[CartItem]) -> Result<Money> {
    items.iter().try_fold(Money::ZERO, |sum, item| {
        let price = Money::parse_price(&item.price)?;
        sum.checked_add(price)
            .ok_or_else(|| CommerceError::validation("subtotal is too large"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(price: &str) -> CartItem {
        CartItem {
            service_id: "s".into(),
            title: "t".into(),
            price: price.into(),
        }
    }

    #[test]
    fn subtotal_strips_symbols_and_separators() {
        let total = subtotal(&[item("₹1,500"), item("₹250.50")]).unwrap();
        assert_eq!(total, Money::from_minor(175_050));
    }

    #[test]
    fn unreadable_price_is_a_validation_error() {
        assert!(matches!(
            subtotal(&[item("free")]),
            Err(CommerceError::Validation(_))
        ));
    }
}
