//! Cart, checkout, voucher, task and uploaded-document records.

use crate::money::Money;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service held in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Referenced service.
    pub service_id: String,
    /// Service title at the time it was added.
    pub title: String,
    /// Display price at the time it was added.
    pub price: String,
}

/// One cart per account; `id` is the account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owning account id.
    pub id: String,
    /// Unique service references.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// An empty cart for `account_id`.
    #[must_use]
    pub fn empty(account_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: account_id.to_string(),
            items: Vec::new(),
            updated_at: now,
        }
    }

    /// Whether the service is already in the cart.
    #[must_use]
    pub fn contains(&self, service_id: &str) -> bool {
        self.items.iter().any(|item| item.service_id == service_id)
    }
}

impl Document for Cart {
    const COLLECTION: &'static str = "carts";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Checkout order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    /// Gateway order created.
    Created,
    /// Payment verified, fulfilment started.
    Paid,
    /// Signature verification failed.
    Failed,
}

impl CheckoutStatus {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

/// Snapshot of a cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    /// Document id.
    pub id: String,
    /// Purchasing account.
    pub account_id: String,
    /// Gateway order id.
    pub order_id: String,
    /// Items being purchased.
    pub items: Vec<CartItem>,
    /// Sum of item prices.
    pub subtotal: Money,
    /// Voucher discount.
    pub discount: Money,
    /// Amount charged.
    pub total: Money,
    /// ISO currency code.
    pub currency: String,
    /// Applied voucher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    /// Lifecycle status.
    pub status: CheckoutStatus,
    /// Gateway payment id once verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for CheckoutOrder {
    const COLLECTION: &'static str = "checkout_orders";

    fn id(&self) -> &str {
        &self.id
    }
}

/// How a voucher discounts a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` percent of the subtotal.
    Percentage,
    /// `discount_value` minor units, capped at the subtotal.
    Fixed,
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    /// Document id.
    pub id: String,
    /// Uppercase redemption code.
    pub code: String,
    /// Discount rule.
    pub discount_type: DiscountType,
    /// Percent (1-100) or minor units, depending on `discount_type`.
    pub discount_value: i64,
    /// Maximum redemptions, unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    /// Redemptions so far.
    #[serde(default)]
    pub used_count: u32,
    /// Expiry instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin switch.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Result of checking a voucher against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherCheck {
    /// Whether the voucher can be applied.
    pub valid: bool,
    /// Discount it would grant; zero when invalid.
    pub discount_amount: Money,
    /// Why it cannot be applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VoucherCheck {
    fn invalid(reason: &str) -> Self {
        Self {
            valid: false,
            discount_amount: Money::ZERO,
            reason: Some(reason.to_string()),
        }
    }
}

impl Voucher {
    /// Normalized form of a user-entered code.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Whether the usage limit has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.used_count >= limit)
    }

    /// Evaluate the voucher for `subtotal` at `now`.
    #[must_use]
    pub fn evaluate(&self, subtotal: Money, now: DateTime<Utc>) -> VoucherCheck {
        if !self.active {
            return VoucherCheck::invalid("voucher is inactive");
        }
        if self.expires_at.is_some_and(|at| at <= now) {
            return VoucherCheck::invalid("voucher has expired");
        }
        if self.is_exhausted() {
            return VoucherCheck::invalid("voucher usage limit reached");
        }

        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let percent = u32::try_from(self.discount_value.clamp(0, 100)).unwrap_or(0);
                subtotal.percent(percent)
            }
            DiscountType::Fixed => Money::from_minor(self.discount_value.max(0)).min(subtotal),
        };
        VoucherCheck {
            valid: true,
            discount_amount: discount,
            reason: None,
        }
    }
}

impl Document for Voucher {
    const COLLECTION: &'static str = "vouchers";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Derived task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Progress is 0.
    NotStarted,
    /// Progress between 1 and 99.
    InProgress,
    /// Progress is 100.
    Completed,
}

impl TaskStatus {
    /// Status implied by a progress percentage.
    #[must_use]
    pub const fn from_progress(progress: u8) -> Self {
        match progress {
            0 => Self::NotStarted,
            100.. => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

/// One fulfilment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStep {
    /// Step label.
    pub title: String,
    /// Whether done.
    #[serde(default)]
    pub completed: bool,
    /// When it was marked done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A dated progress note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// When the note was written.
    pub at: DateTime<Utc>,
    /// Note text.
    pub message: String,
}

/// Post-purchase fulfilment tracking for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Document id.
    pub id: String,
    /// Client account.
    pub account_id: String,
    /// Purchased service.
    pub service_id: String,
    /// Display title.
    pub title: String,
    /// Fulfilment steps.
    pub steps: Vec<TaskStep>,
    /// Progress notes, oldest first.
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    /// Percentage complete.
    pub progress: u8,
    /// Always `TaskStatus::from_progress(progress)`.
    pub status: TaskStatus,
    /// Gateway order that paid for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Set progress (clamped to 100) and the derived status.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
        self.status = TaskStatus::from_progress(self.progress);
    }

    /// Recompute progress from completed steps.
    pub fn recompute_progress(&mut self) {
        let total = self.steps.len();
        if total == 0 {
            return;
        }
        let done = self.steps.iter().filter(|s| s.completed).count();
        // done <= total, so the ratio is at most 100
        #[allow(clippy::cast_possible_truncation)]
        let progress = (done * 100 / total) as u8;
        self.set_progress(progress);
    }
}

impl Document for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    /// Document id.
    pub id: String,
    /// Uploading account.
    pub owner_id: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Storage path.
    pub path: String,
    /// Retrieval URL.
    pub url: String,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

impl Document for StoredDocument {
    const COLLECTION: &'static str = "documents";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn voucher(discount_type: DiscountType, value: i64) -> Voucher {
        let now = Utc::now();
        Voucher {
            id: "v".into(),
            code: "SAVE10".into(),
            discount_type,
            discount_value: value,
            usage_limit: None,
            used_count: 0,
            expires_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn percentage_discount() {
        let check = voucher(DiscountType::Percentage, 10).evaluate(Money::from_minor(1000), Utc::now());
        assert!(check.valid);
        assert_eq!(check.discount_amount, Money::from_minor(100));
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() {
        let check = voucher(DiscountType::Fixed, 5000).evaluate(Money::from_minor(1200), Utc::now());
        assert_eq!(check.discount_amount, Money::from_minor(1200));
    }

    #[test]
    fn expired_voucher_is_invalid() {
        let now = Utc::now();
        let mut v = voucher(DiscountType::Percentage, 10);
        v.expires_at = Some(now - Duration::minutes(1));
        let check = v.evaluate(Money::from_minor(1000), now);
        assert!(!check.valid);
        assert_eq!(check.discount_amount, Money::ZERO);
        assert_eq!(check.reason.as_deref(), Some("voucher has expired"));
    }

    #[test]
    fn exhausted_voucher_is_invalid() {
        let mut v = voucher(DiscountType::Percentage, 10);
        v.usage_limit = Some(3);
        v.used_count = 3;
        assert!(!v.evaluate(Money::from_minor(1000), Utc::now()).valid);
    }

    #[test]
    fn codes_are_uppercased() {
        assert_eq!(Voucher::normalize_code(" save10 "), "SAVE10");
    }

    #[test]
    fn task_status_follows_progress() {
        let now = Utc::now();
        let mut task = Task {
            id: "t".into(),
            account_id: "a".into(),
            service_id: "s".into(),
            title: "GST filing".into(),
            steps: vec![
                TaskStep { title: "one".into(), completed: true, completed_at: Some(now) },
                TaskStep { title: "two".into(), completed: false, completed_at: None },
                TaskStep { title: "three".into(), completed: false, completed_at: None },
            ],
            timeline: Vec::new(),
            progress: 0,
            status: TaskStatus::NotStarted,
            order_id: None,
            created_at: now,
            updated_at: now,
        };
        task.recompute_progress();
        assert_eq!(task.progress, 33);
        assert_eq!(task.status, TaskStatus::InProgress);

        task.set_progress(250);
        assert_eq!(task.progress, 100);
        assert_eq!(task.status, TaskStatus::Completed);
    }
}
