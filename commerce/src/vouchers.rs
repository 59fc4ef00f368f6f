//! Discount codes.

use crate::error::{CommerceError, Result};
use chrono::{DateTime, Utc};
use clientdesk_core::Money;
use clientdesk_core::commerce::{DiscountType, Voucher, VoucherCheck};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter, new_id};
use serde::Deserialize;
use std::sync::Arc;

/// Body for creating or updating a voucher.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherInput {
    /// Redemption code; stored uppercase.
    pub code: Option<String>,
    /// Discount rule.
    pub discount_type: Option<DiscountType>,
    /// Percent or minor units.
    pub discount_value: Option<i64>,
    /// Maximum redemptions.
    pub usage_limit: Option<u32>,
    /// Expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin switch.
    pub active: Option<bool>,
}

/// Body for checking a code against a subtotal.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateVoucherRequest {
    /// Code as typed by the client.
    pub code: String,
    /// Subtotal in minor units.
    pub subtotal: i64,
}

/// Voucher administration and evaluation.
#[derive(Clone)]
pub struct VoucherService {
    vouchers: Arc<dyn Collection<Voucher>>,
    clock: Arc<dyn Clock>,
}

impl VoucherService {
    /// Create a voucher service.
    #[must_use]
    pub fn new(vouchers: Arc<dyn Collection<Voucher>>, clock: Arc<dyn Clock>) -> Self {
        Self { vouchers, clock }
    }

    /// All vouchers, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Store`] on storage failures.
    pub async fn list(&self) -> Result<Vec<Voucher>> {
        let mut vouchers = self.vouchers.find(&Filter::new()).await?;
        vouchers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vouchers)
    }

    /// Create a voucher.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Validation`] for a missing or duplicate code,
    /// a missing discount type, or an out-of-range value.
    pub async fn create(&self, input: VoucherInput) -> Result<Voucher> {
        let code = input
            .code
            .as_deref()
            .map(Voucher::normalize_code)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| CommerceError::validation("code is required"))?;
        let discount_type = input
            .discount_type
            .ok_or_else(|| CommerceError::validation("discountType is required"))?;
        let discount_value = input
            .discount_value
            .ok_or_else(|| CommerceError::validation("discountValue is required"))?;
        check_value(discount_type, discount_value)?;
        self.ensure_unique(&code, None).await?;

        let now = self.clock.now();
        let voucher = Voucher {
            id: new_id(),
            code,
            discount_type,
            discount_value,
            usage_limit: input.usage_limit,
            used_count: 0,
            expires_at: input.expires_at,
            active: input.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.vouchers.insert(&voucher).await?;
        tracing::info!(voucher_id = %voucher.id, code = %voucher.code, "Voucher created");
        Ok(voucher)
    }

    /// Update a voucher. The usage counter is never reset here.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown id
    /// - [`CommerceError::Validation`] for a duplicate code or bad value
    pub async fn update(&self, id: &str, input: VoucherInput) -> Result<Voucher> {
        let mut voucher = self
            .vouchers
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Voucher", id))?;

        if let Some(code) = input.code.as_deref() {
            let code = Voucher::normalize_code(code);
            if code.is_empty() {
                return Err(CommerceError::validation("code is required"));
            }
            self.ensure_unique(&code, Some(id)).await?;
            voucher.code = code;
        }
        if let Some(discount_type) = input.discount_type {
            voucher.discount_type = discount_type;
        }
        if let Some(value) = input.discount_value {
            voucher.discount_value = value;
        }
        check_value(voucher.discount_type, voucher.discount_value)?;
        if input.usage_limit.is_some() {
            voucher.usage_limit = input.usage_limit;
        }
        if input.expires_at.is_some() {
            voucher.expires_at = input.expires_at;
        }
        if let Some(active) = input.active {
            voucher.active = active;
        }
        voucher.updated_at = self.clock.now();
        self.vouchers.replace(&voucher).await?;
        Ok(voucher)
    }

    /// Delete a voucher.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown id.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.vouchers.delete(id).await? {
            return Err(CommerceError::not_found("Voucher", id));
        }
        Ok(())
    }

    /// Look up a code and evaluate it against `subtotal`.
    ///
    /// Unknown codes evaluate as invalid rather than failing.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::Validation`] for a negative subtotal
    /// - [`CommerceError::Store`] on storage failures
    pub async fn validate(&self, code: &str, subtotal: Money) -> Result<VoucherCheck> {
        if subtotal.minor_units() < 0 {
            return Err(CommerceError::Validation(
                "subtotal must not be negative".to_string(),
            ));
        }
        Ok(match self.find_by_code(code).await? {
            Some(voucher) => voucher.evaluate(subtotal, self.clock.now()),
            None => VoucherCheck {
                valid: false,
                discount_amount: Money::ZERO,
                reason: Some("voucher not found".to_string()),
            },
        })
    }

    /// Count one redemption.
    ///
    /// The limit is re-checked but not reserved; concurrent redemptions can
    /// overshoot it.
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] for an unknown code
    /// - [`CommerceError::Validation`] when the limit is already reached
    pub async fn redeem(&self, code: &str) -> Result<Voucher> {
        let mut voucher = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| CommerceError::not_found("Voucher", code))?;
        if voucher.is_exhausted() {
            return Err(CommerceError::validation("voucher usage limit reached"));
        }
        voucher.used_count += 1;
        voucher.updated_at = self.clock.now();
        self.vouchers.replace(&voucher).await?;
        tracing::info!(code = %voucher.code, used = voucher.used_count, "Voucher redeemed");
        Ok(voucher)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>> {
        let code = Voucher::normalize_code(code);
        Ok(self
            .vouchers
            .find(&Filter::new().eq("code", code))
            .await?
            .into_iter()
            .next())
    }

    async fn ensure_unique(&self, code: &str, own_id: Option<&str>) -> Result<()> {
        let clash = self
            .vouchers
            .find(&Filter::new().eq("code", code))
            .await?
            .iter()
            .any(|v| Some(v.id.as_str()) != own_id);
        if clash {
            return Err(CommerceError::Validation(format!(
                "voucher code {code} already exists"
            )));
        }
        Ok(())
    }
}

fn check_value(discount_type: DiscountType, value: i64) -> Result<()> {
    match discount_type {
        DiscountType::Percentage if !(1..=100).contains(&value) => Err(CommerceError::validation(
            "percentage discount must be between 1 and 100",
        )),
        DiscountType::Fixed if value <= 0 => Err(CommerceError::validation(
            "fixed discount must be greater than zero",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use clientdesk_testing::{InMemoryCollection, test_clock};

    fn service() -> VoucherService {
        VoucherService::new(
            Arc::new(InMemoryCollection::<Voucher>::new()),
            Arc::new(test_clock()),
        )
    }

    fn input(code: &str, discount_type: DiscountType, value: i64) -> VoucherInput {
        VoucherInput {
            code: Some(code.into()),
            discount_type: Some(discount_type),
            discount_value: Some(value),
            ..VoucherInput::default()
        }
    }

    #[tokio::test]
    async fn percentage_voucher_on_one_thousand() {
        let vouchers = service();
        vouchers
            .create(input("save10", DiscountType::Percentage, 10))
            .await
            .unwrap();

        let check = vouchers
            .validate("SAVE10", Money::from_minor(1000))
            .await
            .unwrap();
        assert!(check.valid);
        assert_eq!(check.discount_amount, Money::from_minor(100));
    }

    #[tokio::test]
    async fn codes_are_unique_case_insensitively() {
        let vouchers = service();
        vouchers
            .create(input("WELCOME", DiscountType::Fixed, 500))
            .await
            .unwrap();
        let err = vouchers
            .create(input(" welcome ", DiscountType::Fixed, 200))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));
    }

    #[tokio::test]
    async fn out_of_range_values_are_rejected() {
        let vouchers = service();
        for bad in [
            input("P0", DiscountType::Percentage, 0),
            input("P101", DiscountType::Percentage, 101),
            input("F0", DiscountType::Fixed, 0),
        ] {
            assert!(matches!(
                vouchers.create(bad).await,
                Err(CommerceError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn negative_subtotal_is_rejected() {
        let vouchers = service();
        vouchers
            .create(input("FLAT", DiscountType::Fixed, 500))
            .await
            .unwrap();

        let err = vouchers
            .validate("FLAT", Money::from_minor(-1000))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Validation(_)));

        let zero = vouchers.validate("FLAT", Money::ZERO).await.unwrap();
        assert_eq!(zero.discount_amount, Money::ZERO);
    }

    #[tokio::test]
    async fn expired_and_unknown_codes_are_invalid() {
        let vouchers = service();
        let mut expired = input("OLD", DiscountType::Percentage, 10);
        expired.expires_at = Some(test_clock().now() - Duration::days(1));
        vouchers.create(expired).await.unwrap();

        let check = vouchers.validate("old", Money::from_minor(1000)).await.unwrap();
        assert!(!check.valid);
        assert_eq!(check.discount_amount, Money::ZERO);

        let unknown = vouchers.validate("NOPE", Money::from_minor(1000)).await.unwrap();
        assert_eq!(unknown.reason.as_deref(), Some("voucher not found"));
    }

    #[tokio::test]
    async fn redeem_counts_until_the_limit() {
        let vouchers = service();
        let mut limited = input("ONCE", DiscountType::Fixed, 100);
        limited.usage_limit = Some(1);
        vouchers.create(limited).await.unwrap();

        assert_eq!(vouchers.redeem("once").await.unwrap().used_count, 1);
        assert!(matches!(
            vouchers.redeem("ONCE").await,
            Err(CommerceError::Validation(_))
        ));
        let check = vouchers.validate("ONCE", Money::from_minor(1000)).await.unwrap();
        assert!(!check.valid);
    }

    #[tokio::test]
    async fn update_keeps_usage_count() {
        let vouchers = service();
        let created = vouchers
            .create(input("KEEP", DiscountType::Fixed, 100))
            .await
            .unwrap();
        vouchers.redeem("KEEP").await.unwrap();

        let updated = vouchers
            .update(
                &created.id,
                VoucherInput {
                    discount_value: Some(250),
                    active: Some(false),
                    ..VoucherInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.used_count, 1);
        assert_eq!(updated.discount_value, 250);
        assert!(!updated.active);
    }
}
