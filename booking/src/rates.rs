//! Hourly rate management.

use crate::error::{BookingError, Result};
use clientdesk_core::environment::Clock;
use clientdesk_core::store::{Collection, Filter, new_id};
use clientdesk_core::{HourlyRate, Money};
use std::sync::Arc;

/// Reads and replaces the active hourly rate.
#[derive(Clone)]
pub struct RateService {
    rates: Arc<dyn Collection<HourlyRate>>,
    clock: Arc<dyn Clock>,
    currency: String,
}

impl RateService {
    /// Create a rate service.
    #[must_use]
    pub fn new(
        rates: Arc<dyn Collection<HourlyRate>>,
        clock: Arc<dyn Clock>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            rates,
            clock,
            currency: currency.into(),
        }
    }

    /// The rate in effect now.
    ///
    /// When several records overlap, the most recently effective one wins.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Configuration`] when no rate is active
    /// - [`BookingError::Store`] on storage failures
    pub async fn current(&self) -> Result<HourlyRate> {
        let now = self.clock.now();
        self.rates
            .find(&Filter::new())
            .await?
            .into_iter()
            .filter(|rate| rate.is_active_at(now))
            .max_by_key(|rate| rate.effective_from)
            .ok_or_else(|| BookingError::Configuration("No active hourly rate configured".to_string()))
    }

    /// Activate a new rate, closing every currently active one.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Validation`] unless `amount` is positive
    /// - [`BookingError::Store`] on storage failures
    pub async fn set(&self, amount: Money, created_by: Option<String>) -> Result<HourlyRate> {
        if !amount.is_positive() {
            return Err(BookingError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let now = self.clock.now();
        for mut previous in self.rates.find(&Filter::new()).await? {
            if previous.is_active_at(now) {
                previous.effective_until = Some(now);
                self.rates.replace(&previous).await?;
            }
        }

        let rate = HourlyRate {
            id: new_id(),
            amount,
            currency: self.currency.clone(),
            effective_from: now,
            effective_until: None,
            created_by,
            created_at: now,
        };
        self.rates.insert(&rate).await?;
        tracing::info!(rate_id = %rate.id, amount = amount.minor_units(), "Hourly rate updated");
        Ok(rate)
    }

    /// Every rate ever set, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] on storage failures.
    pub async fn history(&self) -> Result<Vec<HourlyRate>> {
        let mut rates = self.rates.find(&Filter::new()).await?;
        rates.sort_by(|a, b| {
            b.effective_from
                .cmp(&a.effective_from)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rates)
    }
}
