//! Hourly consultation rate.

use crate::money::Money;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pricing record with a validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRate {
    /// Document id.
    pub id: String,
    /// Price per hour in minor units.
    pub amount: Money,
    /// ISO currency code.
    pub currency: String,
    /// Start of validity.
    pub effective_from: DateTime<Utc>,
    /// End of validity, open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_until: Option<DateTime<Utc>>,
    /// Admin who set the rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl HourlyRate {
    /// Whether the rate applies at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_from <= now && self.effective_until.is_none_or(|until| until > now)
    }
}

impl Document for HourlyRate {
    const COLLECTION: &'static str = "hourly_rates";

    fn id(&self) -> &str {
        &self.id
    }
}
