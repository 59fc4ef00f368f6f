//! Money in minor currency units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use thiserror::Error;

/// Errors from price parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// No digits in the input.
    #[error("price '{0}' contains no amount")]
    Empty(String),

    /// More than one decimal point, or too many digits.
    #[error("price '{0}' is not a valid amount")]
    Invalid(String),
}

/// An amount in the smallest denomination of a currency (paisa, cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wrap a minor-unit amount.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The raw minor-unit amount.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiply by a quantity, `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Add, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let v = self.0.saturating_sub(other.0);
        if v < 0 { Self::ZERO } else { Self(v) }
    }

    /// `percent`% of this amount, rounded down.
    #[must_use]
    pub fn percent(self, percent: u32) -> Self {
        let scaled = i128::from(self.0) * i128::from(percent) / 100;
        Self(i64::try_from(scaled).unwrap_or(i64::MAX))
    }

    /// The smaller of two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Parse a display price such as `"₹1,500"` or `"$12.50"`.
    ///
    /// Currency symbols, separators and whitespace are ignored; at most two
    /// fractional digits are kept.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] when no amount can be read.
    pub fn parse_price(raw: &str) -> Result<Self, MoneyError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return Err(MoneyError::Empty(raw.to_string()));
        }

        let invalid = || MoneyError::Invalid(raw.to_string());
        let mut parts = cleaned.split('.');
        let major = parts.next().unwrap_or_default();
        let fraction = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let major: i64 = if major.is_empty() {
            0
        } else {
            major.parse().map_err(|_| invalid())?
        };
        let mut cents: i64 = 0;
        for (i, digit) in fraction.chars().take(2).enumerate() {
            let d = i64::from(digit.to_digit(10).ok_or_else(invalid)?);
            cents += if i == 0 { d * 10 } else { d };
        }

        major
            .checked_mul(100)
            .and_then(|m| m.checked_add(cents))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_display_prices() {
        assert_eq!(Money::parse_price("₹1,500").unwrap().minor_units(), 150_000);
        assert_eq!(Money::parse_price("$12.5").unwrap().minor_units(), 1_250);
        assert_eq!(Money::parse_price(" 99.999 ").unwrap().minor_units(), 9_999);
        assert_eq!(Money::parse_price(".75").unwrap().minor_units(), 75);
    }

    #[test]
    fn rejects_prices_without_amounts() {
        assert!(matches!(Money::parse_price("free"), Err(MoneyError::Empty(_))));
        assert!(matches!(Money::parse_price("1.2.3"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn rate_times_duration() {
        let rate = Money::from_minor(50_000);
        assert_eq!(rate.checked_mul(2), Some(Money::from_minor(100_000)));
        assert_eq!(Money::from_minor(i64::MAX).checked_mul(2), None);
    }

    #[test]
    fn percent_and_saturation() {
        assert_eq!(Money::from_minor(1000).percent(10), Money::from_minor(100));
        assert_eq!(Money::from_minor(999).percent(10), Money::from_minor(99));
        assert_eq!(Money::from_minor(50).saturating_sub(Money::from_minor(80)), Money::ZERO);
    }

    #[test]
    fn display_in_major_units() {
        assert_eq!(Money::from_minor(150_050).to_string(), "1500.50");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.05");
    }

    proptest! {
        #[test]
        fn display_parses_back(minor in 0i64..1_000_000_000) {
            let m = Money::from_minor(minor);
            prop_assert_eq!(Money::parse_price(&m.to_string()).unwrap(), m);
        }
    }
}
