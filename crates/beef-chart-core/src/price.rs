//! Price type and the accepted price range.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CatalogError, Result};

/// Lowest price accepted from an editor.
pub const MIN_PRICE: f64 = 0.0;

/// Highest price accepted from an editor.
pub const MAX_PRICE: f64 = 9999.99;

/// A price in euros per kilogram, stored as integer cents.
///
/// Serialized as a JSON number (`15.5`), rounded to two decimals on input,
/// matching a `decimal(10,2)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    /// Zero euros.
    pub const ZERO: Self = Self(0);

    /// Create a price from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a price from a decimal amount, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN and infinities.
    #[must_use]
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let cents = (amount * 100.0).round() as i64;
        Some(Self(cents))
    }

    /// Amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Amount as a decimal number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_f64(amount).ok_or_else(|| serde::de::Error::custom("price must be finite"))
    }
}

/// Check an editor-supplied amount against `[MIN_PRICE, MAX_PRICE]`.
///
/// The bound is applied to the raw amount before rounding, so `9999.994` is
/// rejected rather than rounded into range.
///
/// # Errors
///
/// Returns `CatalogError::PriceOutOfRange` for out-of-range or non-finite input.
pub fn validate_price(amount: f64) -> Result<Price> {
    if !(MIN_PRICE..=MAX_PRICE).contains(&amount) {
        return Err(CatalogError::PriceOutOfRange { price: amount });
    }
    Price::from_f64(amount).ok_or(CatalogError::PriceOutOfRange { price: amount })
}
