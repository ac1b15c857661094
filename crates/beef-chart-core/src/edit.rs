//! Editor input coercion and the bulk-edit report.
//!
//! Admin forms post ids and prices as text. Coercion is deliberately lenient
//! (leading numeric prefix wins, garbage becomes zero) and validation happens
//! afterwards, so a malformed entry turns into a reportable error instead of a
//! rejected request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cut::CutUpdate;
use crate::error::CatalogError;
use crate::price::validate_price;

/// A form value that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A JSON number.
    Number(f64),
    /// A JSON string.
    Text(String),
}

impl Scalar {
    /// Coerce to a non-negative id (see [`coerce_id`]).
    #[must_use]
    pub fn as_id(&self) -> u64 {
        match self {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Self::Number(n) if n.is_finite() => n.trunc().abs() as u64,
            Self::Number(_) => 0,
            Self::Text(text) => coerce_id(text),
        }
    }

    /// Read a JSON value as a scalar. Anything but a number or a string is
    /// `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// Coerce to a price amount (see [`coerce_price`]).
    #[must_use]
    pub fn as_price(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(text) => coerce_price(text),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Checkbox semantics for a JSON value.
///
/// An explicit boolean is taken as-is and `null` counts as absent. Any other
/// value (`"on"`, `"1"`, a number) means the box was ticked.
#[must_use]
pub fn is_ticked(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        _ => true,
    }
}

/// Serde helper: a field holding a [`Scalar`], where values of any other
/// type read as absent instead of failing the whole body.
///
/// # Errors
///
/// Only when the input is not valid JSON at all.
pub fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Scalar::from_json(&Value::deserialize(deserializer)?))
}

/// Serde helper: a checkbox-style flag (see [`is_ticked`]).
///
/// # Errors
///
/// Only when the input is not valid JSON at all.
pub fn presence_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(is_ticked(&Value::deserialize(deserializer)?))
}

/// Coerce text to a non-negative integer id.
///
/// Leading whitespace is skipped, an optional sign and the leading run of
/// digits are read, and the absolute value is returned. Anything without a
/// digit prefix is `0`, which never names a record. Overflow saturates.
#[must_use]
pub fn coerce_id(text: &str) -> u64 {
    let text = text.trim_start();
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);

    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}

/// Coerce text to a floating point amount.
///
/// Reads the longest leading decimal literal (sign, digits, fraction,
/// exponent). Text without a numeric prefix is `0.0`.
#[must_use]
pub fn coerce_price(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if mantissa_digits > 0 || frac_end > frac_start {
            mantissa_digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}

/// One row of a bulk edit, keyed by id in the request.
///
/// `available` follows checkbox semantics: absent means unavailable, any
/// posted value other than `false` or `null` means available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkEditEntry {
    /// Price as posted; absent or unparseable means `0`.
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub price: Option<Scalar>,

    /// Availability; absent means `false`.
    #[serde(default, deserialize_with = "presence_flag")]
    pub available: bool,
}

impl BulkEditEntry {
    /// Read one posted entry. Only a JSON object is an entry; anything else
    /// is `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }

    /// Validate the entry's price and produce the update to apply.
    ///
    /// # Errors
    ///
    /// Returns `EditError::InvalidPrice` when the price is out of range.
    pub fn to_update(&self, id: u64) -> Result<CutUpdate, EditError> {
        let amount = self.price.as_ref().map_or(0.0, Scalar::as_price);
        match validate_price(amount) {
            Ok(price) => Ok(CutUpdate {
                price,
                available: self.available,
            }),
            Err(CatalogError::PriceOutOfRange { price }) => {
                Err(EditError::InvalidPrice { id, price })
            }
            Err(_) => Err(EditError::InvalidPrice { id, price: amount }),
        }
    }
}

/// Why a single bulk-edit entry was not applied.
///
/// Messages are shown to the shop editor as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// Price outside the accepted range.
    #[error("Prix invalide pour l'ID {id}: {price:.2} (doit être entre 0 et 9999.99)")]
    InvalidPrice {
        /// Offending id.
        id: u64,
        /// Offending price.
        price: f64,
    },

    /// No record with this id.
    #[error("Enregistrement avec ID {id} n'existe pas")]
    NotFound {
        /// Offending id.
        id: u64,
    },

    /// The posted entry is not an object.
    #[error("Données invalides pour l'ID {id}")]
    Malformed {
        /// Offending id.
        id: u64,
    },

    /// Several posted keys name the same record.
    #[error("ID {id} présent plusieurs fois dans la requête")]
    DuplicateId {
        /// Offending id.
        id: u64,
    },

    /// The store rejected the write.
    #[error("Échec de la mise à jour pour l'ID {id}: erreur de base de données")]
    UpdateFailed {
        /// Offending id.
        id: u64,
    },
}

/// Aggregate outcome of a bulk edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    /// Every entry applied.
    Success,
    /// Some entries applied, some rejected.
    Partial,
    /// Nothing applied.
    Failure,
}

/// Accounting of a bulk edit: what was applied and what was rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkEditReport {
    /// Number of entries applied.
    pub updated: usize,
    /// Rejected entries, in processing order.
    pub errors: Vec<EditError>,
}

impl BulkEditReport {
    /// Count an applied entry.
    pub fn record_success(&mut self) {
        self.updated += 1;
    }

    /// Record a rejected entry.
    pub fn record_error(&mut self, error: EditError) {
        self.errors.push(error);
    }

    /// Aggregate status. An empty batch is a failure: nothing was updated.
    #[must_use]
    pub fn status(&self) -> BulkStatus {
        match (self.updated, self.errors.is_empty()) {
            (0, _) => BulkStatus::Failure,
            (_, true) => BulkStatus::Success,
            (_, false) => BulkStatus::Partial,
        }
    }

    /// Error messages, one per rejected entry.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Summary line for the editor.
    #[must_use]
    pub fn message(&self) -> String {
        let mut message = if self.updated > 0 {
            format!("{} donnée(s) mise(s) à jour avec succès !", self.updated)
        } else {
            "Aucune donnée n'a été mise à jour".to_string()
        };

        if !self.errors.is_empty() {
            message.push_str(" Erreurs: ");
            message.push_str(&self.error_messages().join("; "));
        }

        message
    }
}
