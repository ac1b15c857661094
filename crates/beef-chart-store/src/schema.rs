//! Table schema: naming and column constraints.
//!
//! Every backend enforces the same constraints as the reference table
//! definition:
//!
//! ```sql
//! CREATE TABLE <prefix>beef_chart_data (
//!     id        BIGINT AUTO_INCREMENT PRIMARY KEY,
//!     name      VARCHAR(100) NOT NULL,
//!     price     DECIMAL(10,2) NOT NULL,
//!     available BOOLEAN DEFAULT TRUE
//! );
//! ```
//!
//! The editor-facing `[0, 9999.99]` price bound is not a table constraint; it
//! is checked before a write reaches the store.

use beef_chart_core::{CutUpdate, NewCut, Price};

use crate::error::{Result, StoreError};

/// Base name of the cut table, appended to the configured prefix.
pub const TABLE_BASE_NAME: &str = "beef_chart_data";

/// Maximum name length in characters (`VARCHAR(100)`).
pub const MAX_NAME_CHARS: usize = 100;

/// Largest magnitude a `DECIMAL(10,2)` column holds, in cents.
pub const MAX_PRICE_CENTS: i64 = 9_999_999_999;

/// Column family holding id sequences for `RocksDB`.
pub const META_COLUMN_FAMILY: &str = "meta";

/// Build the table name from a prefix.
///
/// The prefix is lowercased so the name is the same whether or not a backend
/// folds unquoted identifiers.
///
/// # Errors
///
/// Returns `StoreError::Constraint` if the prefix contains anything other than
/// ASCII letters, digits and underscores. The name is interpolated into SQL
/// as an identifier, so it has to be safe on its own.
pub fn table_name(prefix: &str) -> Result<String> {
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(StoreError::Constraint(format!(
            "invalid table prefix: {prefix:?}"
        )));
    }
    Ok(format!("{}{TABLE_BASE_NAME}", prefix.to_ascii_lowercase()))
}

/// Quote a table name as a SQL identifier, the form both the DDL and
/// `to_regclass` lookups must use.
#[must_use]
pub fn quoted_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check a row against the column constraints.
///
/// # Errors
///
/// Returns `StoreError::Constraint` describing the first violated constraint.
pub fn check_new_cut(cut: &NewCut) -> Result<()> {
    if cut.name.trim().is_empty() {
        return Err(StoreError::Constraint("name must not be empty".into()));
    }
    if cut.name.chars().count() > MAX_NAME_CHARS {
        return Err(StoreError::Constraint(format!(
            "name longer than {MAX_NAME_CHARS} characters"
        )));
    }
    check_price(cut.price)
}

/// Check an update against the column constraints.
///
/// # Errors
///
/// Returns `StoreError::Constraint` if the price does not fit the column.
pub fn check_update(update: &CutUpdate) -> Result<()> {
    check_price(update.price)
}

fn check_price(price: Price) -> Result<()> {
    if price.is_negative() {
        return Err(StoreError::Constraint(format!(
            "price must not be negative: {price}"
        )));
    }
    if price.cents() > MAX_PRICE_CENTS {
        return Err(StoreError::Constraint(format!(
            "price does not fit DECIMAL(10,2): {price}"
        )));
    }
    Ok(())
}
