//! Error types for catalog validation.

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while validating catalog input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// Price outside the accepted `[0, 9999.99]` range, or not a number.
    #[error("price out of range: {price}")]
    PriceOutOfRange {
        /// The rejected price.
        price: f64,
    },

    /// A required request field was absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Cut name is empty or too long for the table.
    #[error("invalid cut name: {0:?}")]
    InvalidName(String),
}
