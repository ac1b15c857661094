//! Client error types.

/// Errors that can occur when using the beef-chart client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with `success: false`.
    #[error("API error ({status}): {message}")]
    Api {
        /// Message from the envelope's `data` field.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Admin endpoint called without an admin key.
    #[error("no admin key configured")]
    MissingAdminKey,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
