//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use beef_chart_store::StoreError;

use crate::provision::ProvisionError;

/// API error type.
///
/// The display text is what the caller sees in the envelope's `data` field.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong admin key.
    #[error("Insufficient permissions")]
    Unauthorized,

    /// Missing, expired or foreign anti-forgery token.
    #[error("Security check failed")]
    Forbidden,

    /// Bad request - missing or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The query succeeded but there is nothing to return.
    #[error("{0}")]
    EmptyResult(String),

    /// A write was rejected by the store. Detail is logged where it happens.
    #[error("{0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Response envelope shared by every cut endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Whether the request did what it asked for.
    pub success: bool,
    /// Payload on success, message on failure.
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// Successful response.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::EmptyResult(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Envelope {
            success: false,
            data: message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound("Enregistrement non trouvé".into()),
            StoreError::Database(msg)
            | StoreError::Serialization(msg)
            | StoreError::Constraint(msg) => Self::Internal(msg),
            StoreError::TableMissing(table) => Self::Internal(format!("table missing: {table}")),
        }
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Store(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}
