//! Request body extractor.
//!
//! `ApiJson<T>` behaves like axum's `Json<T>` but rejects malformed bodies
//! with an [`ApiError`], so the caller always gets the `{success, data}`
//! envelope instead of axum's plain-text rejection.

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Message returned for a body that is not the expected JSON.
pub const INVALID_BODY: &str = "Données invalides";

/// JSON body extractor with an enveloped rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(ApiError::Validation(INVALID_BODY.into()))
            }
        }
    }
}
