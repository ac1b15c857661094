//! Authentication extractors and token checks.
//!
//! - `AdminAuth` - admin authentication via the `X-Admin-Key` header
//! - [`require_nonce`] - anti-forgery token check for a given action

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::nonce::{constant_time_eq, NonceAction};
use crate::state::AppState;

/// Header carrying the admin API key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Header carrying the public chart token.
pub const CHART_NONCE_HEADER: &str = "x-chart-nonce";

/// Admin authentication via API key.
///
/// Requires the `X-Admin-Key` header to match the configured admin key.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Admin identifier (for audit logging).
    pub admin_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let admin_key = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // No configured key means no admin access at all
        let expected_key = state
            .config
            .admin_api_key
            .as_deref()
            .ok_or(ApiError::Unauthorized)?;

        if !constant_time_eq(admin_key, expected_key) {
            tracing::warn!("Rejected admin request with wrong key");
            return Err(ApiError::Unauthorized);
        }

        let admin_id = parts
            .headers
            .get("x-admin-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("admin")
            .to_string();

        tracing::debug!(admin_id = %admin_id, "Admin authenticated");

        Ok(AdminAuth { admin_id })
    }
}

/// Check an anti-forgery token for `action`.
pub fn require_nonce(
    state: &AppState,
    action: NonceAction,
    token: Option<&str>,
) -> Result<(), ApiError> {
    match token {
        Some(token) if state.nonces.verify(action, token) => Ok(()),
        _ => {
            tracing::warn!(action = action.as_str(), "Anti-forgery check failed");
            Err(ApiError::Forbidden)
        }
    }
}

/// Chart token from the header, falling back to the body field.
#[must_use]
pub fn chart_nonce<'a>(headers: &'a HeaderMap, body: Option<&'a str>) -> Option<&'a str> {
    headers
        .get(CHART_NONCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .or(body)
}
