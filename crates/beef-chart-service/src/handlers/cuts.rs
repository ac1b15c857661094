//! Public chart endpoints and the single-cut save.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use beef_chart_core::{
    lenient_scalar, presence_flag, validate_price, ChartPoint, CutId, CutRecord, CutUpdate,
    Scalar,
};

use crate::auth::{chart_nonce, require_nonce, AdminAuth};
use crate::error::{ApiError, Envelope};
use crate::extract::ApiJson;
use crate::nonce::NonceAction;
use crate::state::AppState;

/// Issued token.
#[derive(Debug, Serialize)]
pub struct NonceResponse {
    /// The token.
    pub nonce: String,
    /// Action the token is bound to.
    pub action: NonceAction,
    /// Upper bound of the token's lifetime in seconds.
    pub expires_in: u64,
}

/// Issue the public chart token.
pub async fn issue_nonce(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<NonceResponse>>, ApiError> {
    Ok(Envelope::ok(NonceResponse {
        nonce: state.nonces.issue(NonceAction::BeefChart)?,
        action: NonceAction::BeefChart,
        expires_in: state.config.nonce_lifetime_seconds,
    }))
}

/// Body of the fetch endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    /// Chart token, when not sent as a header.
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Available cuts, after the throttled provisioning check.
async fn available_cuts(
    state: &AppState,
    headers: &HeaderMap,
    body: Option<&FetchRequest>,
) -> Result<Vec<CutRecord>, ApiError> {
    let body_nonce = body.and_then(|b| b.nonce.as_deref());
    require_nonce(state, NonceAction::BeefChart, chart_nonce(headers, body_nonce))?;

    if let Some(outcome) = state.provisioner.ensure_seeded_throttled().await? {
        tracing::debug!(?outcome, "Provisioning check ran");
    }

    let all = state.repository.get_all().await?;
    if all.is_empty() {
        return Err(ApiError::EmptyResult("No data found in database".into()));
    }

    let available: Vec<_> = all.into_iter().filter(|cut| cut.available).collect();
    if available.is_empty() {
        return Err(ApiError::EmptyResult("No cuts available".into()));
    }
    Ok(available)
}

/// Available cuts as records.
pub async fn fetch_cuts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<FetchRequest>>,
) -> Result<Json<Envelope<Vec<CutRecord>>>, ApiError> {
    let cuts = available_cuts(&state, &headers, body.as_deref()).await?;
    Ok(Envelope::ok(cuts))
}

/// Available cuts as `{name, value}` points for the map renderer.
pub async fn fetch_series(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<FetchRequest>>,
) -> Result<Json<Envelope<Vec<ChartPoint>>>, ApiError> {
    let cuts = available_cuts(&state, &headers, body.as_deref()).await?;
    Ok(Envelope::ok(
        cuts.iter().map(CutRecord::to_chart_point).collect(),
    ))
}

/// Single-cut save request.
#[derive(Debug, Default, Deserialize)]
pub struct SaveCutRequest {
    /// Chart token.
    #[serde(default)]
    pub nonce: Option<String>,
    /// Cut id, number or text.
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub id: Option<Scalar>,
    /// New price, number or text.
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub price: Option<Scalar>,
    /// New availability, checkbox-style; absent means unavailable.
    #[serde(default, deserialize_with = "presence_flag")]
    pub available: bool,
}

/// Single-cut save response.
#[derive(Debug, Serialize)]
pub struct SaveCutResponse {
    /// Confirmation message.
    pub message: String,
    /// The record as stored after the update.
    pub cut: Option<CutRecord>,
}

/// Update one cut's price and availability.
pub async fn save_cut(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    ApiJson(request): ApiJson<SaveCutRequest>,
) -> Result<Json<Envelope<SaveCutResponse>>, ApiError> {
    require_nonce(&state, NonceAction::BeefChart, request.nonce.as_deref())?;

    let (Some(raw_id), Some(raw_price)) = (&request.id, &request.price) else {
        return Err(ApiError::Validation("Missing required data".into()));
    };

    let price = validate_price(raw_price.as_price())
        .map_err(|_| ApiError::Validation("Prix invalide".into()))?;

    let id = raw_id.as_id();
    let cut_id = CutId::new(id).ok_or_else(not_found)?;
    if !state.repository.exists(id).await? {
        return Err(not_found());
    }

    let update = CutUpdate {
        price,
        available: request.available,
    };
    if !state.repository.update(cut_id, &update).await {
        return Err(ApiError::Persistence("Failed to update data".into()));
    }

    tracing::info!(admin_id = %admin.admin_id, %cut_id, price = %price, "Cut updated");

    Ok(Envelope::ok(SaveCutResponse {
        message: "Data updated successfully".into(),
        cut: state.repository.get(cut_id).await?,
    }))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Enregistrement non trouvé".into())
}
