//! Admin endpoints: listing, bulk edit and reset.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use beef_chart_core::{BulkStatus, CutRecord, EXPECTED_CUT_COUNT};

use crate::auth::{require_nonce, AdminAuth};
use crate::bulk::apply_bulk_edit;
use crate::error::{ApiError, Envelope};
use crate::extract::{ApiJson, INVALID_BODY};
use crate::nonce::NonceAction;
use crate::state::AppState;

/// Tokens the admin forms post back.
#[derive(Debug, Serialize)]
pub struct AdminTokens {
    /// Token for the single-cut save.
    pub beef_chart: String,
    /// Token for the bulk edit.
    pub bulk_update: String,
    /// Token for the reset.
    pub reset: String,
}

/// Admin listing response.
#[derive(Debug, Serialize)]
pub struct AdminCutsResponse {
    /// Every cut, available or not, by id.
    pub cuts: Vec<CutRecord>,
    /// Number of cuts.
    pub count: usize,
    /// Number of cuts in a complete catalog.
    pub expected: u64,
    /// Per-action tokens.
    pub tokens: AdminTokens,
}

/// List every cut along with fresh form tokens.
pub async fn list_cuts(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<Json<Envelope<AdminCutsResponse>>, ApiError> {
    state.provisioner.ensure_seeded_throttled().await?;

    let cuts = state.repository.get_all().await?;
    let tokens = AdminTokens {
        beef_chart: state.nonces.issue(NonceAction::BeefChart)?,
        bulk_update: state.nonces.issue(NonceAction::BulkUpdate)?,
        reset: state.nonces.issue(NonceAction::Reset)?,
    };

    Ok(Envelope::ok(AdminCutsResponse {
        count: cuts.len(),
        cuts,
        expected: EXPECTED_CUT_COUNT,
        tokens,
    }))
}

/// Bulk edit request.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    /// `bulk_update` token.
    #[serde(default)]
    pub nonce: Option<String>,
    /// Edits keyed by id as text. Each entry is read on its own so a
    /// malformed one is reported without failing the request.
    #[serde(default)]
    pub entries: Option<Value>,
}

/// Bulk edit response.
#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    /// Aggregate outcome.
    pub status: BulkStatus,
    /// Entries applied.
    pub updated: usize,
    /// One message per rejected entry.
    pub errors: Vec<String>,
    /// Summary for the editor.
    pub message: String,
}

/// Apply a bulk edit.
///
/// Rejected entries are reported, not raised: the envelope's `success` is
/// false only when nothing was applied.
pub async fn bulk_update(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    ApiJson(request): ApiJson<BulkUpdateRequest>,
) -> Result<Json<Envelope<BulkUpdateResponse>>, ApiError> {
    require_nonce(&state, NonceAction::BulkUpdate, request.nonce.as_deref())?;

    let Some(Value::Object(entries)) = request.entries else {
        return Err(ApiError::Validation(INVALID_BODY.into()));
    };

    tracing::info!(admin_id = %admin.admin_id, entries = entries.len(), "Bulk edit requested");
    let report = apply_bulk_edit(&state.repository, &entries).await;
    let status = report.status();

    Ok(Json(Envelope {
        success: status != BulkStatus::Failure,
        data: BulkUpdateResponse {
            status,
            updated: report.updated,
            errors: report.error_messages(),
            message: report.message(),
        },
    }))
}

/// Reset request.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    /// `reset` token.
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Reset response.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Rows inserted.
    pub inserted: usize,
    /// Summary for the editor.
    pub message: String,
}

/// Wipe the catalog and reseed the defaults.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    ApiJson(request): ApiJson<ResetRequest>,
) -> Result<Json<Envelope<ResetResponse>>, ApiError> {
    require_nonce(&state, NonceAction::Reset, request.nonce.as_deref())?;

    tracing::info!(admin_id = %admin.admin_id, "Catalog reset requested");
    let inserted = state.provisioner.reset().await.map_err(|e| {
        tracing::error!(error = %e, "Catalog reset failed");
        reset_failed()
    })?;

    if inserted == 0 {
        return Err(reset_failed());
    }

    Ok(Envelope::ok(ResetResponse {
        inserted,
        message: format!(
            "Données réinitialisées avec succès ! {inserted} enregistrements créés."
        ),
    }))
}

fn reset_failed() -> ApiError {
    ApiError::Persistence("Erreur lors de la réinitialisation des données".into())
}
